//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use colloquy_types::error::ConversationError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Failure of a chat or query operation.
    Conversation(ConversationError),
    /// Malformed request caught before reaching a service.
    Validation(String),
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        AppError::Conversation(e)
    }
}

/// HTTP status for a stable error code.
pub fn status_for_code(code: &str) -> StatusCode {
    match code {
        "INVALID_REQUEST" | "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "INFERENCE_ERROR" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Conversation(e) => e.code(),
            AppError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Conversation(e) => e.describe(),
            AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = status_for_code(code);
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        } else {
            tracing::debug!(code, %message, "Request rejected");
        }

        ApiResponse::error(code, &message, String::new(), 0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use colloquy_types::error::RepositoryError;
    use colloquy_types::inference::InferenceError;
    use colloquy_types::session::SessionId;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ConversationError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (ConversationError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                ConversationError::Inference {
                    model_id: "m1".into(),
                    source: InferenceError::RateLimited,
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                ConversationError::StorageRead(RepositoryError::Read("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ConversationError::TurnAppend {
                    session_id: SessionId::from("s1"),
                    source: RepositoryError::Write("x".into()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_envelope_carries_code_and_cause_chain() {
        let err = AppError::from(ConversationError::SessionCreation(RepositoryError::Write(
            "disk full".into(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert!(body["data"].is_null());
        assert_eq!(body["errors"][0]["code"], "SESSION_CREATION_ERROR");
        let message = body["errors"][0]["message"].as_str().unwrap();
        assert!(message.contains("disk full"));
    }

    #[tokio::test]
    async fn test_validation_error() {
        let response = AppError::Validation("bad body".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }
}
