//! RemotePredictEngine -- [`InferenceEngine`] over a model-serving predict endpoint.
//!
//! Sends `POST {base_url}/models/{model_id}/_predict` with body
//! `{"parameters": {...}}`, the flat parameter map unchanged (history
//! included). The response is treated as opaque: a known answer field is
//! used when present, otherwise the raw body is the answer.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use colloquy_core::inference::engine::InferenceEngine;
use colloquy_types::inference::{InferenceError, InferenceOutput, InferenceRequest};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

/// Response locations tried, in order, before falling back to the raw body.
const ANSWER_POINTERS: &[&str] = &[
    "/inference_results/0/output/0/dataAsMap/response",
    "/answer",
    "/response",
];

pub struct RemotePredictEngine {
    client: reqwest::Client,
    base_url: reqwest::Url,
    api_key: Option<SecretString>,
}

impl RemotePredictEngine {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Transport(format!("failed to create HTTP client: {e}")))?;

        let base_url = base_url.into();
        let base_url = reqwest::Url::parse(&base_url)
            .map_err(|e| InferenceError::Transport(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// `{base_url}/models/{model_id}/_predict`, with the model id encoded as one path segment.
    fn url(&self, model_id: &str) -> Result<reqwest::Url, InferenceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                InferenceError::Transport(format!("base URL '{}' can not carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["models", model_id, "_predict"]);
        Ok(url)
    }
}

impl InferenceEngine for RemotePredictEngine {
    fn name(&self) -> &str {
        "remote"
    }

    async fn predict(&self, request: &InferenceRequest) -> Result<InferenceOutput, InferenceError> {
        let mut builder = self
            .client
            .post(self.url(&request.model_id)?)
            .json(&json!({ "parameters": request.parameters }));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| InferenceError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InferenceError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => InferenceError::AuthenticationFailed,
                404 => InferenceError::ModelNotFound(request.model_id.clone()),
                429 => InferenceError::RateLimited,
                _ => InferenceError::Engine {
                    message: format!("HTTP {status}: {body}"),
                },
            });
        }

        Ok(InferenceOutput {
            answer: extract_answer(&body),
        })
    }
}

fn extract_answer(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    ANSWER_POINTERS
        .iter()
        .filter_map(|pointer| value.pointer(pointer))
        .find_map(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn request() -> InferenceRequest {
        let mut parameters = BTreeMap::new();
        parameters.insert("question".to_string(), "q2".to_string());
        parameters.insert("chat_history".to_string(), r#"["q1","a1"]"#.to_string());
        parameters.insert("chat_history_format".to_string(), "json_array_v1".to_string());
        InferenceRequest {
            model_id: "m1".to_string(),
            parameters,
        }
    }

    fn engine(server: &MockServer, key: Option<&str>) -> RemotePredictEngine {
        RemotePredictEngine::new(
            server.uri(),
            key.map(|k| SecretString::from(k.to_string())),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_extract_answer_shapes() {
        let nested = r#"{"inference_results":[{"output":[{"dataAsMap":{"response":"deep"}}]}]}"#;
        assert_eq!(extract_answer(nested), "deep");
        assert_eq!(extract_answer(r#"{"answer":"flat"}"#), "flat");
        assert_eq!(extract_answer(r#"{"other":1}"#), r#"{"other":1}"#);
        assert_eq!(extract_answer("plain text"), "plain text");
    }

    #[tokio::test]
    async fn test_predict_posts_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/m1/_predict"))
            .and(header("authorization", "Bearer secret-key"))
            .and(body_json(json!({
                "parameters": {
                    "question": "q2",
                    "chat_history": "[\"q1\",\"a1\"]",
                    "chat_history_format": "json_array_v1"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "inference_results": [{"output": [{"dataAsMap": {"response": "a2"}}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = engine(&server, Some("secret-key")).predict(&request()).await.unwrap();
        assert_eq!(output.answer, "a2");
    }

    #[tokio::test]
    async fn test_predict_maps_status_codes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/m1/_predict"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = engine(&server, None).predict(&request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::ModelNotFound(ref m) if m == "m1"));
    }

    #[tokio::test]
    async fn test_predict_server_error_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .mount(&server)
            .await;

        let err = engine(&server, None).predict(&request()).await.unwrap_err();
        match err {
            InferenceError::Engine { message } => assert!(message.contains("model crashed")),
            other => panic!("expected Engine error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_predict_unreachable_is_transport_error() {
        let engine = RemotePredictEngine::new("http://127.0.0.1:1", None, Duration::from_secs(1)).unwrap();
        let err = engine.predict(&request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Transport(_)));
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let engine = RemotePredictEngine::new("http://host/_plugins/_ml/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(engine.url("m1").unwrap().as_str(), "http://host/_plugins/_ml/models/m1/_predict");

        let bare = RemotePredictEngine::new("http://host", None, Duration::from_secs(1)).unwrap();
        assert_eq!(bare.url("m1").unwrap().as_str(), "http://host/models/m1/_predict");
    }

    #[test]
    fn test_url_encodes_model_id_as_one_segment() {
        let engine = RemotePredictEngine::new("http://host/_plugins/_ml", None, Duration::from_secs(1)).unwrap();
        let url = engine.url("team/m1?v=2#x").unwrap();
        assert_eq!(url.as_str(), "http://host/_plugins/_ml/models/team%2Fm1%3Fv=2%23x/_predict");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = RemotePredictEngine::new("not a url", None, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, InferenceError::Transport(_)));
    }
}
