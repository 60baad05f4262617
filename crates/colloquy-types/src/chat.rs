//! Chat request/response types.
//!
//! These are transient: a `ChatRequest` comes in, a `ChatResponse` goes out,
//! and only the resulting turn (and possibly a new session) is persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// Parameter key carrying the question text.
pub const QUESTION_PARAM: &str = "question";

/// Parameter key carrying the encoded conversation history.
pub const CHAT_HISTORY_PARAM: &str = "chat_history";

/// Parameter key naming the encoding used in [`CHAT_HISTORY_PARAM`].
pub const CHAT_HISTORY_FORMAT_PARAM: &str = "chat_history_format";

/// Input of the chat operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Existing session to continue; absent or empty starts a new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Inference model to invoke. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Engine parameters; `question` holds the question text.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl ChatRequest {
    pub fn new(model_id: impl Into<String>, question: impl Into<String>) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert(QUESTION_PARAM.to_string(), question.into());
        Self {
            session_id: None,
            model_id: Some(model_id.into()),
            parameters,
        }
    }

    pub fn in_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// The question text, or an empty string if the caller sent none.
    pub fn question(&self) -> &str {
        self.parameters
            .get(QUESTION_PARAM)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Output of the chat operation.
///
/// `session_id` is always durable: either the caller's or one minted while
/// serving this request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: SessionId,
    pub answer: String,
}

/// Input of the explicit session creation operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
}
