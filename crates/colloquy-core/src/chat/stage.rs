//! Typed stages of one chat turn.
//!
//! The working session id moves by value from stage to stage:
//! `PendingTurn` (validated request) -> `AnsweredTurn` (engine replied) ->
//! `RecordedTurn` (turn durable, session id definitely assigned). Only the
//! recorder can produce a `RecordedTurn`, and only a `RecordedTurn` can
//! become a `ChatResponse`.

use std::collections::BTreeMap;

use colloquy_types::chat::{ChatRequest, ChatResponse, QUESTION_PARAM};
use colloquy_types::error::ConversationError;
use colloquy_types::session::SessionId;

/// A validated chat request that has not reached the engine yet.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    session_id: Option<SessionId>,
    model_id: String,
    question: String,
    parameters: BTreeMap<String, String>,
}

impl PendingTurn {
    /// Validate a raw request. Touches no store.
    pub fn from_request(request: ChatRequest) -> Result<Self, ConversationError> {
        let model_id = request
            .model_id
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ConversationError::InvalidRequest("model id is required".to_string()))?;

        let question = request
            .parameters
            .get(QUESTION_PARAM)
            .filter(|q| !q.trim().is_empty())
            .cloned()
            .ok_or_else(|| {
                ConversationError::InvalidRequest(format!(
                    "parameter '{QUESTION_PARAM}' is required"
                ))
            })?;

        Ok(Self {
            session_id: SessionId::from_optional(request.session_id.as_deref()),
            model_id,
            question,
            parameters: request.parameters,
        })
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn answered(self, answer: String) -> AnsweredTurn {
        AnsweredTurn {
            session_id: self.session_id,
            model_id: self.model_id,
            question: self.question,
            answer,
        }
    }
}

/// The engine has answered; nothing has been written yet.
#[derive(Debug, Clone)]
pub struct AnsweredTurn {
    pub(crate) session_id: Option<SessionId>,
    pub(crate) model_id: String,
    pub(crate) question: String,
    pub(crate) answer: String,
}

impl AnsweredTurn {
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// The turn is durable under `session_id`.
#[derive(Debug, Clone)]
pub struct RecordedTurn {
    pub(crate) session_id: SessionId,
    pub(crate) turn_id: String,
    pub(crate) answer: String,
    pub(crate) session_created: bool,
}

impl RecordedTurn {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn turn_id(&self) -> &str {
        &self.turn_id
    }

    /// Whether the session was opened while recording this turn.
    pub fn session_created(&self) -> bool {
        self.session_created
    }

    pub fn into_response(self) -> ChatResponse {
        ChatResponse {
            session_id: self.session_id,
            answer: self.answer,
        }
    }
}
