//! Conversation turn types.
//!
//! A turn is one question/answer exchange. Turns form an append-only log per
//! session, ordered by `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// A persisted turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Store-assigned identifier.
    pub id: String,
    pub session_id: SessionId,
    pub question: String,
    pub answer: String,
    /// Sole ordering key within a session.
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// A turn about to be appended. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTurn {
    pub session_id: SessionId,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl NewTurn {
    /// Stamp a finished exchange with the current time.
    pub fn now(session_id: SessionId, question: String, answer: String) -> Self {
        Self {
            session_id,
            question,
            answer,
            created_at: Utc::now(),
        }
    }
}

/// One entry of a session's history page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStep {
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl From<Turn> for HistoryStep {
    fn from(turn: Turn) -> Self {
        Self {
            question: turn.question,
            answer: turn.answer,
            created_at: turn.created_at,
        }
    }
}

/// A page of a session's turns, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHistory {
    pub session_id: SessionId,
    pub steps: Vec<HistoryStep>,
}
