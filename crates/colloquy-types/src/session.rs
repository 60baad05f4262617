//! Conversation session types.
//!
//! A session is one conversation thread bound to an inference model.
//! Session identifiers are minted by the session store, never by clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Opaque, store-assigned identifier of a conversation session.
///
/// The SQLite store mints UUID v7 strings, but callers must treat the value
/// as opaque text: any non-empty string handed back by a store is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Mint a fresh, time-sortable identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Interpret an optional caller-supplied id.
    ///
    /// `None`, empty, and whitespace-only strings all mean "no session yet".
    pub fn from_optional(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_optional(Some(s)).ok_or_else(|| "session id can not be empty".to_string())
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A conversation session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Human-readable label; defaults to the first question of the thread.
    pub title: Option<String>,
    /// Inference model bound to this session.
    pub model_id: String,
    /// Owner label recorded by explicit session creation.
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Bumped whenever a turn is appended.
    pub last_updated_at: DateTime<Utc>,
}

/// Data needed to create a session. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSession {
    pub title: Option<String>,
    pub model_id: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewSession {
    /// A session opened lazily by the first chat turn, titled by its question.
    pub fn from_first_question(question: &str, model_id: &str) -> Self {
        let title = Some(question.trim())
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        Self {
            title,
            model_id: model_id.to_string(),
            user_id: None,
            created_at: Utc::now(),
        }
    }

    /// A session created explicitly on behalf of a user, before any turn.
    pub fn for_user(user_id: &str, model_id: &str) -> Self {
        Self {
            title: None,
            model_id: model_id.to_string(),
            user_id: Some(user_id.to_string()),
            created_at: Utc::now(),
        }
    }
}

/// Listing element returned by the session query path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionSummary {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            title: session.title,
            created_at: session.created_at,
        }
    }
}
