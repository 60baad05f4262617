use std::error::Error as StdError;

use thiserror::Error;

use crate::inference::InferenceError;
use crate::session::SessionId;

/// Errors from store operations (used by trait definitions in colloquy-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("schema initialization failed: {0}")]
    Init(String),

    #[error("read failed: {0}")]
    Read(String),

    #[error("write failed: {0}")]
    Write(String),
}

/// Terminal outcome of a conversation operation.
///
/// Every variant aborts the operation it was raised in. Lower-level causes
/// are kept as `source()` so callers can walk the full chain.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Store errors raised outside the chat write path map onto these three
    /// kinds by [`RepositoryError`] variant. The chat path reports its store
    /// failures as `SessionCreation` or `TurnAppend` with the store error as cause.
    #[error("storage could not be initialized")]
    StorageInit(#[source] RepositoryError),

    #[error("storage read failed")]
    StorageRead(#[source] RepositoryError),

    #[error("storage write failed")]
    StorageWrite(#[source] RepositoryError),

    #[error("history for session '{session_id}' is unavailable")]
    HistoryUnavailable {
        session_id: SessionId,
        #[source]
        source: RepositoryError,
    },

    #[error("inference with model '{model_id}' failed")]
    Inference {
        model_id: String,
        #[source]
        source: InferenceError,
    },

    #[error("session could not be created")]
    SessionCreation(#[source] RepositoryError),

    /// The session exists (possibly freshly created) but has no record of this turn.
    #[error("turn could not be appended to session '{session_id}'")]
    TurnAppend {
        session_id: SessionId,
        #[source]
        source: RepositoryError,
    },

    #[error("not found: {0}")]
    NotFound(String),
}

impl ConversationError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ConversationError::InvalidRequest(_) => "INVALID_REQUEST",
            ConversationError::StorageInit(_) => "STORAGE_INIT_ERROR",
            ConversationError::StorageRead(_) => "STORAGE_READ_ERROR",
            ConversationError::StorageWrite(_) => "STORAGE_WRITE_ERROR",
            ConversationError::HistoryUnavailable { .. } => "HISTORY_UNAVAILABLE",
            ConversationError::Inference { .. } => "INFERENCE_ERROR",
            ConversationError::SessionCreation(_) => "SESSION_CREATION_ERROR",
            ConversationError::TurnAppend { .. } => "TURN_APPEND_ERROR",
            ConversationError::NotFound(_) => "NOT_FOUND",
        }
    }

    /// This error's message followed by every underlying cause, outermost first.
    pub fn cause_chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut source = self.source();
        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }
        chain
    }

    /// The chain joined into one line, e.g. for logs and API error messages.
    pub fn describe(&self) -> String {
        self.cause_chain().join(": ")
    }
}

impl From<RepositoryError> for ConversationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Init(_) => ConversationError::StorageInit(err),
            RepositoryError::Read(_) => ConversationError::StorageRead(err),
            RepositoryError::Write(_) => ConversationError::StorageWrite(err),
        }
    }
}
