//! Inference request/response types.
//!
//! These model the boundary with the external inference engine: a model id
//! plus a flat string parameter map in, an opaque answer string out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub model_id: String,
    pub parameters: BTreeMap<String, String>,
}

/// The engine's answer. The core never interprets its contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceOutput {
    pub answer: String,
}

/// Errors from inference engine operations.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("engine error: {message}")]
    Engine { message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("invalid chat history: {0}")]
    InvalidHistory(String),
}
