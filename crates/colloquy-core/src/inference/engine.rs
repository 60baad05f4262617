//! InferenceEngine trait definition.

use colloquy_types::inference::{InferenceError, InferenceOutput, InferenceRequest};

/// Core abstraction over an external model-serving endpoint.
///
/// The engine receives the caller's parameters with the encoded history
/// merged in and returns an opaque answer string.
pub trait InferenceEngine: Send + Sync {
    /// Human-readable backend name (e.g., "remote", "openai").
    fn name(&self) -> &str;

    /// Run a single prediction.
    fn predict(
        &self,
        request: &InferenceRequest,
    ) -> impl std::future::Future<Output = Result<InferenceOutput, InferenceError>> + Send;
}
