//! BoxInferenceEngine -- object-safe dynamic dispatch wrapper for InferenceEngine.
//!
//! 1. Define an object-safe `InferenceEngineDyn` trait with boxed futures
//! 2. Blanket-impl `InferenceEngineDyn` for all `T: InferenceEngine`
//! 3. `BoxInferenceEngine` wraps `Box<dyn InferenceEngineDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use colloquy_types::inference::{InferenceError, InferenceOutput, InferenceRequest};

use super::engine::InferenceEngine;

/// Object-safe version of [`InferenceEngine`] with boxed futures.
pub trait InferenceEngineDyn: Send + Sync {
    fn name(&self) -> &str;

    fn predict_boxed<'a>(
        &'a self,
        request: &'a InferenceRequest,
    ) -> Pin<Box<dyn Future<Output = Result<InferenceOutput, InferenceError>> + Send + 'a>>;
}

impl<T: InferenceEngine> InferenceEngineDyn for T {
    fn name(&self) -> &str {
        InferenceEngine::name(self)
    }

    fn predict_boxed<'a>(
        &'a self,
        request: &'a InferenceRequest,
    ) -> Pin<Box<dyn Future<Output = Result<InferenceOutput, InferenceError>> + Send + 'a>> {
        Box::pin(self.predict(request))
    }
}

/// Type-erased inference engine for runtime backend selection.
///
/// Since `InferenceEngine` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxInferenceEngine` provides the same methods and delegates to
/// the inner `InferenceEngineDyn` trait object.
pub struct BoxInferenceEngine {
    inner: Box<dyn InferenceEngineDyn + Send + Sync>,
}

impl BoxInferenceEngine {
    /// Wrap a concrete `InferenceEngine` in a type-erased box.
    pub fn new<T: InferenceEngine + 'static>(engine: T) -> Self {
        Self {
            inner: Box::new(engine),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn predict(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceOutput, InferenceError> {
        self.inner.predict_boxed(request).await
    }
}
