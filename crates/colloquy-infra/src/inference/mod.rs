//! Inference engine adapters.
//!
//! Contains concrete implementations of the [`InferenceEngine`] trait
//! defined in `colloquy-core`, and a factory ([`create_engine`]) that
//! constructs the configured one.
//!
//! [`InferenceEngine`]: colloquy_core::inference::engine::InferenceEngine

pub mod openai_compat;
pub mod remote;

use std::time::Duration;

use colloquy_core::inference::box_engine::BoxInferenceEngine;
use colloquy_types::config::{InferenceBackend, InferenceConfig};
use colloquy_types::inference::InferenceError;
use secrecy::SecretString;

use self::openai_compat::OpenAiCompatEngine;
use self::remote::RemotePredictEngine;

/// Create a [`BoxInferenceEngine`] from an [`InferenceConfig`].
///
/// `api_key` is the already-resolved secret value. The OpenAI-compatible
/// backend requires one; the remote predict endpoint sends it as a bearer
/// token when present.
pub fn create_engine(
    config: &InferenceConfig,
    api_key: Option<&str>,
) -> Result<BoxInferenceEngine, InferenceError> {
    let secret = api_key.map(|key| SecretString::from(key.to_string()));
    match config.backend {
        InferenceBackend::Remote => {
            let engine = RemotePredictEngine::new(
                config.base_url.clone(),
                secret,
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(BoxInferenceEngine::new(engine))
        }
        InferenceBackend::Openai => {
            let secret = secret.ok_or(InferenceError::AuthenticationFailed)?;
            Ok(BoxInferenceEngine::new(OpenAiCompatEngine::new(&config.base_url, &secret)))
        }
    }
}

/// Read the API key named by `config.api_key_env`, if any.
pub fn resolve_api_key(config: &InferenceConfig) -> Option<String> {
    config
        .api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .filter(|key| !key.is_empty())
}
