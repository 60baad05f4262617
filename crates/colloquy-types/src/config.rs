//! Global configuration types for Colloquy.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! history window, read-side empty-result policy, pagination defaults, and
//! the inference engine connection.

use serde::{Deserialize, Serialize};

use crate::page::DEFAULT_PAGE_SIZE;

/// Top-level configuration for a Colloquy deployment.
///
/// Loaded from `~/.colloquy/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Number of most recent turns fed back to the engine as context.
    #[serde(default = "default_history_window")]
    pub history_window: u32,

    /// How the query path reports a page with zero hits.
    #[serde(default)]
    pub empty_result_policy: EmptyResultPolicy,

    /// Page size used when a caller does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Inference engine connection settings.
    #[serde(default)]
    pub inference: InferenceConfig,
}

fn default_history_window() -> u32 {
    20
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            empty_result_policy: EmptyResultPolicy::default(),
            default_page_size: default_page_size(),
            inference: InferenceConfig::default(),
        }
    }
}

/// Reporting of zero-hit pages from `get_history` / `list_sessions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// Zero hits is a successful, empty page.
    #[default]
    Empty,
    /// Zero hits is a `NotFound` failure.
    NotFound,
}

/// Which inference adapter to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceBackend {
    /// Generic HTTP predict endpoint (`POST {base_url}/models/{id}/_predict`).
    #[default]
    Remote,
    /// OpenAI-compatible chat completions API.
    Openai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub backend: InferenceBackend,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key, if any.
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:9200/_plugins/_ml".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: InferenceBackend::default(),
            base_url: default_base_url(),
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
