//! Inference invoker: merges recalled history into the caller's parameters
//! and runs one prediction.

use std::collections::BTreeMap;

use colloquy_types::chat::{CHAT_HISTORY_FORMAT_PARAM, CHAT_HISTORY_PARAM};
use colloquy_types::error::ConversationError;
use colloquy_types::inference::{InferenceError, InferenceRequest};
use tracing::{debug, warn};

use super::box_engine::BoxInferenceEngine;
use super::codec::ChatHistoryFormat;

pub struct InferenceInvoker {
    engine: BoxInferenceEngine,
    format: ChatHistoryFormat,
}

impl InferenceInvoker {
    pub fn new(engine: BoxInferenceEngine) -> Self {
        Self {
            engine,
            format: ChatHistoryFormat::default(),
        }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Build the engine request: caller parameters plus the encoded history
    /// and its format marker. History keys supplied by the caller are replaced.
    pub fn build_request(
        &self,
        model_id: &str,
        parameters: &BTreeMap<String, String>,
        history: &[String],
    ) -> Result<InferenceRequest, InferenceError> {
        let mut parameters = parameters.clone();
        parameters.insert(CHAT_HISTORY_PARAM.to_string(), self.format.encode(history)?);
        parameters.insert(
            CHAT_HISTORY_FORMAT_PARAM.to_string(),
            self.format.as_str().to_string(),
        );
        Ok(InferenceRequest {
            model_id: model_id.to_string(),
            parameters,
        })
    }

    /// Run the prediction and return the engine's answer verbatim.
    pub async fn invoke(
        &self,
        model_id: &str,
        parameters: &BTreeMap<String, String>,
        history: &[String],
    ) -> Result<String, ConversationError> {
        let wrap = |source| ConversationError::Inference {
            model_id: model_id.to_string(),
            source,
        };

        let request = self
            .build_request(model_id, parameters, history)
            .map_err(wrap)?;

        debug!(
            engine = self.engine.name(),
            model_id,
            history_entries = history.len(),
            "Invoking inference engine"
        );

        match self.engine.predict(&request).await {
            Ok(output) => Ok(output.answer),
            Err(e) => {
                warn!(engine = self.engine.name(), model_id, error = %e, "Inference failed");
                Err(wrap(e))
            }
        }
    }
}
