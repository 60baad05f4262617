//! OpenAI-compatible inference engine.
//!
//! Maps a flat predict request onto a chat-completions call: the encoded
//! `chat_history` is decoded back into alternating user/assistant messages,
//! followed by the current question as the final user message. The request's
//! `model_id` is used as the completion model.
//!
//! Uses [`async_openai`] for type-safe request/response handling.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use colloquy_core::inference::codec::ChatHistoryFormat;
use colloquy_core::inference::engine::InferenceEngine;
use colloquy_types::chat::{CHAT_HISTORY_FORMAT_PARAM, CHAT_HISTORY_PARAM, QUESTION_PARAM};
use colloquy_types::inference::{InferenceError, InferenceOutput, InferenceRequest};
use secrecy::{ExposeSecret, SecretString};

/// Optional parameter carrying a system prompt.
pub const SYSTEM_PROMPT_PARAM: &str = "system_prompt";

/// Optional parameter carrying the sampling temperature.
pub const TEMPERATURE_PARAM: &str = "temperature";

/// Engine for any OpenAI-compatible chat completions API.
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompatEngine {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompatEngine {
    pub fn new(base_url: &str, api_key: &SecretString) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(base_url);
        Self {
            client: Client::with_config(config),
        }
    }

    /// Build a [`CreateChatCompletionRequest`] from a flat predict request.
    fn build_request(request: &InferenceRequest) -> Result<CreateChatCompletionRequest, InferenceError> {
        let params = &request.parameters;
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if let Some(system) = params.get(SYSTEM_PROMPT_PARAM) {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(system.clone()),
                    name: None,
                },
            ));
        }

        if let Some(raw) = params.get(CHAT_HISTORY_PARAM) {
            let format_name = params
                .get(CHAT_HISTORY_FORMAT_PARAM)
                .map(String::as_str)
                .unwrap_or(ChatHistoryFormat::default().as_str());
            let format = ChatHistoryFormat::from_name(format_name).ok_or_else(|| {
                InferenceError::InvalidHistory(format!("unsupported history format '{format_name}'"))
            })?;

            for (question, answer) in format.decode_pairs(raw)? {
                messages.push(user_message(question));
                messages.push(assistant_message(answer));
            }
        }

        let question = params.get(QUESTION_PARAM).cloned().unwrap_or_default();
        messages.push(user_message(question));

        let temperature = params
            .get(TEMPERATURE_PARAM)
            .map(|t| {
                t.parse::<f32>().map_err(|e| InferenceError::Engine {
                    message: format!("invalid {TEMPERATURE_PARAM} '{t}': {e}"),
                })
            })
            .transpose()?;

        Ok(CreateChatCompletionRequest {
            model: request.model_id.clone(),
            messages,
            temperature,
            ..Default::default()
        })
    }
}

fn user_message(text: String) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
        content: ChatCompletionRequestUserMessageContent::Text(text),
        name: None,
    })
}

fn assistant_message(text: String) -> ChatCompletionRequestMessage {
    #[allow(deprecated)]
    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
        content: Some(ChatCompletionRequestAssistantMessageContent::Text(text)),
        refusal: None,
        name: None,
        audio: None,
        tool_calls: None,
        function_call: None,
    })
}

impl InferenceEngine for OpenAiCompatEngine {
    fn name(&self) -> &str {
        "openai"
    }

    async fn predict(&self, request: &InferenceRequest) -> Result<InferenceOutput, InferenceError> {
        let oai_request = Self::build_request(request)?;

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(|e| map_openai_error(e, &request.model_id))?;

        let choice = response.choices.into_iter().next().ok_or_else(|| InferenceError::Engine {
            message: "no choices returned".to_string(),
        })?;
        let answer = choice.message.content.unwrap_or_default();

        Ok(InferenceOutput { answer })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`InferenceError`].
fn map_openai_error(err: async_openai::error::OpenAIError, model_id: &str) -> InferenceError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
            {
                InferenceError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                InferenceError::RateLimited
            } else if code == "model_not_found" {
                InferenceError::ModelNotFound(model_id.to_string())
            } else {
                InferenceError::Engine {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => InferenceError::AuthenticationFailed,
            Some(404) => InferenceError::ModelNotFound(model_id.to_string()),
            Some(429) => InferenceError::RateLimited,
            _ => InferenceError::Transport(err.to_string()),
        },
        OpenAIError::JSONDeserialize(_, content) => {
            InferenceError::Deserialization(format!("failed to parse response: {content}"))
        }
        _ => InferenceError::Engine {
            message: err.to_string(),
        },
    }
}
