//! Wire encoding of conversation history inside the engine's parameter map.
//!
//! The parameter map is flat strings only, so the ordered history list is
//! serialized into a single value under `chat_history`, and the encoding is
//! named under `chat_history_format` so engines never have to guess.
//!
//! `json_array_v1`: a JSON array of strings, oldest first, alternating
//! question and answer: `["q1","a1","q2","a2"]`. Every string survives
//! verbatim, including quotes, commas, brackets and newlines.

use colloquy_types::inference::InferenceError;

/// Supported history encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatHistoryFormat {
    #[default]
    JsonArrayV1,
}

impl ChatHistoryFormat {
    /// Value written under `chat_history_format`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatHistoryFormat::JsonArrayV1 => "json_array_v1",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "json_array_v1" => Some(ChatHistoryFormat::JsonArrayV1),
            _ => None,
        }
    }

    /// Serialize the interleaved history.
    pub fn encode(&self, history: &[String]) -> Result<String, InferenceError> {
        match self {
            ChatHistoryFormat::JsonArrayV1 => serde_json::to_string(history)
                .map_err(|e| InferenceError::InvalidHistory(e.to_string())),
        }
    }

    /// Inverse of [`encode`](Self::encode).
    pub fn decode(&self, raw: &str) -> Result<Vec<String>, InferenceError> {
        match self {
            ChatHistoryFormat::JsonArrayV1 => serde_json::from_str(raw)
                .map_err(|e| InferenceError::InvalidHistory(e.to_string())),
        }
    }

    /// Decode into `(question, answer)` pairs, oldest first.
    ///
    /// An odd-length list is malformed.
    pub fn decode_pairs(&self, raw: &str) -> Result<Vec<(String, String)>, InferenceError> {
        let entries = self.decode(raw)?;
        if entries.len() % 2 != 0 {
            return Err(InferenceError::InvalidHistory(format!(
                "expected question/answer pairs, got {} entries",
                entries.len()
            )));
        }
        let mut pairs = Vec::with_capacity(entries.len() / 2);
        let mut iter = entries.into_iter();
        while let (Some(question), Some(answer)) = (iter.next(), iter.next()) {
            pairs.push((question, answer));
        }
        Ok(pairs)
    }
}
