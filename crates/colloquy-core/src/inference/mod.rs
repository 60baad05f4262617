//! Inference engine abstraction and the history-aware invoker.
//!
//! `InferenceEngine` is the port adapters implement; `BoxInferenceEngine`
//! erases it for runtime backend selection; `ChatHistoryFormat` fixes how
//! prior turns travel inside the flat parameter map.

pub mod box_engine;
pub mod codec;
pub mod engine;
pub mod invoker;
