//! The chat request path and the read-side query path.
//!
//! `ChatService::chat` runs history window -> inference -> (lazy session
//! creation) -> turn append. `ConversationQueryService` is an independent
//! read path over the same two stores.

pub mod history;
pub mod query;
pub mod recorder;
pub mod service;
pub mod stage;
