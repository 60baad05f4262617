//! HTTP request handlers for the conversation API.

pub mod chat;
pub mod session;
