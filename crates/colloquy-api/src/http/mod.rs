//! HTTP/REST API layer for Colloquy.
//!
//! Axum-based REST API under `/api/v1/conversation` with the envelope
//! response format and CORS support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
