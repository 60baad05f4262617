//! Shared domain types for Colloquy.
//!
//! This crate contains the core domain types used across the Colloquy
//! workspace: sessions, turns, chat requests/responses, pagination,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod inference;
pub mod page;
pub mod session;
pub mod turn;
