//! Infrastructure layer for Colloquy.
//!
//! Contains implementations of the traits defined in `colloquy-core`:
//! SQLite session and turn stores, HTTP inference engines, and the
//! configuration loader.

pub mod config;
pub mod inference;
pub mod sqlite;
