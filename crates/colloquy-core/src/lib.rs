//! Conversation orchestration and store trait definitions for Colloquy.
//!
//! This crate defines the "ports" (store traits and the inference engine
//! trait) that the infrastructure layer implements, plus the chat pipeline
//! built on top of them. It depends only on `colloquy-types` -- never on
//! `colloquy-infra` or any database/IO crate.

pub mod chat;
pub mod context;
pub mod inference;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
