//! TurnRepository trait definition.

use colloquy_types::error::RepositoryError;
use colloquy_types::page::Page;
use colloquy_types::session::SessionId;
use colloquy_types::turn::{NewTurn, Turn};

/// Persistence for question/answer turns.
///
/// Ties on `created_at` are broken by insertion order so every listing is
/// deterministic.
pub trait TurnRepository: Send + Sync {
    /// Create the turn collection if it does not exist yet. Idempotent.
    fn ensure_schema(
        &self,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append a turn to its session and return the new turn's id.
    fn append_turn(
        &self,
        turn: &NewTurn,
    ) -> impl std::future::Future<Output = Result<String, RepositoryError>> + Send;

    /// The `limit` most recent turns of a session, newest first.
    ///
    /// A session (or collection) that does not exist yields an empty list.
    fn recent_turns(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// One page of a session's turns, oldest first.
    fn turn_page(
        &self,
        session_id: &SessionId,
        page: Page,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;
}
