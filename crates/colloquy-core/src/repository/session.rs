//! SessionRepository trait definition.

use chrono::{DateTime, Utc};
use colloquy_types::error::RepositoryError;
use colloquy_types::page::Page;
use colloquy_types::session::{NewSession, Session, SessionId};

/// Persistence for conversation sessions.
///
/// Implementations live in colloquy-infra (e.g., `SqliteSessionRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait SessionRepository: Send + Sync {
    /// Create the session collection if it does not exist yet.
    ///
    /// Idempotent: a second call (including one racing the first) succeeds
    /// without side effects.
    fn ensure_schema(
        &self,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Persist a new session and return its store-assigned id.
    fn create_session(
        &self,
        session: &NewSession,
    ) -> impl std::future::Future<Output = Result<SessionId, RepositoryError>> + Send;

    /// Get a session by id.
    fn get_session(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Option<Session>, RepositoryError>> + Send;

    /// List sessions ordered by creation time, oldest first.
    fn list_sessions(
        &self,
        page: Page,
    ) -> impl std::future::Future<Output = Result<Vec<Session>, RepositoryError>> + Send;

    /// Bump `last_updated_at` after a turn lands in the session.
    fn touch_session(
        &self,
        session_id: &SessionId,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
