//! SQLite session repository implementation.
//!
//! Implements `SessionRepository` from `colloquy-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, epoch-millisecond
//! timestamps.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use colloquy_core::repository::session::SessionRepository;
use colloquy_types::error::RepositoryError;
use colloquy_types::page::Page;
use colloquy_types::session::{NewSession, Session, SessionId};
use sqlx::Row;
use tokio::sync::OnceCell;

use super::pool::DatabasePool;
use super::schema::{self, Collection};

/// SQLite-backed implementation of `SessionRepository`.
///
/// Clones share the schema-initialized flag, so the collection check runs
/// once per process.
#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: DatabasePool,
    schema: Arc<OnceCell<()>>,
}

impl SqliteSessionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            schema: Arc::new(OnceCell::new()),
        }
    }

    /// Reads against a collection that was never created see no rows.
    async fn collection_ready(&self) -> Result<bool, sqlx::Error> {
        if self.schema.initialized() {
            return Ok(true);
        }
        schema::collection_exists(&self.pool, Collection::Sessions).await
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    id: String,
    model_id: String,
    title: Option<String>,
    user_id: Option<String>,
    created_time: i64,
    last_updated_time: i64,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            model_id: row.try_get("model_id")?,
            title: row.try_get("title")?,
            user_id: row.try_get("user_id")?,
            created_time: row.try_get("created_time")?,
            last_updated_time: row.try_get("last_updated_time")?,
        })
    }

    fn into_session(self) -> Result<Session, RepositoryError> {
        Ok(Session {
            id: SessionId(self.id),
            title: self.title,
            model_id: self.model_id,
            user_id: self.user_id,
            created_at: from_millis(self.created_time)?,
            last_updated_at: from_millis(self.last_updated_time)?,
        })
    }
}

pub(crate) fn from_millis(ms: i64) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| RepositoryError::Read(format!("invalid timestamp: {ms}")))
}

const SELECT_COLUMNS: &str =
    "SELECT id, model_id, title, user_id, created_time, last_updated_time FROM conversation_sessions";

// ---------------------------------------------------------------------------
// SessionRepository implementation
// ---------------------------------------------------------------------------

impl SessionRepository for SqliteSessionRepository {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        self.schema
            .get_or_try_init(|| schema::ensure_collection(&self.pool, Collection::Sessions))
            .await
            .map(|_| ())
    }

    async fn create_session(&self, session: &NewSession) -> Result<SessionId, RepositoryError> {
        let id = SessionId::generate();
        let created = session.created_at.timestamp_millis();

        sqlx::query(
            r#"INSERT INTO conversation_sessions (id, model_id, title, user_id, created_time, last_updated_time)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.as_str())
        .bind(&session.model_id)
        .bind(&session.title)
        .bind(&session.user_id)
        .bind(created)
        .bind(created)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Write(e.to_string()))?;

        Ok(id)
    }

    async fn get_session(&self, session_id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        if !self
            .collection_ready()
            .await
            .map_err(|e| RepositoryError::Read(e.to_string()))?
        {
            return Ok(None);
        }

        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(session_id.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Read(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row =
                    SessionRow::from_row(&row).map_err(|e| RepositoryError::Read(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn list_sessions(&self, page: Page) -> Result<Vec<Session>, RepositoryError> {
        if !self
            .collection_ready()
            .await
            .map_err(|e| RepositoryError::Read(e.to_string()))?
        {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY created_time ASC, rowid ASC LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(page.size))
        .bind(i64::from(page.from))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Read(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row =
                SessionRow::from_row(row).map_err(|e| RepositoryError::Read(e.to_string()))?;
            sessions.push(session_row.into_session()?);
        }

        Ok(sessions)
    }

    async fn touch_session(
        &self,
        session_id: &SessionId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if !self
            .collection_ready()
            .await
            .map_err(|e| RepositoryError::Write(e.to_string()))?
        {
            return Ok(());
        }

        sqlx::query("UPDATE conversation_sessions SET last_updated_time = ? WHERE id = ?")
            .bind(at.timestamp_millis())
            .bind(session_id.as_str())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Write(e.to_string()))?;

        Ok(())
    }
}
