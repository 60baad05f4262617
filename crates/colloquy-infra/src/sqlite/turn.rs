//! SQLite turn repository implementation.
//!
//! Turns are an append-only log keyed by session. Listings order by
//! `created_time` and break ties with `rowid`, i.e. insertion order.

use std::sync::Arc;

use colloquy_core::repository::turn::TurnRepository;
use colloquy_types::error::RepositoryError;
use colloquy_types::page::Page;
use colloquy_types::session::SessionId;
use colloquy_types::turn::{NewTurn, Turn};
use sqlx::Row;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::schema::{self, Collection};
use super::session::from_millis;

/// SQLite-backed implementation of `TurnRepository`.
#[derive(Clone)]
pub struct SqliteTurnRepository {
    pool: DatabasePool,
    schema: Arc<OnceCell<()>>,
}

impl SqliteTurnRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            schema: Arc::new(OnceCell::new()),
        }
    }

    async fn collection_ready(&self) -> Result<bool, RepositoryError> {
        if self.schema.initialized() {
            return Ok(true);
        }
        schema::collection_exists(&self.pool, Collection::Turns)
            .await
            .map_err(|e| RepositoryError::Read(e.to_string()))
    }

    async fn fetch(
        &self,
        sql: &str,
        session_id: &SessionId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Turn>, RepositoryError> {
        if !self.collection_ready().await? {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(sql)
            .bind(session_id.as_str())
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Read(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn_row = TurnRow::from_row(row).map_err(|e| RepositoryError::Read(e.to_string()))?;
            turns.push(turn_row.into_turn()?);
        }
        Ok(turns)
    }
}

struct TurnRow {
    id: String,
    session_id: String,
    question: String,
    answer: String,
    created_time: i64,
    last_updated_time: i64,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
            created_time: row.try_get("created_time")?,
            last_updated_time: row.try_get("last_updated_time")?,
        })
    }

    fn into_turn(self) -> Result<Turn, RepositoryError> {
        Ok(Turn {
            id: self.id,
            session_id: SessionId(self.session_id),
            question: self.question,
            answer: self.answer,
            created_at: from_millis(self.created_time)?,
            last_updated_at: from_millis(self.last_updated_time)?,
        })
    }
}

const RECENT_SQL: &str = r#"SELECT id, session_id, question, answer, created_time, last_updated_time
    FROM conversation_turns WHERE session_id = ?
    ORDER BY created_time DESC, rowid DESC LIMIT ? OFFSET ?"#;

const PAGE_SQL: &str = r#"SELECT id, session_id, question, answer, created_time, last_updated_time
    FROM conversation_turns WHERE session_id = ?
    ORDER BY created_time ASC, rowid ASC LIMIT ? OFFSET ?"#;

impl TurnRepository for SqliteTurnRepository {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        self.schema
            .get_or_try_init(|| schema::ensure_collection(&self.pool, Collection::Turns))
            .await
            .map(|_| ())
    }

    async fn append_turn(&self, turn: &NewTurn) -> Result<String, RepositoryError> {
        let id = Uuid::now_v7().to_string();
        let created = turn.created_at.timestamp_millis();

        sqlx::query(
            r#"INSERT INTO conversation_turns (id, session_id, question, answer, created_time, last_updated_time)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(turn.session_id.as_str())
        .bind(&turn.question)
        .bind(&turn.answer)
        .bind(created)
        .bind(created)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Write(e.to_string()))?;

        Ok(id)
    }

    async fn recent_turns(&self, session_id: &SessionId, limit: u32) -> Result<Vec<Turn>, RepositoryError> {
        self.fetch(RECENT_SQL, session_id, limit, 0).await
    }

    async fn turn_page(&self, session_id: &SessionId, page: Page) -> Result<Vec<Turn>, RepositoryError> {
        self.fetch(PAGE_SQL, session_id, page.size, page.from).await
    }
}
