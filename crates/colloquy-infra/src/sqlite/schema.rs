//! Lazy, versioned creation of the conversation collections.
//!
//! Each collection records its schema version in `collection_meta`. Creation
//! is idempotent (`IF NOT EXISTS` plus `INSERT OR IGNORE`) and runs in one
//! writer transaction, so concurrent first writers both succeed. A stored
//! version newer than the one this build knows is refused.

use chrono::Utc;
use colloquy_types::error::RepositoryError;
use sqlx::Row;
use tracing::{debug, info};

use super::pool::DatabasePool;

const META_DDL: &str = r#"CREATE TABLE IF NOT EXISTS collection_meta (
    name TEXT PRIMARY KEY,
    schema_version INTEGER NOT NULL,
    created_time INTEGER NOT NULL
)"#;

const SESSIONS_DDL: &[&str] = &[r#"CREATE TABLE IF NOT EXISTS conversation_sessions (
    id TEXT PRIMARY KEY,
    model_id TEXT NOT NULL,
    title TEXT,
    user_id TEXT,
    created_time INTEGER NOT NULL,
    last_updated_time INTEGER NOT NULL
)"#];

// No foreign key on session_id: a turn may name a session that was never
// created through this store.
const TURNS_DDL: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS conversation_turns (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    created_time INTEGER NOT NULL,
    last_updated_time INTEGER NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_conversation_turns_session ON conversation_turns (session_id, created_time)",
];

/// A persisted collection and its current schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Sessions,
    Turns,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Sessions => "conversation_sessions",
            Collection::Turns => "conversation_turns",
        }
    }

    pub fn version(&self) -> i64 {
        match self {
            Collection::Sessions => 1,
            Collection::Turns => 1,
        }
    }

    fn ddl(&self) -> &'static [&'static str] {
        match self {
            Collection::Sessions => SESSIONS_DDL,
            Collection::Turns => TURNS_DDL,
        }
    }
}

/// Create `collection` (and the version table) if missing, then verify its version.
pub async fn ensure_collection(pool: &DatabasePool, collection: Collection) -> Result<(), RepositoryError> {
    let init_err = |e: sqlx::Error| RepositoryError::Init(format!("{}: {e}", collection.table()));

    let mut tx = pool.writer.begin().await.map_err(init_err)?;

    sqlx::query(META_DDL).execute(&mut *tx).await.map_err(init_err)?;

    let stored: Option<i64> =
        sqlx::query("SELECT schema_version FROM collection_meta WHERE name = ?")
            .bind(collection.table())
            .fetch_optional(&mut *tx)
            .await
            .map_err(init_err)?
            .map(|row| row.try_get("schema_version"))
            .transpose()
            .map_err(init_err)?;

    if let Some(version) = stored {
        if version > collection.version() {
            return Err(RepositoryError::Init(format!(
                "{} is at schema version {version}, this build supports {}",
                collection.table(),
                collection.version()
            )));
        }
    }

    for statement in collection.ddl() {
        sqlx::query(statement).execute(&mut *tx).await.map_err(init_err)?;
    }

    sqlx::query(
        "INSERT OR IGNORE INTO collection_meta (name, schema_version, created_time) VALUES (?, ?, ?)",
    )
    .bind(collection.table())
    .bind(collection.version())
    .bind(Utc::now().timestamp_millis())
    .execute(&mut *tx)
    .await
    .map_err(init_err)?;

    tx.commit().await.map_err(init_err)?;

    if stored.is_none() {
        info!(collection = collection.table(), version = collection.version(), "Collection created");
    } else {
        debug!(collection = collection.table(), "Collection already present");
    }
    Ok(())
}

/// Whether `collection`'s table exists, checked through the reader pool.
pub async fn collection_exists(pool: &DatabasePool, collection: Collection) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?")
        .bind(collection.table())
        .fetch_optional(&pool.reader)
        .await?;
    Ok(row.is_some())
}
