//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and the
//! REST API. Services are generic over the store traits; AppState pins them
//! to the SQLite implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use colloquy_core::chat::query::ConversationQueryService;
use colloquy_core::chat::service::ChatService;
use colloquy_core::inference::box_engine::BoxInferenceEngine;
use colloquy_infra::config::{load_global_config, resolve_data_dir};
use colloquy_infra::inference::{create_engine, resolve_api_key};
use colloquy_infra::sqlite::pool::{DatabasePool, database_url};
use colloquy_infra::sqlite::session::SqliteSessionRepository;
use colloquy_infra::sqlite::turn::SqliteTurnRepository;
use colloquy_types::config::GlobalConfig;
use colloquy_types::page::Page;

pub type ConcreteChatService = ChatService<SqliteSessionRepository, SqliteTurnRepository>;

pub type ConcreteQueryService =
    ConversationQueryService<SqliteSessionRepository, SqliteTurnRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub query_service: Arc<ConcreteQueryService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;
        let db_pool = DatabasePool::new(&database_url(&data_dir))
            .await
            .context("failed to open the conversation database")?;

        let api_key = resolve_api_key(&config.inference);
        let engine = create_engine(&config.inference, api_key.as_deref())
            .context("failed to configure the inference engine")?;
        tracing::debug!(
            engine = engine.name(),
            base_url = %config.inference.base_url,
            "Inference engine ready"
        );

        Ok(Self::from_parts(data_dir, db_pool, config, engine))
    }

    /// Wire services over an already-open pool and engine.
    pub fn from_parts(
        data_dir: PathBuf,
        db_pool: DatabasePool,
        config: GlobalConfig,
        engine: BoxInferenceEngine,
    ) -> Self {
        // Both services share the same repositories so the schema-ready flag is shared too
        let sessions = SqliteSessionRepository::new(db_pool.clone());
        let turns = SqliteTurnRepository::new(db_pool.clone());

        let chat_service = ChatService::new(sessions.clone(), turns.clone(), engine)
            .with_history_window(config.history_window);
        let query_service = ConversationQueryService::new(sessions, turns)
            .with_empty_result_policy(config.empty_result_policy);

        Self {
            chat_service: Arc::new(chat_service),
            query_service: Arc::new(query_service),
            config: Arc::new(config),
            data_dir,
            db_pool,
        }
    }

    /// Resolve optional caller paging into a window, falling back to the configured page size.
    ///
    /// `from`/`size` take precedence over the 1-based `page`/`page_size` form.
    pub fn page(
        &self,
        from: Option<u32>,
        size: Option<u32>,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Page {
        let default_size = self.config.default_page_size;
        match (from, page) {
            (Some(from), _) => Page::new(from, size.or(page_size).unwrap_or(default_size)),
            (None, Some(page)) => {
                Page::from_page_number(page, page_size.or(size).unwrap_or(default_size))
            }
            (None, None) => Page::new(0, size.or(page_size).unwrap_or(default_size)),
        }
    }
}
