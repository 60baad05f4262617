//! Session listing and history HTTP handlers.
//!
//! Endpoints:
//! - GET /api/v1/conversation/sessions              - List sessions, oldest first
//! - GET /api/v1/conversation/sessions/{id}/history - One page of a session's turns

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use colloquy_types::session::SessionSummary;
use colloquy_types::turn::SessionHistory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Paging query parameters: either `from`/`size` or 1-based `page`/`page_size`.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub from: Option<u32>,
    pub size: Option<u32>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SessionList {
    pub sessions: Vec<SessionSummary>,
}

/// GET /api/v1/conversation/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<SessionList>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let page = state.page(query.from, query.size, query.page, query.page_size);
    let sessions = state.query_service.list_sessions(page).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(SessionList { sessions }, request_id, elapsed)
        .with_link("self", "/api/v1/conversation/sessions");
    Ok(Json(resp))
}

/// GET /api/v1/conversation/sessions/{id}/history
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<SessionHistory>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let page = state.page(query.from, query.size, query.page, query.page_size);
    let history = state.query_service.get_history(&session_id, page).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(history, request_id, elapsed).with_link(
        "self",
        &format!("/api/v1/conversation/sessions/{session_id}/history"),
    );
    Ok(Json(resp))
}
