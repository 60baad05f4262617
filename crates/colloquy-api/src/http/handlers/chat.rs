//! Chat and session creation HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/conversation/_chat   - Ask a question, optionally in an existing session
//! - POST /api/v1/conversation/_create - Create an empty session for a user

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use colloquy_types::chat::{ChatRequest, ChatResponse, CreateSessionRequest, CreateSessionResponse};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/conversation/_chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let response = state.chat_service.chat(request).await?;

    let history_link = format!(
        "/api/v1/conversation/sessions/{}/history",
        response.session_id
    );
    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(response, request_id, elapsed).with_link("history", &history_link),
    ))
}

/// POST /api/v1/conversation/_create
pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CreateSessionResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let response = state.chat_service.create_session(request).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(response, request_id, elapsed)))
}
