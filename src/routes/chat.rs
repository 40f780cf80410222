//! Chat relay routes.
//!
//! The flow for `POST /api/message`:
//! 1. Append the caller's text as a `user` record.
//! 2. Load the full log (just-appended record included) and send it to the
//!    completion service.
//! 3. Append the generated text as an `assistant` record.
//! 4. Return the reply.
//!
//! All three routes operate on the one global conversation log; there is no
//! per-conversation or per-user partitioning, so concurrent callers share
//! context.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::db::{MessageStore, Role};
use crate::error::ServerError;
use crate::schemas::chat::{
    ChatTurn, ContextResponse, HistoryEntry, HistoryResponse, SendMessageRequest,
    SendMessageResponse,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(send_message, get_context, get_history),
    components(schemas(
        SendMessageRequest,
        SendMessageResponse,
        ContextResponse,
        HistoryResponse,
        ChatTurn,
        HistoryEntry,
        Role
    ))
)]
pub struct ChatApi;

/// Register chat relay routes (nested under `/api`).
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/message", post(send_message))
        .route("/context", get(get_context))
        .route("/history", get(get_history))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// Relay one user message (`POST /api/message`).
///
/// Appends the message, forwards the whole conversation to the completion
/// service, appends the generated reply, and returns it.  If the completion
/// call fails, the user record stays persisted and the log ends with an
/// unanswered user message; no rollback or retry is attempted.
#[utoipa::path(
    post,
    path = "/api/message",
    tag = "chat",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Reply generated and persisted", body = SendMessageResponse),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Storage error"),
        (status = 502, description = "Completion service failed; the user message is kept"),
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ServerError> {
    debug!(content_len = req.content.len(), "relaying user message");

    state.store.append(Role::User, &req.content).await?;

    let turns: Vec<ChatTurn> = state
        .store
        .list_all()
        .await?
        .iter()
        .map(|m| m.to_turn())
        .collect();

    let reply = state.completions.complete(&turns).await?;

    state.store.append(Role::Assistant, &reply).await?;

    info!(turns = turns.len(), reply_len = reply.len(), "completion relayed");

    Ok(Json(SendMessageResponse { reply }))
}

/// Conversation as the completion service sees it (`GET /api/context`).
///
/// The full log projected onto `{role, content}`, oldest first.
#[utoipa::path(
    get,
    path = "/api/context",
    tag = "chat",
    responses(
        (status = 200, description = "Full conversation, metadata stripped", body = ContextResponse),
        (status = 500, description = "Storage error"),
    )
)]
pub async fn get_context(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ContextResponse>, ServerError> {
    let context = state
        .store
        .list_all()
        .await?
        .iter()
        .map(|m| m.to_turn())
        .collect();
    Ok(Json(ContextResponse { context }))
}

/// Conversation with storage metadata (`GET /api/history`).
///
/// Every record with `id`, `timestamp`, `role`, and `content`, oldest first.
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "chat",
    responses(
        (status = 200, description = "Full conversation with ids and timestamps", body = HistoryResponse),
        (status = 500, description = "Storage error"),
    )
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let history: Vec<HistoryEntry> = state
        .store
        .list_all()
        .await?
        .iter()
        .map(|m| m.to_entry())
        .collect();
    Ok(Json(HistoryResponse { history }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
