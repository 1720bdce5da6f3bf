// src/api/http/turn.rs

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{
    ChapterView, ResetRequest, ResetResponse, SessionStateView, TurnRequest, TurnResponse,
};
use crate::state::AppState;
use crate::workflow::{self, Session};

pub async fn health_handler() -> &'static str {
    "ok"
}

pub async fn turn_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TurnRequest>,
) -> ApiResult<Json<TurnResponse>> {
    if request.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".to_string()));
    }
    let code = request.code.trim();
    if code.is_empty() {
        return Err(ApiError::Validation("code must not be empty".to_string()));
    }
    if !state.is_valid_code(code) {
        return Err(ApiError::Auth);
    }

    // Serialize turns per code around the whole read-modify-write cycle.
    let lock = state.turn_lock(code);
    let _guard = lock.lock().await;

    let record = state.store.get(code).await?;
    let (session, expected_version) = match record {
        Some(record) => (record.session, Some(record.version)),
        // First successful authentication of a code creates the session.
        None => (Session::default(), None),
    };

    info!("turn for {}: status={}", code, session.status.as_str());

    let outcome = workflow::process_turn(
        session,
        &request.message,
        state.generator.as_ref(),
        &state.engine_options,
    )
    .await?;

    if outcome.changed {
        // A lost write is logged, not surfaced: the reply already reflects
        // the generation work, and the next turn will simply observe the
        // stale pre-call state.
        if let Err(err) = state
            .store
            .put(code, &outcome.session, expected_version)
            .await
        {
            error!("session write for {} lost: {}", code, err);
        }
    }

    Ok(Json(TurnResponse {
        reply: outcome.reply,
        state: SessionStateView::from_session(&outcome.session),
        chapters: outcome
            .chapters
            .map(|chapters| chapters.into_iter().map(ChapterView::from).collect()),
    }))
}

pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetRequest>,
) -> ApiResult<Json<ResetResponse>> {
    let code = request.code.trim();
    if code.is_empty() {
        return Err(ApiError::Validation("code must not be empty".to_string()));
    }
    if !state.is_valid_code(code) {
        return Err(ApiError::Auth);
    }

    let lock = state.turn_lock(code);
    let _guard = lock.lock().await;

    state.store.reset(code).await?;
    info!("session {} reset", code);
    Ok(Json(ResetResponse { ok: true }))
}
