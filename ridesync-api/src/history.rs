use axum::{
    extract::State,
    http::HeaderMap,
    routing::get,
    Json, Router,
};

use crate::{error::AppError, sessions::require_session, state::AppState};
use ridesync_core::{CompletedRide, LedgerStats};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(history))
        .route("/history/stats", get(stats))
}

async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<CompletedRide>>, AppError> {
    let (_, session) = require_session(&state.sessions, &headers).await?;
    let rows = state.ledger.history(&session.username).await?;
    Ok(Json(rows))
}

async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LedgerStats>, AppError> {
    let (_, session) = require_session(&state.sessions, &headers).await?;
    let stats = state.ledger.stats(&session.username).await?;
    Ok(Json(stats))
}
