use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    sessions::require_session,
    state::AppState,
};
use ridesync_core::StoreError;

#[derive(Debug, Deserialize)]
struct CredentialsRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: Uuid,
    username: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<StatusCode, AppError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::ValidationError(
            "Username and password are required".to_string(),
        ));
    }

    match state.accounts.create(&req.username, &req.password).await {
        Ok(()) => Ok(StatusCode::CREATED),
        Err(StoreError::UniqueViolation(_)) => Err(AppError::ConflictError(
            "Username already taken".to_string(),
        )),
        Err(err) => Err(err.into()),
    }
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if !state.accounts.verify(&req.username, &req.password).await? {
        return Err(AppError::AuthenticationError(
            "Invalid credentials".to_string(),
        ));
    }

    let token = state.sessions.open(&req.username).await;
    tracing::info!(username = %req.username, "session opened");
    Ok(Json(LoginResponse {
        token,
        username: req.username,
    }))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let (token, session) = require_session(&state.sessions, &headers).await?;
    state.sessions.close(token).await;
    tracing::info!(username = %session.username, "session closed");
    Ok(StatusCode::NO_CONTENT)
}
