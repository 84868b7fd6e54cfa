use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    sessions::{require_driver, require_session},
    state::AppState,
};
use ridesync_core::{ActiveRequest, VehicleClass};

#[derive(Debug, Deserialize)]
struct EnterDriverModeBody {
    vehicle: VehicleClass,
}

#[derive(Debug, Serialize)]
struct SessionView {
    username: String,
    driver_mode: bool,
    driver_vehicle: Option<VehicleClass>,
    ignored_requests: Vec<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(session_view))
        .route(
            "/session/driver",
            put(enter_driver_mode).delete(leave_driver_mode),
        )
        .route("/requests/pending", get(pending_requests))
        .route("/requests/mine", get(my_rides))
        .route("/requests/{id}/accept", post(accept_request))
        .route("/requests/{id}/complete", post(complete_request))
        .route("/requests/{id}/ignore", post(ignore_request))
}

async fn session_view(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, AppError> {
    let (_, session) = require_session(&state.sessions, &headers).await?;
    let mut ignored: Vec<i64> = session.ignored_requests.iter().copied().collect();
    ignored.sort_unstable();

    Ok(Json(SessionView {
        username: session.username,
        driver_mode: session.driver_mode,
        driver_vehicle: session.driver_vehicle,
        ignored_requests: ignored,
    }))
}

/// Switching vehicles (or modes) is blocked while the driver is mid-ride
async fn ensure_no_active_ride(state: &AppState, driver: &str) -> Result<(), AppError> {
    if !state.engine.accepted_rides_for(driver).await?.is_empty() {
        return Err(AppError::ConflictError(
            "Cannot change vehicle during an active ride".to_string(),
        ));
    }
    Ok(())
}

async fn enter_driver_mode(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<EnterDriverModeBody>,
) -> Result<StatusCode, AppError> {
    let (token, session) = require_session(&state.sessions, &headers).await?;
    ensure_no_active_ride(&state, &session.username).await?;

    state
        .sessions
        .update(token, |s| {
            s.driver_mode = true;
            s.driver_vehicle = Some(body.vehicle);
        })
        .await;
    tracing::info!(username = %session.username, vehicle = %body.vehicle, "driver mode on");
    Ok(StatusCode::NO_CONTENT)
}

async fn leave_driver_mode(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let (token, session) = require_session(&state.sessions, &headers).await?;
    ensure_no_active_ride(&state, &session.username).await?;

    state
        .sessions
        .update(token, |s| {
            s.driver_mode = false;
            s.driver_vehicle = None;
        })
        .await;
    Ok(StatusCode::NO_CONTENT)
}

async fn pending_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ActiveRequest>>, AppError> {
    let (_, session, vehicle) = require_driver(&state.sessions, &headers).await?;

    let now = Utc::now();
    state.reclaimer.sweep(now).await?;

    let pending = state.engine.list_pending_for_driver(vehicle, now).await?;
    let visible = pending
        .into_iter()
        .filter(|request| !session.ignored_requests.contains(&request.id))
        .collect();
    Ok(Json(visible))
}

async fn my_rides(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ActiveRequest>>, AppError> {
    let (_, session, _) = require_driver(&state.sessions, &headers).await?;
    let rides = state.engine.accepted_rides_for(&session.username).await?;
    Ok(Json(rides))
}

async fn accept_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (_, session, _) = require_driver(&state.sessions, &headers).await?;

    // expired requests must cancel, not get accepted
    state.reclaimer.sweep(Utc::now()).await?;

    // one ride at a time per driver
    if !state
        .engine
        .accepted_rides_for(&session.username)
        .await?
        .is_empty()
    {
        return Err(AppError::ConflictError(
            "Finish your current ride before accepting another".to_string(),
        ));
    }

    state.engine.accept_request(id, &session.username).await?;
    Ok(Json(serde_json::json!({ "status": "accepted" })))
}

async fn complete_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (_, session, _) = require_driver(&state.sessions, &headers).await?;

    // only the accepting driver may complete
    let owns_ride = state
        .engine
        .accepted_rides_for(&session.username)
        .await?
        .iter()
        .any(|ride| ride.id == id);
    if !owns_ride {
        return Err(AppError::NotFoundError(format!(
            "Request {} not found or no longer open",
            id
        )));
    }

    state.engine.complete_request(id, Utc::now()).await?;
    Ok(Json(serde_json::json!({ "status": "completed" })))
}

async fn ignore_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let (token, _, _) = require_driver(&state.sessions, &headers).await?;

    state
        .sessions
        .update(token, |s| {
            s.ignored_requests.insert(id);
        })
        .await;
    Ok(StatusCode::NO_CONTENT)
}
