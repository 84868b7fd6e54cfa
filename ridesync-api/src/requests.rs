use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::AppError,
    sessions::require_session,
    state::AppState,
};
use ridesync_core::{locations, ActiveRequest, Location, VehicleClass};

#[derive(Debug, Deserialize)]
struct CreateRequestBody {
    pickup: String,
    destination: String,
    vehicle: VehicleClass,
    #[serde(default)]
    shared: bool,
}

#[derive(Debug, Deserialize)]
struct JoinRequestBody {
    pickup: String,
}

#[derive(Debug, Deserialize)]
struct SharedMatchesParams {
    destination: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_request))
        .route("/requests/active", get(active_request))
        .route("/requests/{id}/cancel", post(cancel_request))
        .route("/requests/{id}/join", post(join_shared))
        .route("/shared-matches", get(shared_matches))
}

pub(crate) fn resolve_location(name: &str) -> Result<&'static Location, AppError> {
    locations::find(name)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown location: {}", name)))
}

async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateRequestBody>,
) -> Result<Json<ActiveRequest>, AppError> {
    let (_, session) = require_session(&state.sessions, &headers).await?;

    let pickup = resolve_location(&body.pickup)?;
    let destination = resolve_location(&body.destination)?;
    if pickup.name == destination.name {
        return Err(AppError::ValidationError(
            "Pickup and drop must differ".to_string(),
        ));
    }
    if body.shared && !body.vehicle.supports_sharing() {
        return Err(AppError::ValidationError(
            "Shared rides need a vehicle with more than one seat".to_string(),
        ));
    }

    // reconcile first so an expired leftover cannot block the new booking
    state.reclaimer.sweep(Utc::now()).await?;

    // Fare is fixed here, at creation, and never recomputed
    let route = state.planner.estimate(pickup, destination).await;
    let price = state.fares.quote(route.distance_km, body.vehicle, body.shared);

    let request = state
        .engine
        .create_request(
            &session.username,
            pickup.name,
            destination.name,
            body.vehicle,
            price,
            body.shared,
            Utc::now(),
        )
        .await?;

    Ok(Json(request))
}

async fn active_request(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Option<ActiveRequest>>, AppError> {
    let (_, session) = require_session(&state.sessions, &headers).await?;

    // each poll cycle reconciles before it reads
    state.reclaimer.sweep(Utc::now()).await?;

    let active = state.engine.active_request_for(&session.username).await?;
    Ok(Json(active))
}

async fn cancel_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (_, session) = require_session(&state.sessions, &headers).await?;

    // only the owner may cancel, and only while it is still theirs to cancel
    let owned = state
        .engine
        .active_request_for(&session.username)
        .await?
        .is_some_and(|request| request.id == id);
    if !owned {
        return Err(AppError::NotFoundError(format!(
            "Request {} not found or no longer open",
            id
        )));
    }

    state.engine.cancel_request(id).await?;
    Ok(Json(serde_json::json!({ "status": "cancelled" })))
}

async fn join_shared(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<JoinRequestBody>,
) -> Result<Json<ActiveRequest>, AppError> {
    let (_, session) = require_session(&state.sessions, &headers).await?;
    let pickup = resolve_location(&body.pickup)?;

    state.reclaimer.sweep(Utc::now()).await?;

    let request = state
        .engine
        .join_shared(&session.username, id, pickup.name, Utc::now())
        .await?;
    Ok(Json(request))
}

async fn shared_matches(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SharedMatchesParams>,
) -> Result<Json<Vec<ActiveRequest>>, AppError> {
    let (_, _session) = require_session(&state.sessions, &headers).await?;
    let destination = resolve_location(&params.destination)?;

    state.reclaimer.sweep(Utc::now()).await?;

    let matches = state.engine.find_shared_matches(destination.name).await?;
    Ok(Json(matches))
}
