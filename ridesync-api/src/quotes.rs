use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    requests::resolve_location,
    sessions::require_session,
    state::AppState,
};
use ridesync_core::VehicleClass;

#[derive(Debug, Deserialize)]
struct QuoteParams {
    pickup: String,
    destination: String,
}

#[derive(Debug, Serialize)]
struct FareOption {
    vehicle: VehicleClass,
    seats: i32,
    solo: i64,
    /// Absent for single-seat vehicles
    shared: Option<i64>,
}

#[derive(Debug, Serialize)]
struct QuoteResponse {
    pickup: String,
    destination: String,
    distance_km: f64,
    path: Vec<(f64, f64)>,
    options: Vec<FareOption>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/quote", get(quote))
}

async fn quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<QuoteParams>,
) -> Result<Json<QuoteResponse>, AppError> {
    require_session(&state.sessions, &headers).await?;

    let pickup = resolve_location(&params.pickup)?;
    let destination = resolve_location(&params.destination)?;
    if pickup.name == destination.name {
        return Err(AppError::ValidationError(
            "Pickup and drop must differ".to_string(),
        ));
    }

    let route = state.planner.estimate(pickup, destination).await;

    let options = VehicleClass::all()
        .into_iter()
        .map(|vehicle| FareOption {
            vehicle,
            seats: vehicle.capacity(),
            solo: state.fares.quote(route.distance_km, vehicle, false),
            shared: vehicle
                .supports_sharing()
                .then(|| state.fares.quote(route.distance_km, vehicle, true)),
        })
        .collect();

    Ok(Json(QuoteResponse {
        pickup: pickup.name.to_string(),
        destination: destination.name.to_string(),
        distance_km: route.distance_km,
        path: route.path,
        options,
    }))
}
