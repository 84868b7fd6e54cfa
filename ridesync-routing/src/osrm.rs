use crate::RouteEstimate;
use ridesync_core::Location;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("routing service answered {0}")]
    Api(String),

    #[error("routing response had no routes")]
    NoRoute,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// geojson order: [lng, lat]
    coordinates: Vec<[f64; 2]>,
}

/// Thin HTTP client for the OSRM route endpoint
#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OsrmClient {
    /// Create a client for the given OSRM endpoint (e.g.
    /// `http://router.project-osrm.org`)
    pub fn new(endpoint: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build OSRM client");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Driving route between two points; distance in km, path as lat/lng
    pub async fn route(&self, from: &Location, to: &Location) -> Result<RouteEstimate, RoutingError> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.endpoint, from.lng, from.lat, to.lng, to.lat
        );

        let response = self.client.get(&url).send().await?;
        let parsed: OsrmRouteResponse = response.json().await?;
        parse_route_response(parsed)
    }
}

fn parse_route_response(response: OsrmRouteResponse) -> Result<RouteEstimate, RoutingError> {
    if response.code != "Ok" {
        return Err(RoutingError::Api(response.code));
    }

    let route = response.routes.into_iter().next().ok_or(RoutingError::NoRoute)?;
    let distance_km = (route.distance / 1000.0 * 100.0).round() / 100.0;
    let path = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lng, lat]| (lat, lng))
        .collect();

    Ok(RouteEstimate { distance_km, path })
}
