pub mod fallback;
pub mod osrm;

pub use osrm::{OsrmClient, RoutingError};

use ridesync_core::Location;
use serde::Serialize;

/// Distance and path for a pickup/destination pair
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteEstimate {
    pub distance_km: f64,
    /// lat/lng polyline; two points when estimated locally, empty for a
    /// zero-length trip
    pub path: Vec<(f64, f64)>,
}

/// Routing collaborator facade.
///
/// Asks OSRM for the driving route and falls back to the local great-circle
/// estimate when the service is unreachable, so route lookup never fails on
/// the booking path.
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    osrm: OsrmClient,
}

impl RoutePlanner {
    pub fn new(endpoint: &str) -> Self {
        Self {
            osrm: OsrmClient::new(endpoint),
        }
    }

    pub async fn estimate(&self, from: &Location, to: &Location) -> RouteEstimate {
        if from.name == to.name {
            return RouteEstimate {
                distance_km: 0.0,
                path: Vec::new(),
            };
        }

        match self.osrm.route(from, to).await {
            Ok(estimate) => estimate,
            Err(err) => {
                tracing::warn!(
                    from = from.name,
                    to = to.name,
                    error = %err,
                    "routing service unavailable, using local estimate"
                );
                RouteEstimate {
                    distance_km: fallback::estimate_km(from, to),
                    path: vec![(from.lat, from.lng), (to.lat, to.lng)],
                }
            }
        }
    }
}
