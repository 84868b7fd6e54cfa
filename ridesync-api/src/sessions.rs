use crate::error::AppError;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use ridesync_core::VehicleClass;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_HEADER: &str = "x-session-token";

/// Per-login state that used to live in process-wide globals: the driver
/// toggle, the chosen vehicle and the ignored-request set all die with the
/// session
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub driver_mode: bool,
    pub driver_vehicle: Option<VehicleClass>,
    pub ignored_requests: HashSet<i64>,
    pub started_at: DateTime<Utc>,
}

impl Session {
    fn new(username: String) -> Self {
        Self {
            username,
            driver_mode: false,
            driver_vehicle: None,
            ignored_requests: HashSet::new(),
            started_at: Utc::now(),
        }
    }
}

/// All live sessions, keyed by bearer token
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, username: &str) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(token, Session::new(username.to_string()));
        token
    }

    pub async fn close(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }

    pub async fn get(&self, token: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&token).cloned()
    }

    /// Apply a mutation to a live session; false when the token is stale
    pub async fn update<F>(&self, token: Uuid, mutate: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&token) {
            Some(session) => {
                mutate(session);
                true
            }
            None => false,
        }
    }
}

/// Resolve the session named by the request headers
pub async fn require_session(
    registry: &SessionRegistry,
    headers: &HeaderMap,
) -> Result<(Uuid, Session), AppError> {
    let token = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(|| AppError::AuthenticationError("Missing or malformed session token".to_string()))?;

    let session = registry
        .get(token)
        .await
        .ok_or_else(|| AppError::AuthenticationError("Session expired or unknown".to_string()))?;

    Ok((token, session))
}

/// Like `require_session`, but the caller must be in driver mode with a
/// vehicle chosen
pub async fn require_driver(
    registry: &SessionRegistry,
    headers: &HeaderMap,
) -> Result<(Uuid, Session, VehicleClass), AppError> {
    let (token, session) = require_session(registry, headers).await?;
    if !session.driver_mode {
        return Err(AppError::AuthorizationError(
            "Driver mode required".to_string(),
        ));
    }
    let vehicle = session.driver_vehicle.ok_or_else(|| {
        AppError::AuthorizationError("Choose a vehicle before driving".to_string())
    })?;
    Ok((token, session, vehicle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_isolated_per_token() {
        let registry = SessionRegistry::new();
        let t1 = registry.open("p1").await;
        let t2 = registry.open("p1").await;

        registry
            .update(t1, |s| {
                s.ignored_requests.insert(7);
            })
            .await;

        assert!(registry.get(t1).await.unwrap().ignored_requests.contains(&7));
        assert!(registry.get(t2).await.unwrap().ignored_requests.is_empty());
    }

    #[tokio::test]
    async fn closing_a_session_drops_its_state() {
        let registry = SessionRegistry::new();
        let token = registry.open("d1").await;
        assert!(registry.close(token).await);
        assert!(registry.get(token).await.is_none());
        assert!(!registry.close(token).await);
    }
}
