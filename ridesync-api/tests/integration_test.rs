use chrono::Duration;
use reqwest::StatusCode;
use ridesync_api::{app, sessions::SessionRegistry, state::AppState};
use ridesync_core::repository::RequestRepository;
use ridesync_engine::{LifecycleEngine, Reclaimer};
use ridesync_ledger::RideLedger;
use ridesync_pricing::FareTable;
use ridesync_routing::RoutePlanner;
use ridesync_store::{
    DbClient, SqliteAccountRepository, SqliteLedgerRepository, SqliteRequestRepository,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Boot the full service against a fresh in-memory store on an ephemeral
/// port; the routing endpoint points at a dead port so quotes exercise the
/// local fallback
async fn spawn_app() -> String {
    let db = DbClient::in_memory().await.unwrap();
    db.migrate().await.unwrap();

    let requests: Arc<dyn RequestRepository> =
        Arc::new(SqliteRequestRepository::new(db.pool.clone()));
    let ledger = RideLedger::new(Arc::new(SqliteLedgerRepository::new(db.pool.clone())), 20);
    let engine = LifecycleEngine::new(requests.clone(), ledger.clone(), Duration::seconds(180));
    let reclaimer = Reclaimer::new(requests);

    let state = AppState {
        engine,
        reclaimer,
        ledger,
        accounts: Arc::new(SqliteAccountRepository::new(db.pool.clone())),
        planner: Arc::new(RoutePlanner::new("http://127.0.0.1:9")),
        sessions: Arc::new(SessionRegistry::new()),
        fares: Arc::new(FareTable::default()),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = app(state);
    tokio::spawn(async move {
        axum::serve(listener, service).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn register_and_login(client: &reqwest::Client, base: &str, username: &str) -> String {
    let status = client
        .post(format!("{}/v1/auth/signup", base))
        .json(&json!({ "username": username, "password": "123" }))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::CREATED);

    let body: Value = client
        .post(format!("{}/v1/auth/login", base))
        .json(&json!({ "username": username, "password": "123" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn enter_driver_mode(client: &reqwest::Client, base: &str, token: &str, vehicle: &str) {
    let status = client
        .put(format!("{}/v1/session/driver", base))
        .header("x-session-token", token)
        .json(&json!({ "vehicle": vehicle }))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn booking_flow_end_to_end() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let passenger = register_and_login(&client, &base, "p1").await;
    let driver = register_and_login(&client, &base, "d1").await;

    // quote falls back to the local estimate and prices every class
    let quote: Value = client
        .get(format!(
            "{}/v1/quote?pickup=LJU%20Campus&destination=Satellite",
            base
        ))
        .header("x-session-token", &passenger)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(quote["distance_km"].as_f64().unwrap() > 0.0);
    let options = quote["options"].as_array().unwrap();
    assert_eq!(options.len(), 3);
    assert!(options[0]["shared"].is_null(), "no shared fare on a bike");
    assert!(options[1]["shared"].is_i64());

    // book an auto
    let created: Value = client
        .post(format!("{}/v1/requests", base))
        .header("x-session-token", &passenger)
        .json(&json!({
            "pickup": "LJU Campus",
            "destination": "Satellite",
            "vehicle": "auto",
            "shared": false
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let request_id = created["id"].as_i64().unwrap();
    assert_eq!(created["status"], "pending");

    // a second booking while the first is open is rejected
    let duplicate = client
        .post(format!("{}/v1/requests", base))
        .header("x-session-token", &passenger)
        .json(&json!({
            "pickup": "Vastrapur",
            "destination": "Bodakdev",
            "vehicle": "car",
            "shared": false
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    // the driver sees exactly one request and takes it
    enter_driver_mode(&client, &base, &driver, "auto").await;
    let pending: Value = client
        .get(format!("{}/v1/requests/pending", base))
        .header("x-session-token", &driver)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["passenger"], "p1");

    let accepted = client
        .post(format!("{}/v1/requests/{}/accept", base, request_id))
        .header("x-session-token", &driver)
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);

    // passenger observes the transition on the next poll
    let active: Value = client
        .get(format!("{}/v1/requests/active", base))
        .header("x-session-token", &passenger)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(active["status"], "accepted");
    assert_eq!(active["driver"], "d1");

    // the request is gone from every driver's feed
    let pending: Value = client
        .get(format!("{}/v1/requests/pending", base))
        .header("x-session-token", &driver)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(pending.as_array().unwrap().is_empty());

    // complete and settle both ledgers
    let completed = client
        .post(format!("{}/v1/requests/{}/complete", base, request_id))
        .header("x-session-token", &driver)
        .send()
        .await
        .unwrap();
    assert_eq!(completed.status(), StatusCode::OK);

    for token in [&passenger, &driver] {
        let history: Value = client
            .get(format!("{}/v1/history", base))
            .header("x-session-token", token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["source"], "LJU Campus");

        let stats: Value = client
            .get(format!("{}/v1/history/stats", base))
            .header("x-session-token", token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["count"], 1);
    }

    let active: Value = client
        .get(format!("{}/v1/requests/active", base))
        .header("x-session-token", &passenger)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(active.is_null());
}

#[tokio::test]
async fn requests_without_a_session_are_rejected() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/v1/requests/active", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/v1/requests/active", base))
        .header("x-session-token", "not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_rejects_taken_usernames_and_bad_logins() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    register_and_login(&client, &base, "p1").await;

    let taken = client
        .post(format!("{}/v1/auth/signup", base))
        .json(&json!({ "username": "p1", "password": "other" }))
        .send()
        .await
        .unwrap();
    assert_eq!(taken.status(), StatusCode::CONFLICT);

    let wrong = client
        .post(format!("{}/v1/auth/login", base))
        .json(&json!({ "username": "p1", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ignored_requests_are_hidden_per_session() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let passenger = register_and_login(&client, &base, "p1").await;
    let driver_a = register_and_login(&client, &base, "d1").await;
    let driver_b = register_and_login(&client, &base, "d2").await;

    let created: Value = client
        .post(format!("{}/v1/requests", base))
        .header("x-session-token", &passenger)
        .json(&json!({
            "pickup": "LJU Campus",
            "destination": "Vastrapur",
            "vehicle": "bike",
            "shared": false
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let request_id = created["id"].as_i64().unwrap();

    enter_driver_mode(&client, &base, &driver_a, "bike").await;
    enter_driver_mode(&client, &base, &driver_b, "bike").await;

    let ignored = client
        .post(format!("{}/v1/requests/{}/ignore", base, request_id))
        .header("x-session-token", &driver_a)
        .send()
        .await
        .unwrap();
    assert_eq!(ignored.status(), StatusCode::NO_CONTENT);

    let feed_a: Value = client
        .get(format!("{}/v1/requests/pending", base))
        .header("x-session-token", &driver_a)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(feed_a.as_array().unwrap().is_empty());

    // the suppression is scoped to driver A's session only
    let feed_b: Value = client
        .get(format!("{}/v1/requests/pending", base))
        .header("x-session-token", &driver_b)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feed_b.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cancel_is_owner_only_and_shared_rides_pool() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let p1 = register_and_login(&client, &base, "p1").await;
    let p2 = register_and_login(&client, &base, "p2").await;

    let created: Value = client
        .post(format!("{}/v1/requests", base))
        .header("x-session-token", &p1)
        .json(&json!({
            "pickup": "LJU Campus",
            "destination": "Satellite",
            "vehicle": "auto",
            "shared": true
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let request_id = created["id"].as_i64().unwrap();

    // a stranger cannot cancel it
    let foreign_cancel = client
        .post(format!("{}/v1/requests/{}/cancel", base, request_id))
        .header("x-session-token", &p2)
        .send()
        .await
        .unwrap();
    assert_eq!(foreign_cancel.status(), StatusCode::NOT_FOUND);

    // p2 finds the pool and joins with an independent request
    let matches: Value = client
        .get(format!("{}/v1/shared-matches?destination=Satellite", base))
        .header("x-session-token", &p2)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(matches.as_array().unwrap().len(), 1);

    let joined: Value = client
        .post(format!("{}/v1/requests/{}/join", base, request_id))
        .header("x-session-token", &p2)
        .json(&json!({ "pickup": "Vastrapur" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(joined["id"].as_i64().unwrap(), request_id);
    assert_eq!(joined["price"], created["price"]);
    assert_eq!(joined["ride_mode"], "Shared");

    // shared bikes are refused outright
    let bike_share = client
        .post(format!("{}/v1/requests", base))
        .header("x-session-token", &p1)
        .json(&json!({
            "pickup": "LJU Campus",
            "destination": "Satellite",
            "vehicle": "bike",
            "shared": true
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bike_share.status(), StatusCode::BAD_REQUEST);

    // the owner cancels; the request leaves the pool
    let cancel = client
        .post(format!("{}/v1/requests/{}/cancel", base, request_id))
        .header("x-session-token", &p1)
        .send()
        .await
        .unwrap();
    assert_eq!(cancel.status(), StatusCode::OK);

    let matches: Value = client
        .get(format!("{}/v1/shared-matches?destination=Satellite", base))
        .header("x-session-token", &p1)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // only p2's joined request remains
    let remaining = matches.as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["passenger"], "p2");
}

#[tokio::test]
async fn driver_mode_is_required_for_driver_routes() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &base, "p1").await;

    let response = client
        .get(format!("{}/v1/requests/pending", base))
        .header("x-session-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
