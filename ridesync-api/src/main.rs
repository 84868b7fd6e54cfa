use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use ridesync_api::{app, sessions::SessionRegistry, state::AppState, worker};
use ridesync_engine::{LifecycleEngine, Reclaimer};
use ridesync_ledger::RideLedger;
use ridesync_routing::RoutePlanner;
use ridesync_store::{
    DbClient, SqliteAccountRepository, SqliteLedgerRepository, SqliteRequestRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ridesync_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ridesync_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting RideSync API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    let requests = Arc::new(SqliteRequestRepository::new(db.pool.clone()));
    let accounts = Arc::new(SqliteAccountRepository::new(db.pool.clone()));
    let ledger = RideLedger::new(
        Arc::new(SqliteLedgerRepository::new(db.pool.clone())),
        config.business_rules.history_cap,
    );

    let engine = LifecycleEngine::new(
        requests.clone(),
        ledger.clone(),
        Duration::seconds(config.business_rules.request_ttl_seconds as i64),
    );
    let reclaimer = Reclaimer::new(requests);

    tokio::spawn(worker::start_reclaimer_worker(
        reclaimer.clone(),
        std::time::Duration::from_secs(config.business_rules.refresh_interval_seconds),
    ));

    let app_state = AppState {
        engine,
        reclaimer,
        ledger,
        accounts,
        planner: Arc::new(RoutePlanner::new(&config.routing.endpoint)),
        sessions: Arc::new(SessionRegistry::new()),
        fares: Arc::new(config.fares.clone()),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
