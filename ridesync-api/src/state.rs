use crate::sessions::SessionRegistry;
use ridesync_core::repository::AccountRepository;
use ridesync_engine::{LifecycleEngine, Reclaimer};
use ridesync_ledger::RideLedger;
use ridesync_pricing::FareTable;
use ridesync_routing::RoutePlanner;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: LifecycleEngine,
    pub reclaimer: Reclaimer,
    pub ledger: RideLedger,
    pub accounts: Arc<dyn AccountRepository>,
    pub planner: Arc<RoutePlanner>,
    pub sessions: Arc<SessionRegistry>,
    pub fares: Arc<FareTable>,
}
