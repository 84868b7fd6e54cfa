pub mod account_repo;
pub mod app_config;
pub mod database;
pub mod ledger_repo;
pub mod request_repo;

pub use account_repo::SqliteAccountRepository;
pub use app_config::{BusinessRules, Config};
pub use database::DbClient;
pub use ledger_repo::SqliteLedgerRepository;
pub use request_repo::SqliteRequestRepository;

use ridesync_core::StoreError;

/// Unique violations carry the domain signal; everything else means the
/// store could not serve the call
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return StoreError::UniqueViolation(db.message().to_string());
        }
    }
    StoreError::Unavailable(Box::new(err))
}

/// A row that no longer parses as domain data
pub(crate) fn corrupt_row(what: &str, detail: String) -> StoreError {
    StoreError::Unavailable(format!("corrupt {} row: {}", what, detail).into())
}
