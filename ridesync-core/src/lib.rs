pub mod account;
pub mod ledger;
pub mod locations;
pub mod repository;
pub mod request;
pub mod vehicle;

pub use account::Account;
pub use ledger::{CompletedRide, LedgerStats, NewCompletedRide, TripDetails};
pub use locations::Location;
pub use repository::{AccountRepository, LedgerRepository, RequestRepository, StoreError};
pub use request::{ActiveRequest, NewRequest, RequestStatus, RideMode};
pub use vehicle::VehicleClass;
