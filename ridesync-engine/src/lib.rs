pub mod error;
pub mod lifecycle;
pub mod reclaimer;

pub use error::EngineError;
pub use lifecycle::LifecycleEngine;
pub use reclaimer::{Reclaimer, SweepOutcome};
