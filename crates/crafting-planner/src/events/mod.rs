//! Planner event log.

pub mod logger;
pub mod types;

pub use logger::{EventLogger, PendingEvents};
pub use types::{EventKind, PlannerEvent};
