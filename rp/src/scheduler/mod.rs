//! Scheduler for range runs
//!
//! Hands out the indices of a range to a fixed pool of worker loops, records
//! per-index results and finalizes once, in index order.

mod config;
mod core;
mod state;

pub use config::{DEFAULT_MAX_CONCURRENCY, SchedulerConfig};
pub use self::core::RangeScheduler;
pub use state::{RangeOutcome, RunStats};
