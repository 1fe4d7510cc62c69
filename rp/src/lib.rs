//! rangepool - bounded-concurrency async iteration over integer ranges
//!
//! Runs an async iterator once for every index of a half-open range
//! `[start, end)`, with at most `max_concurrency` invocations in flight, and
//! delivers the per-index values in index order regardless of the order in
//! which invocations finish.
//!
//! # Core Concepts
//!
//! - **Claim**: worker loops take the next unprocessed index from a shared cursor
//! - **First error wins**: the earliest failure is reported, later ones are dropped
//! - **No cancellation**: a failure stops new claims, started invocations still finish
//! - **Factory mode**: [`range()`] validates up front and returns a reusable run
//!
//! # Modules
//!
//! - [`scheduler`] - Cursor, worker loops and completion detection
//! - [`range`](mod@range) - Validated index ranges
//! - [`error`] - Error types
//! - [`demo`] - Demo iterator behind `rp run`
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
mod factory;
pub mod range;
pub mod scheduler;

// Re-export commonly used types
pub use config::Config;
pub use error::{IterationFailure, RangeError};
pub use factory::{RangeFactory, range};
pub use range::{IndexRange, parse_concurrency};
pub use scheduler::{DEFAULT_MAX_CONCURRENCY, RangeOutcome, RangeScheduler, RunStats, SchedulerConfig};
