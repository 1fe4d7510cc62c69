//! Demo iterator used by the `rp run` command
//!
//! Simulates latency-bound work: each index sleeps for a base delay plus
//! random jitter, then yields `[i, i * i]`. An optional index is rejected to
//! exercise the failure path.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// Errors produced by the demo iterator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DemoError {
    #[error("Cannot process {0}")]
    Rejected(i64),

    #[error("Value for {0} overflows i64")]
    Overflow(i64),
}

/// Demo iterator settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Base delay per index in milliseconds
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Upper bound of the random extra delay in milliseconds
    #[serde(rename = "jitter-ms")]
    pub jitter_ms: u64,

    /// Index that fails instead of producing values
    #[serde(rename = "fail-at", skip_serializing_if = "Option::is_none")]
    pub fail_at: Option<i64>,
}

impl DemoConfig {
    fn delay_for(&self) -> Duration {
        let jitter = if self.jitter_ms > 0 {
            rand::rng().random_range(0..=self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.delay_ms.saturating_add(jitter))
    }
}

/// Process one index
pub async fn square(index: i64, config: &DemoConfig) -> Result<Vec<i64>, DemoError> {
    let delay = config.delay_for();
    trace!(index, ?delay, "square: called");
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if config.fail_at == Some(index) {
        return Err(DemoError::Rejected(index));
    }

    let squared = index.checked_mul(index).ok_or(DemoError::Overflow(index))?;
    Ok(vec![index, squared])
}
