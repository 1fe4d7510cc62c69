//! Scheduler configuration

use serde::{Deserialize, Serialize};

use crate::error::RangeError;
use crate::range::validate_concurrency;

/// Concurrency used when the caller does not pick one
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Max worker loops running at once
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl SchedulerConfig {
    /// Config with an optional concurrency, falling back to the default
    pub fn with_max_concurrency(max_concurrency: Option<usize>) -> Self {
        Self {
            max_concurrency: max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY),
        }
    }

    /// Check the config can drive a run
    pub fn validate(&self) -> Result<(), RangeError> {
        validate_concurrency(self.max_concurrency).map(|_| ())
    }

    /// Number of worker loops to start for a range of `len` indices
    pub fn worker_count(&self, len: usize) -> usize {
        self.max_concurrency.min(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_concurrency, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_max_concurrency() {
        assert_eq!(SchedulerConfig::with_max_concurrency(None).max_concurrency, 10);
        assert_eq!(SchedulerConfig::with_max_concurrency(Some(3)).max_concurrency, 3);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = SchedulerConfig { max_concurrency: 0 };
        let err = config.validate().unwrap_err();
        assert_eq!(err.message(), "maxConcurrency must be at least 1");
    }

    #[test]
    fn test_worker_count_capped_by_range() {
        let config = SchedulerConfig { max_concurrency: 1000 };
        assert_eq!(config.worker_count(42), 42);

        let config = SchedulerConfig { max_concurrency: 4 };
        assert_eq!(config.worker_count(42), 4);
    }

    #[test]
    fn test_serde_defaults() {
        let config: SchedulerConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.max_concurrency, 10);

        let config: SchedulerConfig = serde_yaml::from_str("max-concurrency: 2").unwrap();
        assert_eq!(config.max_concurrency, 2);
    }
}
