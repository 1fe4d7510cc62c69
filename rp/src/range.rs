//! The half-open index range a run covers

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RangeError;

/// An immutable half-open range `[start, end)` of work indices
///
/// Construction validates `start < end` and that the length is addressable,
/// so every `IndexRange` in circulation is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawIndexRange")]
pub struct IndexRange {
    start: i64,
    end: i64,
}

/// Unchecked bounds as they appear on the wire
#[derive(Deserialize)]
struct RawIndexRange {
    start: i64,
    end: i64,
}

impl TryFrom<RawIndexRange> for IndexRange {
    type Error = RangeError;

    fn try_from(raw: RawIndexRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl IndexRange {
    /// Create a range, rejecting empty or inverted bounds
    pub fn new(start: i64, end: i64) -> Result<Self, RangeError> {
        debug!(start, end, "IndexRange::new: called");
        if start >= end {
            return Err(RangeError::invalid("Start must be < end"));
        }
        if usize::try_from(end.abs_diff(start)).is_err() {
            return Err(RangeError::invalid("Range length does not fit in usize"));
        }
        Ok(Self { start, end })
    }

    /// Parse textual bounds, as supplied on a command line or in a config file
    pub fn parse(start: &str, end: &str) -> Result<Self, RangeError> {
        debug!(%start, %end, "IndexRange::parse: called");
        let start = parse_integer(start).ok_or_else(|| RangeError::invalid("Start must be an integer number"))?;
        let end = parse_integer(end).ok_or_else(|| RangeError::invalid("End must be an integer number"))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Number of indices in the range, never zero
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        // Checked in `new`
        self.end.abs_diff(self.start) as usize
    }

    pub fn contains(&self, index: i64) -> bool {
        self.start <= index && index < self.end
    }
}

impl std::fmt::Display for IndexRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Parse a textual concurrency limit
pub fn parse_concurrency(value: &str) -> Result<usize, RangeError> {
    debug!(%value, "parse_concurrency: called");
    let parsed: usize = value
        .trim()
        .parse()
        .map_err(|_| RangeError::invalid("maxConcurrency must be an integer number"))?;
    validate_concurrency(parsed)
}

/// Reject a concurrency limit that would start no worker loops
pub fn validate_concurrency(max_concurrency: usize) -> Result<usize, RangeError> {
    if max_concurrency == 0 {
        return Err(RangeError::invalid("maxConcurrency must be at least 1"));
    }
    Ok(max_concurrency)
}

fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}
