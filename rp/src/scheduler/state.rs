//! Run state shared by the worker loops of one run

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::IterationFailure;
use crate::range::IndexRange;

/// Result of a claim attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// Process this index next
    Index(i64),

    /// Nothing left to hand out, either because the range is consumed or a failure was recorded
    Exhausted,
}

/// Statistics for a single run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub claimed: u64,
    pub completed: u64,
    pub failed: u64,
    pub discarded_errors: u64,
    pub late_results: u64,
    pub peak_in_flight: usize,
}

/// What a run delivers on completion
#[derive(Debug)]
pub struct RangeOutcome<T, E> {
    /// First failure, if any
    pub error: Option<IterationFailure<E>>,

    /// Per-index values in ascending index order
    pub results: Vec<Vec<T>>,

    /// Counters when the outcome was handed over; `RangeScheduler::run`
    /// refreshes them once in-flight work has drained
    pub stats: RunStats,
}

impl<T, E> RangeOutcome<T, E> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Drop the partial results of a failed run
    pub fn into_result(self) -> Result<Vec<Vec<T>>, IterationFailure<E>> {
        match self.error {
            Some(failure) => Err(failure),
            None => Ok(self.results),
        }
    }

    /// Split into the `(error, results)` pair handed to completion callbacks
    pub fn into_parts(self) -> (Option<IterationFailure<E>>, Vec<Vec<T>>) {
        (self.error, self.results)
    }
}

/// Cursor, result table and error slot for one run
///
/// Only `claim`, `record`, `fail` and `finalize` mutate; everything else is a pure read.
#[derive(Debug)]
pub(crate) struct RunState<T, E> {
    range: IndexRange,

    /// Next unclaimed index; equals `range.end()` once consumed
    cursor: i64,

    results: BTreeMap<i64, Vec<T>>,

    error: Option<IterationFailure<E>>,

    in_flight: usize,

    finalized: bool,

    stats: RunStats,
}

impl<T, E> RunState<T, E> {
    pub(crate) fn new(range: IndexRange) -> Self {
        Self {
            range,
            cursor: range.start(),
            results: BTreeMap::new(),
            error: None,
            in_flight: 0,
            finalized: false,
            stats: RunStats::default(),
        }
    }

    /// Hand out the next unclaimed index and advance the cursor
    pub(crate) fn claim(&mut self) -> Claim {
        if self.error.is_some() || self.finalized || self.is_exhausted() {
            return Claim::Exhausted;
        }

        let index = self.cursor;
        self.cursor += 1;
        self.in_flight += 1;
        self.stats.claimed += 1;
        self.stats.peak_in_flight = self.stats.peak_in_flight.max(self.in_flight);
        Claim::Index(index)
    }

    /// Store the values produced for a claimed index
    pub(crate) fn record(&mut self, index: i64, values: Vec<T>) {
        debug_assert!(self.range.contains(index), "recorded index {index} outside {}", self.range);
        self.in_flight -= 1;
        self.stats.completed += 1;

        if self.finalized {
            debug!(index, "RunState::record: run already finalized, dropping result");
            self.stats.late_results += 1;
            return;
        }

        self.results.insert(index, values);
    }

    /// Record a failure unless an earlier one already won
    pub(crate) fn fail(&mut self, index: i64, error: E) {
        debug_assert!(self.range.contains(index), "failed index {index} outside {}", self.range);
        self.in_flight -= 1;
        self.stats.failed += 1;

        if self.error.is_some() || self.finalized {
            warn!(index, "Discarding failure, an earlier one was already recorded");
            self.stats.discarded_errors += 1;
            return;
        }

        self.error = Some(IterationFailure::new(index, error));
    }

    /// The cursor has handed out every index
    pub(crate) fn is_exhausted(&self) -> bool {
        self.cursor >= self.range.end()
    }

    /// Every index has a recorded result
    pub(crate) fn is_finished(&self) -> bool {
        self.results.len() == self.range.len()
    }

    pub(crate) fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Completion predicate, evaluated after each worker loop stops
    pub(crate) fn should_finalize(&self) -> bool {
        !self.finalized && (self.has_failed() || (self.is_exhausted() && self.is_finished()))
    }

    /// Latch the run as complete and take the ordered results
    pub(crate) fn finalize(&mut self) -> RangeOutcome<T, E> {
        debug!(
            recorded = self.results.len(),
            in_flight = self.in_flight,
            "RunState::finalize: called"
        );
        self.finalized = true;

        // BTreeMap iterates in ascending key order
        let results = std::mem::take(&mut self.results).into_values().collect();

        RangeOutcome {
            error: self.error.take(),
            results,
            stats: self.stats,
        }
    }

    pub(crate) fn stats(&self) -> RunStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(start: i64, end: i64) -> RunState<i64, String> {
        RunState::new(IndexRange::new(start, end).unwrap())
    }

    #[test]
    fn test_claims_are_sequential_and_unique() {
        let mut state = state(3, 6);
        assert_eq!(state.claim(), Claim::Index(3));
        assert_eq!(state.claim(), Claim::Index(4));
        assert_eq!(state.claim(), Claim::Index(5));
        assert!(state.is_exhausted());
        assert_eq!(state.claim(), Claim::Exhausted);
        assert_eq!(state.claim(), Claim::Exhausted);
        assert_eq!(state.stats().claimed, 3);
        assert_eq!(state.in_flight(), 3);
    }

    #[test]
    fn test_claim_at_upper_bound_does_not_overflow() {
        let mut state = state(i64::MAX - 2, i64::MAX);
        assert_eq!(state.claim(), Claim::Index(i64::MAX - 2));
        assert_eq!(state.claim(), Claim::Index(i64::MAX - 1));
        assert_eq!(state.claim(), Claim::Exhausted);
    }

    #[test]
    fn test_claiming_stops_after_failure() {
        let mut state = state(0, 10);
        assert_eq!(state.claim(), Claim::Index(0));
        assert_eq!(state.claim(), Claim::Index(1));
        state.fail(0, "boom".to_string());

        assert!(!state.is_exhausted());
        assert_eq!(state.claim(), Claim::Exhausted);
    }

    #[test]
    fn test_first_error_wins() {
        let mut state = state(0, 10);
        state.claim();
        state.claim();
        state.fail(1, "second index".to_string());
        state.fail(0, "first index".to_string());

        let outcome = state.finalize();
        let failure = outcome.error.unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.error, "second index");
        assert_eq!(outcome.stats.failed, 2);
        assert_eq!(outcome.stats.discarded_errors, 1);
    }

    #[test]
    fn test_in_flight_result_recorded_after_failure() {
        let mut state = state(0, 10);
        state.claim();
        state.claim();
        state.fail(0, "boom".to_string());
        state.record(1, vec![1]);

        assert_eq!(state.in_flight(), 0);
        let outcome = state.finalize();
        assert_eq!(outcome.results, vec![vec![1]]);
    }

    #[test]
    fn test_should_finalize_on_completion() {
        let mut state = state(0, 2);
        assert!(!state.should_finalize());

        state.claim();
        state.claim();
        state.record(1, vec![10]);
        assert!(state.is_exhausted());
        assert!(!state.should_finalize());

        state.record(0, vec![]);
        assert!(state.is_finished());
        assert!(state.should_finalize());
    }

    #[test]
    fn test_should_finalize_on_failure() {
        let mut state = state(0, 5);
        state.claim();
        state.fail(0, "boom".to_string());
        assert!(state.should_finalize());
    }

    #[test]
    fn test_finalize_orders_by_index_and_latches() {
        let mut state = state(-2, 2);
        for _ in 0..4 {
            state.claim();
        }
        state.record(1, vec![1, 1]);
        state.record(-2, vec![-2]);
        state.record(0, vec![]);
        state.record(-1, vec![-1]);

        let outcome = state.finalize();
        assert!(outcome.is_ok());
        assert_eq!(outcome.results, vec![vec![-2], vec![-1], vec![], vec![1, 1]]);

        assert!(!state.should_finalize());
        assert_eq!(state.claim(), Claim::Exhausted);
    }

    #[test]
    fn test_results_after_finalize_are_dropped() {
        let mut state = state(0, 5);
        state.claim();
        state.claim();
        state.fail(0, "boom".to_string());
        let outcome = state.finalize();
        assert!(outcome.results.is_empty());

        state.record(1, vec![1]);
        state.fail(1, "late".to_string());
        assert_eq!(state.stats().late_results, 1);
        assert_eq!(state.stats().discarded_errors, 1);
        assert_eq!(state.in_flight(), 0);
    }

    #[test]
    fn test_outcome_conversions() {
        let ok: RangeOutcome<i64, String> = RangeOutcome {
            error: None,
            results: vec![vec![1]],
            stats: RunStats::default(),
        };
        assert_eq!(ok.into_result().unwrap(), vec![vec![1]]);

        let failed: RangeOutcome<i64, String> = RangeOutcome {
            error: Some(IterationFailure::new(4, "boom".to_string())),
            results: vec![vec![0]],
            stats: RunStats::default(),
        };
        let (error, results) = failed.into_parts();
        assert_eq!(error.unwrap().index, 4);
        assert_eq!(results, vec![vec![0]]);
    }
}
