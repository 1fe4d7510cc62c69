//! Scheduler implementation

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use crate::error::{IterationFailure, RangeError};
use crate::range::IndexRange;

use super::config::SchedulerConfig;
use super::state::{Claim, RangeOutcome, RunState, RunStats};

/// The RangeScheduler runs an async iterator once per index of a range,
/// with at most `max_concurrency` invocations in flight.
///
/// Worker loops share one cursor: each loop claims the next index, awaits the
/// iterator, records the values, and claims again until the range is consumed
/// or some invocation has failed. A failure stops further claims but does not
/// cancel invocations already in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeScheduler {
    range: IndexRange,
    config: SchedulerConfig,
}

impl RangeScheduler {
    /// Create a new scheduler for the given range and configuration
    pub fn new(range: IndexRange, config: SchedulerConfig) -> Result<Self, RangeError> {
        debug!(%range, ?config, "RangeScheduler::new: called");
        config.validate()?;
        Ok(Self { range, config })
    }

    pub fn range(&self) -> IndexRange {
        self.range
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Number of worker loops a run starts
    pub fn worker_count(&self) -> usize {
        self.config.worker_count(self.range.len())
    }

    /// Run the iterator over the whole range and return the ordered outcome
    ///
    /// Returns once every invocation that was started has finished, even when
    /// a failure finalized the run earlier. The stats include those late finishers.
    pub async fn run<F, Fut, T, E>(&self, iter: F) -> RangeOutcome<T, E>
    where
        F: Fn(i64) -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        debug!(range = %self.range, "RangeScheduler::run: called");
        let (mut outcome, stats) = self.drive(&iter, |outcome| outcome).await;
        outcome.stats = stats;
        outcome
    }

    /// Run the iterator and hand `(error, results)` to `done` as soon as the run completes
    ///
    /// `done` fires exactly once. Invocations still in flight at that moment
    /// are awaited before this future resolves; their results are dropped.
    pub async fn run_with<F, Fut, T, E, D>(&self, iter: F, done: D)
    where
        F: Fn(i64) -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        D: FnOnce(Option<IterationFailure<E>>, Vec<Vec<T>>),
    {
        debug!(range = %self.range, "RangeScheduler::run_with: called");
        self.drive(&iter, |outcome| {
            let (error, results) = outcome.into_parts();
            done(error, results)
        })
        .await;
    }

    /// Drive the worker loops, call `on_complete` at finalization, then drain
    ///
    /// Returns the reply of `on_complete` along with the stats after the drain.
    async fn drive<F, Fut, T, E, D, R>(&self, iter: &F, on_complete: D) -> (R, RunStats)
    where
        F: Fn(i64) -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        D: FnOnce(RangeOutcome<T, E>) -> R,
    {
        let state = Mutex::new(RunState::new(self.range));
        let workers = self.worker_count();
        debug!(range = %self.range, workers, "RangeScheduler::drive: starting worker loops");

        let mut loops: FuturesUnordered<_> = (0..workers).map(|_| worker_loop(&state, iter)).collect();

        let outcome = loop {
            let stopped = loops.next().await;
            let mut inner = state.lock().await;

            if inner.should_finalize() {
                debug!(in_flight = inner.in_flight(), "RangeScheduler::drive: completion detected");
                break inner.finalize();
            }

            if stopped.is_none() {
                warn!(range = %self.range, "All worker loops stopped before completion was detected");
                break inner.finalize();
            }
        };

        match &outcome.error {
            Some(failure) => info!(
                range = %self.range,
                index = failure.index,
                recorded = outcome.results.len(),
                "Range run failed"
            ),
            None => info!(range = %self.range, recorded = outcome.results.len(), "Range run complete"),
        }

        let reply = on_complete(outcome);

        // Invocations that were already started are never aborted
        while loops.next().await.is_some() {}

        let stats = state.lock().await.stats();
        debug!(?stats, "RangeScheduler::drive: all worker loops stopped");
        (reply, stats)
    }
}

/// One worker loop: claim, invoke, record, repeat
async fn worker_loop<F, Fut, T, E>(state: &Mutex<RunState<T, E>>, iter: &F)
where
    F: Fn(i64) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    loop {
        let claim = state.lock().await.claim();
        let index = match claim {
            Claim::Index(index) => index,
            Claim::Exhausted => {
                trace!("worker_loop: exhausted");
                return;
            }
        };

        trace!(index, "worker_loop: invoking iterator");
        match iter(index).await {
            Ok(values) => {
                state.lock().await.record(index, values);
            }
            Err(error) => {
                debug!(index, "worker_loop: iterator failed, stopping loop");
                state.lock().await.fail(index, error);
                return;
            }
        }
    }
}
