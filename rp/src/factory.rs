//! Entry point and the reusable deferred run it returns

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{IterationFailure, RangeError};
use crate::range::IndexRange;
use crate::scheduler::{RangeOutcome, RangeScheduler, SchedulerConfig};

/// Validate the arguments of a run over `[start, end)` and bind the iterator
///
/// `max_concurrency` of `None` selects [`DEFAULT_MAX_CONCURRENCY`](crate::DEFAULT_MAX_CONCURRENCY).
/// Invalid arguments are reported here, before anything runs; the returned
/// factory can then be run any number of times.
///
/// ```no_run
/// # async fn demo() -> Result<(), rangepool::RangeError> {
/// let doubled = rangepool::range(0, 5, None, |i| async move { Ok::<_, String>(vec![i * 2]) })?;
/// let outcome = doubled.run().await;
/// assert_eq!(outcome.results, vec![vec![0], vec![2], vec![4], vec![6], vec![8]]);
/// # Ok(())
/// # }
/// ```
pub fn range<F, Fut, T, E>(
    start: i64,
    end: i64,
    max_concurrency: Option<usize>,
    iter: F,
) -> Result<RangeFactory<F>, RangeError>
where
    F: Fn(i64) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    debug!(start, end, ?max_concurrency, "range: called");
    let range = IndexRange::new(start, end)?;
    let scheduler = RangeScheduler::new(range, SchedulerConfig::with_max_concurrency(max_concurrency))?;
    Ok(RangeFactory::new(scheduler, iter))
}

/// A validated run waiting for its completion handler
#[derive(Clone)]
pub struct RangeFactory<F> {
    scheduler: RangeScheduler,
    iter: F,
}

impl<F> std::fmt::Debug for RangeFactory<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeFactory").field("scheduler", &self.scheduler).finish_non_exhaustive()
    }
}

impl<F> RangeFactory<F> {
    pub fn new(scheduler: RangeScheduler, iter: F) -> Self {
        Self { scheduler, iter }
    }

    pub fn scheduler(&self) -> &RangeScheduler {
        &self.scheduler
    }

    /// Perform a run and return its outcome
    pub async fn run<Fut, T, E>(&self) -> RangeOutcome<T, E>
    where
        F: Fn(i64) -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        self.scheduler.run(&self.iter).await
    }

    /// Perform a run, delivering `(error, results)` to `done`
    pub async fn call<Fut, T, E, D>(&self, done: D)
    where
        F: Fn(i64) -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        D: FnOnce(Option<IterationFailure<E>>, Vec<Vec<T>>),
    {
        self.scheduler.run_with(&self.iter, done).await
    }

    /// Perform a run on the tokio runtime without awaiting it
    ///
    /// The handle resolves after `done` has fired and in-flight invocations have drained.
    pub fn spawn<Fut, T, E, D>(&self, done: D) -> JoinHandle<()>
    where
        F: Fn(i64) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        D: FnOnce(Option<IterationFailure<E>>, Vec<Vec<T>>) + Send + 'static,
    {
        debug!(range = %self.scheduler.range(), "RangeFactory::spawn: called");
        let scheduler = self.scheduler.clone();
        let iter = self.iter.clone();
        tokio::spawn(async move { scheduler.run_with(iter, done).await })
    }
}
