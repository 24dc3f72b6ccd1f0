//! The brute-force search driver.
//!
//! Layers of equal Hamming distance are searched one after another, smallest
//! first. Inside a layer the rank space is split into contiguous ranges, one
//! per worker; each worker unranks its start and then walks successors until
//! its range runs out or the shared stop flag is raised.
//!
//! Predicates run concurrently on different workers. Any state they share
//! through the context must be synchronised by the caller. When several
//! candidates of the same layer satisfy the predicate at once, whichever
//! worker publishes first wins; the returned match is not guaranteed to have
//! the smallest rank unless the search runs on a single worker. No layer past
//! the one holding the returned match is ever started.

use std::convert::Infallible;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use tracing::{debug, info, trace, warn};

use crate::apply::{Applicator, BitFlipApplicator, UnitWidth};
use crate::combination::unrank;
use crate::config::{Parallelism, SearchConfig};
use crate::counter::count;
use crate::error::{BruteForceError, Result};
use crate::partition::{partition, RankRange};
use crate::progress::{NoProgress, ProgressSink, PROGRESS_BATCH};

/// A candidate the predicate accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Original buffer with `positions` inverted.
    pub buffer: Vec<u8>,
    /// Number of flipped bits.
    pub distance: usize,
    /// Flipped bit positions, increasing.
    pub positions: Vec<usize>,
}

type Outcome = Mutex<Option<Result<Match>>>;

/// Raises the stop flag if the worker unwinds out of the predicate.
struct StopOnPanic<'a>(&'a AtomicBool);

impl Drop for StopOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Release);
        }
    }
}

/// Parallel bit-flip search over one buffer.
pub struct BruteForcer<'a> {
    config: SearchConfig,
    applicator: Box<dyn Applicator + 'a>,
    progress: &'a dyn ProgressSink,
}

impl<'a> BruteForcer<'a> {
    pub fn new(config: SearchConfig) -> Self {
        let applicator = Box::new(BitFlipApplicator::new(config.unit));
        Self {
            config,
            applicator,
            progress: &NoProgress,
        }
    }

    /// Replace the default [`BitFlipApplicator`].
    pub fn with_applicator(mut self, applicator: impl Applicator + 'a) -> Self {
        self.applicator = Box::new(applicator);
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search with a predicate that never fails.
    pub fn search_infallible<C, F>(
        &self,
        original: &[u8],
        context: &C,
        predicate: F,
    ) -> Result<Option<Match>>
    where
        C: Sync + ?Sized,
        F: Fn(&C, &[u8]) -> bool + Sync,
    {
        self.search(original, context, |ctx: &C, candidate: &[u8]| {
            Ok::<_, Infallible>(predicate(ctx, candidate))
        })
    }

    /// Search every distance layer of the configuration for a candidate the
    /// predicate accepts.
    ///
    /// Returns `Ok(None)` once all layers are exhausted. A predicate error
    /// stops every worker and is returned as [`BruteForceError::Predicate`],
    /// even if another worker found a match concurrently.
    pub fn search<C, F, E>(
        &self,
        original: &[u8],
        context: &C,
        predicate: F,
    ) -> Result<Option<Match>>
    where
        C: Sync + ?Sized,
        F: Fn(&C, &[u8]) -> std::result::Result<bool, E> + Sync,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let total_bits = original
            .len()
            .checked_mul(8)
            .ok_or_else(|| BruteForceError::Config("buffer too large".into()))?;
        self.config.validate(total_bits)?;

        // size every layer before any worker starts
        let layers = (self.config.min_distance..=self.config.max_distance)
            .map(|d| count(total_bits, d).map(|total| (d, total)))
            .collect::<Result<Vec<_>>>()?;
        let workers = self.config.parallelism.workers();

        for (distance, total) in layers {
            debug!(distance, candidates = %total, workers, "searching layer");
            self.progress.layer_started(distance, total);
            let found = self.run_layer(original, distance, total, workers, context, &predicate)?;
            self.progress.layer_finished(distance);
            if let Some(m) = found {
                info!(distance, positions = ?m.positions, "match found");
                return Ok(Some(m));
            }
        }
        debug!("search space exhausted without a match");
        Ok(None)
    }

    fn run_layer<C, F, E>(
        &self,
        original: &[u8],
        distance: usize,
        total: u128,
        workers: usize,
        context: &C,
        predicate: &F,
    ) -> Result<Option<Match>>
    where
        C: Sync + ?Sized,
        F: Fn(&C, &[u8]) -> std::result::Result<bool, E> + Sync,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let ranges = partition(total, workers);
        let stop = AtomicBool::new(false);
        let outcome: Outcome = Mutex::new(None);

        if let [range] = ranges.as_slice() {
            self.run_worker(original, distance, *range, context, predicate, &stop, &outcome);
        } else {
            let (stop, outcome) = (&stop, &outcome);
            thread::scope(|s| {
                let handles: Vec<_> = ranges
                    .iter()
                    .map(|&range| {
                        s.spawn(move || {
                            let _guard = StopOnPanic(stop);
                            self.run_worker(original, distance, range, context, predicate, stop, outcome);
                        })
                    })
                    .collect();
                // join everything, then rethrow the first panic with its payload
                let mut panicked = None;
                for handle in handles {
                    if let Err(payload) = handle.join() {
                        panicked.get_or_insert(payload);
                    }
                }
                if let Some(payload) = panicked {
                    panic::resume_unwind(payload);
                }
            });
        }

        outcome
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .transpose()
    }

    #[allow(clippy::too_many_arguments)]
    fn run_worker<C, F, E>(
        &self,
        original: &[u8],
        distance: usize,
        range: RankRange,
        context: &C,
        predicate: &F,
        stop: &AtomicBool,
        outcome: &Outcome,
    ) where
        C: Sync + ?Sized,
        F: Fn(&C, &[u8]) -> std::result::Result<bool, E> + Sync,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        trace!(distance, start = %range.start, end = %range.end, "worker range");
        let mut combination = match unrank(original.len() * 8, distance, range.start) {
            Ok(c) => c,
            Err(e) => {
                publish(outcome, stop, Err(e));
                return;
            }
        };

        let mut candidate = Vec::with_capacity(original.len());
        let mut remaining = range.len();
        let mut pending = 0u64;
        while !stop.load(Ordering::Acquire) {
            self.applicator
                .apply_into(original, combination.positions(), &mut candidate);
            let verdict = predicate(context, &candidate);
            pending += 1;
            if pending == PROGRESS_BATCH {
                self.progress.advance(pending);
                pending = 0;
            }
            match verdict {
                Ok(false) => {}
                Ok(true) => {
                    let found = Match {
                        buffer: std::mem::take(&mut candidate),
                        distance,
                        positions: combination.into_positions(),
                    };
                    publish(outcome, stop, Ok(found));
                    break;
                }
                Err(e) => {
                    let e: Box<dyn std::error::Error + Send + Sync> = e.into();
                    warn!(distance, error = %e, "predicate failed, aborting search");
                    publish(outcome, stop, Err(BruteForceError::Predicate(e)));
                    break;
                }
            }
            remaining -= 1;
            if remaining == 0 || !combination.advance() {
                break;
            }
        }
        if pending > 0 {
            self.progress.advance(pending);
        }
    }
}

/// Record a worker's result and stop the layer.
///
/// The first match is kept unless an error arrives, and the first error is
/// never replaced.
fn publish(outcome: &Outcome, stop: &AtomicBool, result: Result<Match>) {
    let mut slot = outcome.lock().unwrap_or_else(PoisonError::into_inner);
    let replace = match (&*slot, &result) {
        (None, _) => true,
        (Some(Ok(_)), Err(_)) => true,
        _ => false,
    };
    if replace {
        *slot = Some(result);
    }
    stop.store(true, Ordering::Release);
}

/// Search `buffer` for a variant within `min_distance..=max_distance` flipped
/// bits that satisfies `predicate`.
///
/// `workers == 0` uses one worker per hardware thread. Returns the accepted
/// candidate buffer, or `None` when the whole range was searched.
#[allow(clippy::too_many_arguments)]
pub fn brute_force<C, F, A>(
    buffer: &[u8],
    unit: UnitWidth,
    min_distance: usize,
    max_distance: usize,
    context: &C,
    predicate: F,
    applicator: A,
    workers: usize,
) -> Result<Option<Vec<u8>>>
where
    C: Sync + ?Sized,
    F: Fn(&C, &[u8]) -> bool + Sync,
    A: Applicator,
{
    let config = SearchConfig {
        unit,
        min_distance,
        max_distance,
        parallelism: Parallelism::from(workers),
    };
    let found = BruteForcer::new(config)
        .with_applicator(applicator)
        .search_infallible(buffer, context, predicate)?;
    Ok(found.map(|m| m.buffer))
}
