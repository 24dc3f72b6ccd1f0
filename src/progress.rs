//! Progress reporting hooks for long searches.
//!
//! Workers report in batches, so a sink sees `advance` calls roughly every
//! [`PROGRESS_BATCH`] candidates per worker plus one final flush.

/// Candidates a worker evaluates between two `advance` calls.
pub const PROGRESS_BATCH: u64 = 4096;

/// Receives progress notifications from the search driver.
///
/// Called concurrently from every worker of a layer.
pub trait ProgressSink: Sync {
    fn layer_started(&self, _distance: usize, _candidates: u128) {}
    fn advance(&self, _evaluated: u64) {}
    fn layer_finished(&self, _distance: usize) {}
}

/// Sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

impl ProgressSink for indicatif::ProgressBar {
    fn layer_started(&self, distance: usize, candidates: u128) {
        self.set_message(format!("distance {distance}: {candidates} candidates"));
    }

    fn advance(&self, evaluated: u64) {
        self.inc(evaluated);
    }
}
