//! Splitting a layer's rank space between workers.

use std::ops::Range;

/// Half-open range of ranks handed to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankRange {
    pub start: u128,
    pub end: u128,
}

impl RankRange {
    pub fn len(&self) -> u128 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<RankRange> for Range<u128> {
    fn from(r: RankRange) -> Self {
        r.start..r.end
    }
}

/// Split `0..total` into at most `workers` contiguous, non-empty ranges.
///
/// Ranges are returned in order and their sizes differ by at most one. Fewer
/// ranges than `workers` come back when `total < workers`; none when `total`
/// is zero.
pub fn partition(total: u128, workers: usize) -> Vec<RankRange> {
    let workers = (workers.max(1) as u128).min(total);
    if workers == 0 {
        return Vec::new();
    }
    let base = total / workers;
    let extra = total % workers;
    let mut out = Vec::with_capacity(workers as usize);
    let mut start = 0u128;
    for i in 0..workers {
        let len = base + u128::from(i < extra);
        out.push(RankRange {
            start,
            end: start + len,
        });
        start += len;
    }
    out
}
