//! Ranked enumeration of bit-position combinations.
//!
//! A [`Combination`] is a strictly increasing list of `d` bit positions out of
//! `total_bits`. Combinations of a fixed size are ordered lexicographically
//! (smallest first position first) and every one of the `C(n, d)` of them has
//! a unique rank in `0..C(n, d)`.
//!
//! Ranking goes through the combinatorial number system on the complement
//! positions `n - 1 - p`: for `c_0 < c_1 < ... < c_{d-1}`,
//!
//! ```text
//! rank(c) = C(n, d) - 1 - sum_i C(n - 1 - c_i, d - i)
//! ```

use crate::counter::{binomial, count};
use crate::error::{BruteForceError, Result};

/// A set of distinct bit positions to flip, kept in increasing order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    total_bits: usize,
    positions: Vec<usize>,
}

impl Combination {
    /// The lexicographically first combination: `{0, 1, ..., d - 1}`.
    pub fn first(total_bits: usize, distance: usize) -> Result<Self> {
        check_distance(total_bits, distance)?;
        Ok(Self {
            total_bits,
            positions: (0..distance).collect(),
        })
    }

    /// The lexicographically last combination: `{n - d, ..., n - 1}`.
    pub fn last(total_bits: usize, distance: usize) -> Result<Self> {
        check_distance(total_bits, distance)?;
        Ok(Self {
            total_bits,
            positions: (total_bits - distance..total_bits).collect(),
        })
    }

    /// Build a combination from explicit positions.
    ///
    /// Positions must be strictly increasing and below `total_bits`.
    pub fn from_positions(total_bits: usize, positions: Vec<usize>) -> Result<Self> {
        check_distance(total_bits, positions.len())?;
        if let Some(&p) = positions.iter().find(|&&p| p >= total_bits) {
            return Err(BruteForceError::Config(format!(
                "bit position {p} outside a {total_bits}-bit buffer"
            )));
        }
        if positions.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BruteForceError::Config(
                "bit positions must be strictly increasing".into(),
            ));
        }
        Ok(Self {
            total_bits,
            positions,
        })
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<usize> {
        self.positions
    }

    /// Number of flipped bits, i.e. the Hamming distance of the candidate.
    pub fn distance(&self) -> usize {
        self.positions.len()
    }

    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    pub fn is_last(&self) -> bool {
        let d = self.positions.len();
        self.positions
            .first()
            .map_or(true, |&p| p == self.total_bits - d)
    }

    /// Step to the lexicographic successor in place.
    ///
    /// Returns `false`, leaving `self` untouched, when this is already the
    /// last combination. Amortised O(1).
    pub fn advance(&mut self) -> bool {
        let n = self.total_bits;
        let d = self.positions.len();
        let mut i = d;
        while i > 0 {
            i -= 1;
            if self.positions[i] < n - d + i {
                self.positions[i] += 1;
                for j in i + 1..d {
                    self.positions[j] = self.positions[j - 1] + 1;
                }
                return true;
            }
        }
        false
    }

    /// The next combination in lexicographic order, if any.
    pub fn successor(&self) -> Option<Self> {
        let mut next = self.clone();
        next.advance().then_some(next)
    }

    /// Lexicographic rank among all combinations of the same size.
    pub fn rank(&self) -> Result<u128> {
        let n = self.total_bits;
        let d = self.positions.len();
        let total = count(n, d)?;
        let mut colex: u128 = 0;
        for (i, &p) in self.positions.iter().enumerate() {
            colex += binomial(n - 1 - p, d - i)?;
        }
        Ok(total - 1 - colex)
    }
}

fn check_distance(total_bits: usize, distance: usize) -> Result<()> {
    if distance > total_bits {
        return Err(BruteForceError::DistanceTooLarge {
            distance,
            total_bits,
        });
    }
    Ok(())
}

/// The `rank`-th combination of `distance` positions out of `total_bits`.
pub fn unrank(total_bits: usize, distance: usize, rank: u128) -> Result<Combination> {
    let total = count(total_bits, distance)?;
    if rank >= total {
        return Err(BruteForceError::RankOutOfRange { rank, total });
    }

    let mut remaining = total - 1 - rank;
    let mut positions = Vec::with_capacity(distance);
    // exclusive bound on the next complement position
    let mut upper = total_bits;
    for i in 0..distance {
        let k = distance - i;
        // largest e < upper with C(e, k) <= remaining; C(k - 1, k) == 0
        let mut lo = k - 1;
        let mut hi = upper - 1;
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if binomial(mid, k)? <= remaining {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        remaining -= binomial(lo, k)?;
        positions.push(total_bits - 1 - lo);
        upper = lo;
    }

    Ok(Combination {
        total_bits,
        positions,
    })
}

/// Free-function form of [`Combination::successor`].
pub fn successor(combination: &Combination) -> Option<Combination> {
    combination.successor()
}

/// Free-function form of [`Combination::rank`].
pub fn rank(combination: &Combination) -> Result<u128> {
    combination.rank()
}
