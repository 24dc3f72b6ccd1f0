//! Exact combination counts.
//!
//! All arithmetic is done in `u128` with overflow checks. A count that does
//! not fit is reported as [`BruteForceError::Overflow`] instead of wrapping,
//! since partition boundaries are derived from it.

use crate::error::{BruteForceError, Result};

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Exact binomial coefficient `C(n, k)`.
///
/// Returns `0` when `k > n`. Each step cancels the common factor before
/// multiplying, so the only way to overflow is for a true intermediate
/// coefficient `C(n, i)` with `i <= min(k, n - k)` to exceed `u128::MAX`.
pub fn binomial(n: usize, k: usize) -> Result<u128> {
    if k > n {
        return Ok(0);
    }
    let steps = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..steps {
        // acc == C(n, i); move to C(n, i + 1) = acc * (n - i) / (i + 1)
        let num = (n - i) as u128;
        let den = (i + 1) as u128;
        let g = gcd(acc, den);
        let den = den / g;
        acc = (acc / g)
            .checked_mul(num / den)
            .ok_or(BruteForceError::Overflow { n, k })?;
    }
    Ok(acc)
}

/// Number of ways to flip exactly `distance` of `total_bits` bits.
pub fn count(total_bits: usize, distance: usize) -> Result<u128> {
    if distance > total_bits {
        return Err(BruteForceError::DistanceTooLarge {
            distance,
            total_bits,
        });
    }
    binomial(total_bits, distance)
}

/// Total number of candidates across the distance layers `min..=max`.
pub fn count_range(total_bits: usize, min_distance: usize, max_distance: usize) -> Result<u128> {
    if min_distance > max_distance {
        return Err(BruteForceError::Config(format!(
            "min distance {min_distance} is greater than max distance {max_distance}"
        )));
    }
    let mut total: u128 = 0;
    for d in min_distance..=max_distance {
        total = total
            .checked_add(count(total_bits, d)?)
            .ok_or(BruteForceError::Overflow {
                n: total_bits,
                k: d,
            })?;
    }
    Ok(total)
}
