//! Brute-force bit-flip search.
//!
//! Given a buffer and a Hamming-distance range, every way of flipping between
//! `min_distance` and `max_distance` bits is enumerated exactly once and fed
//! to a caller predicate until it accepts a candidate. Typical use is
//! recovering a measurement or digest that differs from an observed buffer by
//! a few bit errors.
//!
//! ```
//! use bitforce::{BruteForcer, SearchConfig};
//!
//! let observed = [0u8; 4];
//! let expected = [0u8, 0, 0, 1];
//! let found = BruteForcer::new(SearchConfig::new(0, 2))
//!     .search_infallible(&observed, &(), |_, candidate| candidate == expected)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(found.positions, vec![24]);
//! ```

pub mod apply;
pub mod combination;
pub mod config;
pub mod counter;
pub mod error;
pub mod io_utils;
pub mod partition;
pub mod progress;
pub mod search;

pub use apply::{apply_bit_flips, hamming_distance, Applicator, BitFlipApplicator, UnitWidth};
pub use combination::{rank, successor, unrank, Combination};
pub use config::{Parallelism, SearchConfig};
pub use counter::{binomial, count, count_range};
pub use error::{BruteForceError, Result};
pub use partition::{partition, RankRange};
pub use progress::{NoProgress, ProgressSink, PROGRESS_BATCH};
pub use search::{brute_force, BruteForcer, Match};
