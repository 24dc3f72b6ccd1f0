use thiserror::Error;

#[derive(Error, Debug)]
pub enum BruteForceError {
    /// Invalid search configuration, detected before any worker starts.
    #[error("config error: {0}")]
    Config(String),

    /// Requested more flipped bits than the buffer holds.
    #[error("distance {distance} exceeds the {total_bits} bits available")]
    DistanceTooLarge { distance: usize, total_bits: usize },

    /// Rank does not name any combination of the requested size.
    #[error("rank {rank} out of range for {total} combinations")]
    RankOutOfRange { rank: u128, total: u128 },

    /// Exact combination count does not fit in 128 bits.
    #[error("C({n}, {k}) overflows 128-bit arithmetic")]
    Overflow { n: usize, k: usize },

    /// The caller-supplied predicate failed; the search was aborted.
    #[error("predicate error: {0}")]
    Predicate(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BruteForceError>;
