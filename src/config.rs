use crate::apply::UnitWidth;
use crate::error::{BruteForceError, Result};

/// How many workers share each distance layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// One worker per available hardware thread.
    #[default]
    Auto,
    /// Exactly this many workers. Zero is rejected by validation.
    Fixed(usize),
}

impl Parallelism {
    /// Resolve to a concrete worker count.
    pub fn workers(self) -> usize {
        match self {
            Parallelism::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Parallelism::Fixed(n) => n,
        }
    }
}

impl From<usize> for Parallelism {
    /// `0` keeps its conventional meaning of "host default".
    fn from(workers: usize) -> Self {
        match workers {
            0 => Parallelism::Auto,
            n => Parallelism::Fixed(n),
        }
    }
}

/// Runtime parameters for one search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Word granularity for the default applicator.
    pub unit: UnitWidth,
    /// Smallest number of flipped bits tried.
    pub min_distance: usize,
    /// Largest number of flipped bits tried, inclusive.
    pub max_distance: usize,
    pub parallelism: Parallelism,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            unit: UnitWidth::U8,
            min_distance: 0,
            max_distance: 1,
            parallelism: Parallelism::Auto,
        }
    }
}

impl SearchConfig {
    pub fn new(min_distance: usize, max_distance: usize) -> Self {
        Self {
            min_distance,
            max_distance,
            ..Self::default()
        }
    }

    pub fn with_unit(mut self, unit: UnitWidth) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Set the worker count; `0` selects [`Parallelism::Auto`].
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.parallelism = Parallelism::from(workers);
        self
    }

    /// Check the configuration against a buffer of `total_bits` bits.
    pub fn validate(&self, total_bits: usize) -> Result<()> {
        if self.min_distance > self.max_distance {
            return Err(BruteForceError::Config(format!(
                "min distance {} is greater than max distance {}",
                self.min_distance, self.max_distance
            )));
        }
        if self.max_distance > total_bits {
            return Err(BruteForceError::Config(format!(
                "max distance {} exceeds the {} bits of the buffer",
                self.max_distance, total_bits
            )));
        }
        if self.parallelism == Parallelism::Fixed(0) {
            return Err(BruteForceError::Config(
                "worker count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_means_auto() {
        assert_eq!(Parallelism::from(0), Parallelism::Auto);
        assert_eq!(Parallelism::from(3), Parallelism::Fixed(3));
        assert!(Parallelism::Auto.workers() >= 1);
    }

    #[test]
    fn validation() {
        assert!(SearchConfig::new(0, 4).validate(32).is_ok());
        assert!(SearchConfig::new(32, 32).validate(32).is_ok());
        assert!(SearchConfig::new(3, 2).validate(32).is_err());
        assert!(SearchConfig::new(0, 33).validate(32).is_err());
        let fixed_zero = SearchConfig {
            parallelism: Parallelism::Fixed(0),
            ..SearchConfig::default()
        };
        assert!(fixed_zero.validate(8).is_err());
    }
}
