//! Discrete action space

use super::Space;
use rand::Rng;

/// Discrete space with n possible values: {start, start + 1, ..., start + n - 1}
///
/// Samples are `i64` so that callers can hand the environment any integer,
/// including negative ones, and have it rejected by `contains`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrete {
    /// Number of possible values
    pub n: usize,
    /// Smallest value
    pub start: i64,
    /// Cached shape
    shape: Vec<usize>,
}

impl Discrete {
    /// Create a new discrete space with n values starting at zero
    pub fn new(n: usize) -> Self {
        Self::with_start(n, 0)
    }

    /// Create a discrete space with n values starting at `start`
    pub fn with_start(n: usize, start: i64) -> Self {
        assert!(n > 0, "Discrete space must have at least 1 element");
        Self {
            n,
            start,
            shape: vec![1],
        }
    }

    /// Zero-based position of `value` inside the space, if contained
    pub fn index_of(&self, value: i64) -> Option<usize> {
        if self.contains(&value) {
            Some((value - self.start) as usize)
        } else {
            None
        }
    }
}

impl Space for Discrete {
    type Sample = i64;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        self.start + rng.gen_range(0..self.n) as i64
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        *value >= self.start && *value - self.start < self.n as i64
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn num_elements(&self) -> usize {
        1
    }
}
