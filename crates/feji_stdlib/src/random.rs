//! Random-number collaborators.

use std::collections::VecDeque;

use feji_foundation::{Error, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of random integers for plugin code.
pub trait RandomSource {
    /// A uniformly distributed integer in `min..=max`.
    ///
    /// # Errors
    ///
    /// Fails when `min > max`.
    fn random_int(&mut self, min: i64, max: i64) -> Result<i64>;
}

fn check_range(min: i64, max: i64) -> Result<()> {
    if min > max {
        Err(Error::invalid_argument(format!("empty range {min}..={max}")))
    } else {
        Ok(())
    }
}

/// Deterministic generator seeded from a `u64`.
///
/// The same seed replays the same sequence, which keeps test runs and
/// recorded sessions reproducible.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn random_int(&mut self, min: i64, max: i64) -> Result<i64> {
        check_range(min, max)?;
        Ok(self.rng.gen_range(min..=max))
    }
}

/// Replays a fixed list of results. Used to script outcomes in tests.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    queue: VecDeque<i64>,
}

impl ScriptedRandom {
    /// Creates a source that yields `values` in order.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            queue: values.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn random_int(&mut self, min: i64, max: i64) -> Result<i64> {
        check_range(min, max)?;
        let value = self
            .queue
            .pop_front()
            .ok_or_else(|| Error::invalid_argument("scripted random values exhausted"))?;
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(Error::invalid_argument(format!(
                "scripted value {value} outside {min}..={max}"
            )))
        }
    }
}
