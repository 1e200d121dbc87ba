//! Shared running statistics for concurrent producers

use super::RunningStats;
use crate::error::StatsError;
use crate::sampling::SampleCapacity;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// [`RunningStats`] behind a lock, with its own random source
///
/// Every accessor, including the reservoir readers (`median`, `mad`,
/// `percentile`), takes a shared read lock and may run concurrently with the
/// others. `add_vector` takes the write lock and the generator together.
#[derive(Debug)]
pub struct ThreadsafeRunningStats {
    stats: RwLock<RunningStats>,
    rng: Mutex<StdRng>,
}

impl ThreadsafeRunningStats {
    /// Create an accumulator; `max_sample_size` follows
    /// [`SampleCapacity::from_max_sample_size`]
    pub fn new(max_sample_size: i64) -> Self {
        Self::with_rng(max_sample_size, StdRng::from_entropy())
    }

    /// Create an accumulator with a reproducible reservoir
    pub fn with_seed(max_sample_size: i64, seed: u64) -> Self {
        Self::with_rng(max_sample_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_sample_size: i64, rng: StdRng) -> Self {
        let capacity = SampleCapacity::from_max_sample_size(max_sample_size);
        Self {
            stats: RwLock::new(RunningStats::new(capacity)),
            rng: Mutex::new(rng),
        }
    }

    pub fn add_vector(&self, values: &[f64]) {
        let mut rng = self.rng.lock();
        self.stats.write().add_vector(values, &mut *rng);
    }

    pub fn count(&self) -> u64 {
        self.stats.read().count()
    }

    pub fn sum(&self) -> f64 {
        self.stats.read().sum()
    }

    pub fn min(&self) -> Result<f64, StatsError> {
        self.stats.read().min()
    }

    pub fn max(&self) -> Result<f64, StatsError> {
        self.stats.read().max()
    }

    pub fn mean(&self) -> Result<f64, StatsError> {
        self.stats.read().mean()
    }

    pub fn stddev(&self) -> Result<f64, StatsError> {
        self.stats.read().stddev()
    }

    pub fn median(&self) -> Result<f64, StatsError> {
        self.stats.read().median()
    }

    pub fn mad(&self) -> Result<f64, StatsError> {
        self.stats.read().mad()
    }

    pub fn percentile(&self, fraction: f64) -> Result<f64, StatsError> {
        self.stats.read().percentile(fraction)
    }
}
