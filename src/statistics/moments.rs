//! Running statistics (count, sum, mean, variance, min, max, percentiles)
//!
//! Count, sum, min and max are tracked exactly. Variance uses Welford's
//! numerically stable online algorithm. Order statistics come from a
//! reservoir sample whose size is chosen when the accumulator is created.

use crate::error::StatsError;
use crate::math;
use crate::sampling::{ReservoirSampler, SampleCapacity};
use rand::Rng;

/// Running statistics over a stream of `f64` values
///
/// The cheap aggregates (`count`, `sum`, `mean`, `min`, `max`, `stddev`)
/// never lose information. `median`, `mad` and `percentile` are computed from
/// the reservoir and are exact only while the reservoir holds every value.
///
/// Statistics that need at least one value return [`StatsError::NoData`] on
/// an empty accumulator instead of a made-up zero.
///
/// # Example
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use rollstats::sampling::SampleCapacity;
/// use rollstats::statistics::RunningStats;
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let mut stats = RunningStats::new(SampleCapacity::Unbounded);
///
/// for value in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     stats.add(value, &mut rng);
/// }
///
/// assert_eq!(stats.count(), 8);
/// assert_eq!(stats.sum(), 40.0);
/// assert_eq!(stats.mean(), Ok(5.0));
/// assert!((stats.stddev().unwrap() - 2.0).abs() < 0.001);
/// assert_eq!(stats.median(), Ok(4.5));
/// ```
#[derive(Clone, Debug)]
pub struct RunningStats {
    /// Number of values seen
    count: u64,
    /// Exact running sum
    sum: f64,
    /// Welford running mean, only used for the variance
    welford_mean: f64,
    /// Sum of squared differences from mean (M2 in Welford's algorithm)
    m2: f64,
    min: f64,
    max: f64,
    reservoir: ReservoirSampler<f64>,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new(SampleCapacity::Disabled)
    }
}

impl RunningStats {
    /// Create a new empty accumulator
    pub fn new(capacity: SampleCapacity) -> Self {
        Self {
            count: 0,
            sum: 0.0,
            welford_mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            reservoir: ReservoirSampler::new(capacity),
        }
    }

    /// Add a value
    ///
    /// NaN values are ignored to prevent poisoning the statistics. `rng`
    /// decides reservoir replacement once a bounded reservoir is full.
    pub fn add<R: Rng + ?Sized>(&mut self, value: f64, rng: &mut R) {
        if value.is_nan() {
            return;
        }

        self.count += 1;
        self.sum += value;

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }

        let delta = value - self.welford_mean;
        self.welford_mean += delta / self.count as f64;
        let delta2 = value - self.welford_mean;
        self.m2 += delta * delta2;

        self.reservoir.add(value, rng);
    }

    /// Add every value of a slice
    pub fn add_vector<R: Rng + ?Sized>(&mut self, values: &[f64], rng: &mut R) {
        for &value in values {
            self.add(value, rng);
        }
    }

    /// Number of values added
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Exact sum of all values; zero when empty
    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn mean(&self) -> Result<f64, StatsError> {
        if self.count == 0 {
            return Err(StatsError::NoData);
        }
        Ok(self.sum / self.count as f64)
    }

    pub fn min(&self) -> Result<f64, StatsError> {
        if self.count == 0 {
            return Err(StatsError::NoData);
        }
        Ok(self.min)
    }

    pub fn max(&self) -> Result<f64, StatsError> {
        if self.count == 0 {
            return Err(StatsError::NoData);
        }
        Ok(self.max)
    }

    /// Population variance
    pub fn variance(&self) -> Result<f64, StatsError> {
        if self.count == 0 {
            return Err(StatsError::NoData);
        }
        Ok(self.m2 / self.count as f64)
    }

    /// Population standard deviation
    pub fn stddev(&self) -> Result<f64, StatsError> {
        self.variance().map(f64::sqrt)
    }

    /// Median of the reservoir sample
    pub fn median(&self) -> Result<f64, StatsError> {
        self.percentile(0.5)
    }

    /// Median absolute deviation about the sample median
    pub fn mad(&self) -> Result<f64, StatsError> {
        let median = self.median()?;
        let deviations: Vec<f64> = self
            .reservoir
            .sample()
            .iter()
            .map(|v| (v - median).abs())
            .collect();
        let sorted = math::sorted_copy(&deviations);
        math::interpolated_percentile(&sorted, 0.5).ok_or(StatsError::NoSamples)
    }

    /// Percentile of the reservoir sample
    ///
    /// `fraction` is the rank in `[0, 1]` (0.5 is the median). Neighbouring
    /// order statistics are linearly interpolated.
    pub fn percentile(&self, fraction: f64) -> Result<f64, StatsError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(StatsError::InvalidPercentile(fraction));
        }
        if self.count == 0 {
            return Err(StatsError::NoData);
        }
        let sorted = math::sorted_copy(self.reservoir.sample());
        math::interpolated_percentile(&sorted, fraction).ok_or(StatsError::NoSamples)
    }

    /// Values currently held by the reservoir, in insertion/replacement order
    pub fn sample(&self) -> &[f64] {
        self.reservoir.sample()
    }

    pub fn capacity(&self) -> SampleCapacity {
        self.reservoir.capacity()
    }
}
