//! Stream sampling algorithms
//!
//! Reservoir samples back the order statistics (median, MAD, percentiles) of
//! [`RunningStats`](crate::statistics::RunningStats). How many samples a
//! reservoir may hold is described by [`SampleCapacity`].
//!
//! # Example
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use rollstats::sampling::{ReservoirSampler, SampleCapacity};
//!
//! let mut rng = StdRng::seed_from_u64(3);
//! let mut sampler = ReservoirSampler::new(SampleCapacity::from_max_sample_size(10));
//!
//! // Stream many items, keep a uniform sample of 10
//! for i in 0..1_000_000 {
//!     sampler.add(i, &mut rng);
//! }
//!
//! assert_eq!(sampler.sample().len(), 10);
//! ```

mod reservoir;

pub use reservoir::ReservoirSampler;

/// How many values a reservoir retains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleCapacity {
    /// Keep no samples; only scalar statistics are available
    #[default]
    Disabled,
    /// Keep a uniform sample of at most this many values
    Bounded(usize),
    /// Keep every value
    Unbounded,
}

impl SampleCapacity {
    /// Interpret a signed maximum sample size
    ///
    /// Negative means unbounded and zero disables sampling.
    pub fn from_max_sample_size(max_sample_size: i64) -> Self {
        match max_sample_size {
            n if n < 0 => SampleCapacity::Unbounded,
            0 => SampleCapacity::Disabled,
            n => SampleCapacity::Bounded(n as usize),
        }
    }

    /// The smallest capacity that satisfies both `self` and `other`
    pub fn widen(self, other: SampleCapacity) -> SampleCapacity {
        use SampleCapacity::*;
        match (self, other) {
            (Unbounded, _) | (_, Unbounded) => Unbounded,
            (Bounded(a), Bounded(b)) => Bounded(a.max(b)),
            (Bounded(a), Disabled) | (Disabled, Bounded(a)) => Bounded(a),
            (Disabled, Disabled) => Disabled,
        }
    }
}
