//! Reservoir sampling for uniform random sampling from streams
//!
//! Reservoir sampling maintains a uniform random sample from a stream of
//! unknown length. The random source is borrowed on every insert rather than
//! owned, so several samplers can draw from one generator and tests can drive
//! them with a seeded one.

use super::SampleCapacity;
use rand::Rng;

/// Reservoir sampler using Algorithm R
///
/// With a bounded capacity `k`, every item of the stream ends up in the
/// sample with probability `k/n`, where `n` is the number of items seen.
///
/// # Algorithm
///
/// Algorithm R (Vitter, 1985):
/// 1. Fill reservoir with first k items
/// 2. For each subsequent item i (1-indexed):
///    - Generate random j in [0, i)
///    - If j < k, replace reservoir[j] with item i
///
/// An [`Unbounded`](SampleCapacity::Unbounded) sampler keeps every item and a
/// [`Disabled`](SampleCapacity::Disabled) one keeps none; both still count.
///
/// # Example
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use rollstats::sampling::{ReservoirSampler, SampleCapacity};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let mut sampler = ReservoirSampler::new(SampleCapacity::Bounded(5));
///
/// for i in 0..100 {
///     sampler.add(i, &mut rng);
/// }
///
/// assert_eq!(sampler.sample().len(), 5);
/// assert_eq!(sampler.items_seen(), 100);
/// ```
#[derive(Clone, Debug)]
pub struct ReservoirSampler<T> {
    capacity: SampleCapacity,
    reservoir: Vec<T>,
    /// Number of items seen
    count: u64,
}

impl<T> ReservoirSampler<T> {
    /// Create an empty sampler
    pub fn new(capacity: SampleCapacity) -> Self {
        let reservoir = match capacity {
            SampleCapacity::Bounded(k) => Vec::with_capacity(k),
            SampleCapacity::Disabled | SampleCapacity::Unbounded => Vec::new(),
        };
        Self {
            capacity,
            reservoir,
            count: 0,
        }
    }

    /// Offer an item to the sampler
    pub fn add<R: Rng + ?Sized>(&mut self, item: T, rng: &mut R) {
        self.count += 1;

        match self.capacity {
            SampleCapacity::Disabled => {}
            SampleCapacity::Unbounded => self.reservoir.push(item),
            SampleCapacity::Bounded(k) => {
                if self.reservoir.len() < k {
                    self.reservoir.push(item);
                } else {
                    let j = rng.gen_range(0..self.count);
                    if j < k as u64 {
                        self.reservoir[j as usize] = item;
                    }
                }
            }
        }
    }

    /// Get the current sample
    pub fn sample(&self) -> &[T] {
        &self.reservoir
    }

    /// Get the configured capacity
    pub fn capacity(&self) -> SampleCapacity {
        self.capacity
    }

    /// Get the current sample size
    pub fn len(&self) -> usize {
        self.reservoir.len()
    }

    /// Check if the sample is empty
    pub fn is_empty(&self) -> bool {
        self.reservoir.is_empty()
    }

    /// Get the number of items offered so far
    pub fn items_seen(&self) -> u64 {
        self.count
    }

    /// Probability that any given item from the stream is in the sample
    pub fn sampling_probability(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        match self.capacity {
            SampleCapacity::Disabled => 0.0,
            SampleCapacity::Unbounded => 1.0,
            SampleCapacity::Bounded(k) => ((k as f64) / (self.count as f64)).min(1.0),
        }
    }
}
