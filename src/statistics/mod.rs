//! Statistical summaries for streaming data
//!
//! [`RunningStats`] computes exact scalar statistics in a single pass and
//! keeps a reservoir sample for order statistics. [`ThreadsafeRunningStats`]
//! wraps one for use from several threads.
//!
//! # Example
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use rollstats::sampling::SampleCapacity;
//! use rollstats::statistics::RunningStats;
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let mut stats = RunningStats::new(SampleCapacity::Bounded(1024));
//!
//! for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
//!     stats.add(value, &mut rng);
//! }
//!
//! println!("Mean: {:?}", stats.mean());
//! println!("Stddev: {:?}", stats.stddev());
//! println!("p90: {:?}", stats.percentile(0.9));
//! ```

mod moments;
mod threadsafe;

pub use moments::RunningStats;
pub use threadsafe::ThreadsafeRunningStats;
