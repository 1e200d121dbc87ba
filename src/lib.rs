//! # Rollstats
//!
//! Rolling window reduction and running statistics for benchmark samples.
//!
//! Rollstats condenses large streams of irregularly spaced, labelled
//! `(x, y)` samples into compact summary series. Every configured output
//! slides a fixed-size window along the x-axis in even steps and reduces the
//! values in each window to one number.
//!
//! ## Features
//!
//! - **Window operations**: sum, mean, count, percentile, error count and
//!   ratio of sums
//! - **Overlapping windows**: any point lands in `steps_per_window` windows
//! - **Config merging**: outputs reading the same input share one pass
//! - **Running statistics**: exact count, sum, mean, min, max and standard
//!   deviation, with order statistics from a bounded reservoir sample
//! - **File driver**: stream stored records through a reducer in bounded
//!   batches and append the result
//!
//! ## Quick Start
//!
//! ```rust
//! use rollstats::prelude::*;
//!
//! let config = RwrConfig::new(WindowOperation::Percentile)
//!     .with_input_metric_key("latency_ms")
//!     .with_output_metric_key("latency_p50")
//!     .with_percentile_milli(50_000)
//!     .with_window_size(1.0)
//!     .with_zero_for_empty_window(false);
//!
//! let mut reducer = RollingWindowReducer::new(&config).unwrap();
//! reducer.add_points(&AddPointsInput::from_pairs(
//!     "latency_ms",
//!     &[(0.1, 10.0), (0.2, 14.0), (0.3, 16.0)],
//! ));
//!
//! let output = reducer.complete();
//! assert_eq!(output.len(), 1);
//! assert_eq!(output.points[0].metric_values[0].value, 14.0);
//! ```
//!
//! ## Running Statistics
//!
//! The accumulator behind every window is usable on its own:
//!
//! ```rust
//! use rollstats::statistics::ThreadsafeRunningStats;
//!
//! let stats = ThreadsafeRunningStats::with_seed(-1, 42);
//! stats.add_vector(&[0.0, 1.0, 5.0]);
//!
//! assert_eq!(stats.mean(), Ok(2.0));
//! assert_eq!(stats.median(), Ok(1.0));
//! ```
//!
//! ## Logging
//!
//! Diagnostics are emitted through [`tracing`]; install a subscriber to see
//! merge decisions, batch flushes and values replaced by zero.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod fileio;
pub mod math;
pub mod reducer;
pub mod sample;
pub mod sampling;
pub mod statistics;
pub mod window;

pub mod prelude {
    pub use crate::error::{ConfigError, ReduceError, StatsError};
    pub use crate::reducer::{RollingWindowReducer, RwrConfig, WindowOperation};
    pub use crate::sample::{AddPointsInput, CompleteOutput, SampleError, SamplePoint};
    pub use crate::statistics::RunningStats;
}

pub use error::{ConfigError, ReduceError, StatsError};
pub use reducer::{RollingWindowReducer, RwrConfig, WindowOperation};
pub use statistics::{RunningStats, ThreadsafeRunningStats};
