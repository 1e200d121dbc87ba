//! Rolling window reduction
//!
//! A [`RollingWindowReducer`] turns irregularly spaced `(x, y)` samples into
//! evenly spaced summary points. Each [`RwrConfig`] names the input metric
//! keys, a window size, how many overlapping windows cover any point
//! (`steps_per_window`) and the [`WindowOperation`] applied per window.
//!
//! Configs that read exactly the same input are merged into one
//! [`Subreducer`] and share its per-window statistics.
//!
//! # Example
//!
//! ```
//! use rollstats::prelude::*;
//!
//! let configs = [
//!     RwrConfig::new(WindowOperation::Sum)
//!         .with_input_metric_key("requests")
//!         .with_output_metric_key("requests_per_window")
//!         .with_window_size(10.0)
//!         .with_zero_for_empty_window(true),
//!     RwrConfig::new(WindowOperation::Count)
//!         .with_input_metric_key("requests")
//!         .with_output_metric_key("samples_per_window")
//!         .with_window_size(10.0)
//!         .with_zero_for_empty_window(true),
//! ];
//!
//! let mut reducer = RollingWindowReducer::with_seed(&configs, 7).unwrap();
//! assert_eq!(reducer.subreducer_count(), 1);
//!
//! reducer.add_points(&AddPointsInput::from_pairs("requests", &[(0.0, 3.0), (4.0, 5.0), (30.0, 1.0)]));
//! let output = reducer.complete();
//!
//! // Windows at 0, 10, 20 and 30; the two in the middle are empty
//! let sums: Vec<f64> = output
//!     .with_key("requests_per_window")
//!     .map(|p| p.metric_values[0].value)
//!     .collect();
//! assert_eq!(sums, vec![8.0, 0.0, 0.0, 1.0]);
//! ```
//!
//! For records stored in files, [`reduce`] and [`reduce_files`] stream a
//! [`FileIo`](crate::fileio::FileIo) through a reducer in bounded batches.

mod batch;
mod config;
mod rolling;
mod subreducer;

pub use batch::{reduce, reduce_files, DriverOptions};
pub use config::{RwrConfig, WindowOperation};
pub use rolling::RollingWindowReducer;
pub use subreducer::{OutputConfig, Subreducer};
