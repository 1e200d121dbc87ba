//! Sliding window placement and per-window accumulation
//!
//! [`WindowGrid`] maps an x-coordinate to the indices of every overlapping
//! window and tracks the index range seen so far. [`WindowDataProcessor`]
//! holds what was routed into one of those windows and reduces it to a
//! single output value.

mod grid;
mod processor;

pub use grid::WindowGrid;
pub use processor::WindowDataProcessor;
