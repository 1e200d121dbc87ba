//! Per-window accumulator

use crate::reducer::WindowOperation;
use crate::sampling::SampleCapacity;
use crate::statistics::RunningStats;
use rand::Rng;
use tracing::warn;

/// Data collected for one window index
///
/// Holds the running statistics of every value routed into the window and
/// a separate counter for routed sampler errors.
#[derive(Debug, Clone)]
pub struct WindowDataProcessor {
    stats: RunningStats,
    error_count: u64,
}

impl WindowDataProcessor {
    pub fn new(capacity: SampleCapacity) -> Self {
        Self {
            stats: RunningStats::new(capacity),
            error_count: 0,
        }
    }

    pub fn add_point<R: Rng + ?Sized>(&mut self, value: f64, rng: &mut R) {
        self.stats.add(value, rng);
    }

    pub fn add_error(&mut self) {
        self.error_count += 1;
    }

    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    /// Reduce the window to a single value
    ///
    /// `percentile` is the rank in `[0, 1]` and is only read for
    /// [`WindowOperation::Percentile`]. When the statistics cannot produce a
    /// value (an empty window or a disabled reservoir) the result is 0.0 and
    /// a warning is logged.
    pub fn get_window_value(&self, op: WindowOperation, percentile: f64) -> f64 {
        let result = match op {
            WindowOperation::Sum | WindowOperation::RatioSum => Ok(self.stats.sum()),
            WindowOperation::Mean => self.stats.mean(),
            WindowOperation::Count => Ok(self.stats.count() as f64),
            WindowOperation::ErrorCount => Ok(self.error_count as f64),
            WindowOperation::Percentile => self.stats.percentile(percentile),
        };

        result.unwrap_or_else(|err| {
            warn!(operation = ?op, error = %err, "window statistic unavailable, using 0");
            0.0
        })
    }
}
