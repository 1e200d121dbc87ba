//! Error types
//!
//! Configuration problems are reported by [`ConfigError`] when a reducer is
//! built, statistical "no data" conditions by [`StatsError`], and anything the
//! file-driven driver hits while talking to its [`FileIo`](crate::fileio::FileIo)
//! by [`ReduceError`].

use core::fmt;
use thiserror::Error;

/// A configuration rejected at construction time
///
/// Every message names the offending field so a misconfiguration can be
/// diagnosed from the message alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("config must specify output_metric_key")]
    MissingOutputMetricKey,

    #[error("config must specify window_operation")]
    MissingWindowOperation,

    #[error("config must specify a positive window_size")]
    InvalidWindowSize,

    #[error("config must specify a positive steps_per_window")]
    InvalidStepsPerWindow,

    #[error("config must specify zero_for_empty_window")]
    MissingZeroForEmptyWindow,

    #[error("config cannot have output_scaling_factor=0")]
    ZeroScalingFactor,

    #[error("config must specify at least one input_metric_key")]
    MissingInputMetricKeys,

    #[error("config should not have any input_metric_keys when using the ERROR_COUNT window operation")]
    UnexpectedInputMetricKeys,

    #[error("config must provide at least one error_sampler_name_inputs when using the ERROR_COUNT window operation")]
    MissingErrorSamplerNames,

    #[error("config should not have any error_sampler_name_inputs when using a non-error window operation")]
    UnexpectedErrorSamplerNames,

    #[error("config must provide at least one denominator_input_metric_keys when using the RATIO_SUM window operation")]
    MissingDenominatorKeys,

    #[error("config should not have any denominator_input_metric_keys when using a non-ratio window operation")]
    UnexpectedDenominatorKeys,

    #[error("config must specify percentile_milli when window_operation is PERCENTILE")]
    MissingPercentile,

    #[error("config percentile_milli must be in (0, 100000], got {0}")]
    InvalidPercentile(i32),

    #[error("compiling error_matcher returned an error: {0}")]
    InvalidErrorMatcher(String),

    #[error("invalid config document: {0}")]
    Parse(String),
}

/// A statistic that cannot be computed from the current accumulator state
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StatsError {
    /// No values have been added
    #[error("no data")]
    NoData,

    /// Values were added but the reservoir keeps no samples
    #[error("no samples retained for order statistics")]
    NoSamples,

    /// Percentile rank outside [0, 1]
    #[error("percentile must be between 0 and 1, got {0}")]
    InvalidPercentile(f64),
}

/// Which step of the file-driven reduction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoPhase {
    Open,
    Read,
    Write,
}

impl fmt::Display for IoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoPhase::Open => write!(f, "opening file"),
            IoPhase::Read => write!(f, "reading record"),
            IoPhase::Write => write!(f, "writing record"),
        }
    }
}

/// Error returned by reducer construction and the file-driven driver
#[derive(Debug, Error)]
pub enum ReduceError {
    /// One of the supplied configs is invalid
    #[error("creating reducer for config {index}: {source}")]
    InvalidConfig {
        index: usize,
        #[source]
        source: ConfigError,
    },

    /// The file collaborator failed
    #[error("{phase} {path}: {source}")]
    Io {
        phase: IoPhase,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ReduceError {
    pub(crate) fn io(phase: IoPhase, path: &str, source: std::io::Error) -> Self {
        ReduceError::Io {
            phase,
            path: path.to_owned(),
            source,
        }
    }

    /// The config error behind an [`ReduceError::InvalidConfig`], if any
    pub fn config_error(&self) -> Option<&ConfigError> {
        match self {
            ReduceError::InvalidConfig { source, .. } => Some(source),
            ReduceError::Io { .. } => None,
        }
    }
}
