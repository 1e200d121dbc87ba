//! Reducer configuration and validation

use crate::error::ConfigError;
use crate::sampling::SampleCapacity;
use serde::{Deserialize, Serialize};

/// How the values in one window are reduced to a single output value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowOperation {
    Sum,
    Mean,
    Count,
    /// Percentile selected by `percentile_milli`
    Percentile,
    /// Number of matching sampler errors
    ErrorCount,
    /// Numerator window sum divided by denominator window sum
    RatioSum,
}

/// One desired output metric
///
/// Fields left as `None` are "unset"; validation distinguishes unset from
/// zero or empty where the difference matters.
///
/// # Example
///
/// ```
/// use rollstats::reducer::{RwrConfig, WindowOperation};
///
/// let config = RwrConfig::new(WindowOperation::Mean)
///     .with_input_metric_key("latency")
///     .with_output_metric_key("latency_mean")
///     .with_window_size(1.0)
///     .with_steps_per_window(10)
///     .with_zero_for_empty_window(false);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RwrConfig {
    /// Metric keys feeding the primary (numerator) series
    pub input_metric_keys: Vec<String>,
    /// Metric keys feeding the denominator series of RATIO_SUM
    pub denominator_input_metric_keys: Vec<String>,
    /// Sampler names whose errors ERROR_COUNT counts
    pub error_sampler_name_inputs: Vec<String>,
    /// Regular expression an error message must contain a match of
    pub error_matcher: Option<String>,
    pub output_metric_key: Option<String>,
    pub window_operation: Option<WindowOperation>,
    pub window_size: Option<f64>,
    pub steps_per_window: i32,
    pub zero_for_empty_window: Option<bool>,
    /// Multiplier applied to every output value
    pub output_scaling_factor: f64,
    /// Thousandths of a percent; 50000 is the median
    pub percentile_milli: Option<i32>,
    /// Reservoir size for PERCENTILE; negative means unbounded
    pub max_sample_size: Option<i64>,
}

impl Default for RwrConfig {
    fn default() -> Self {
        Self {
            input_metric_keys: Vec::new(),
            denominator_input_metric_keys: Vec::new(),
            error_sampler_name_inputs: Vec::new(),
            error_matcher: None,
            output_metric_key: None,
            window_operation: None,
            window_size: None,
            steps_per_window: 1,
            zero_for_empty_window: None,
            output_scaling_factor: 1.0,
            percentile_milli: None,
            max_sample_size: None,
        }
    }
}

impl RwrConfig {
    /// Start a config for the given operation
    pub fn new(window_operation: WindowOperation) -> Self {
        Self {
            window_operation: Some(window_operation),
            ..Self::default()
        }
    }

    /// Parse a single config from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse a JSON array of configs
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn with_input_metric_key(mut self, key: impl Into<String>) -> Self {
        self.input_metric_keys.push(key.into());
        self
    }

    pub fn with_denominator_input_metric_key(mut self, key: impl Into<String>) -> Self {
        self.denominator_input_metric_keys.push(key.into());
        self
    }

    pub fn with_error_sampler_name_input(mut self, name: impl Into<String>) -> Self {
        self.error_sampler_name_inputs.push(name.into());
        self
    }

    pub fn with_error_matcher(mut self, pattern: impl Into<String>) -> Self {
        self.error_matcher = Some(pattern.into());
        self
    }

    pub fn with_output_metric_key(mut self, key: impl Into<String>) -> Self {
        self.output_metric_key = Some(key.into());
        self
    }

    pub fn with_window_size(mut self, window_size: f64) -> Self {
        self.window_size = Some(window_size);
        self
    }

    pub fn with_steps_per_window(mut self, steps: i32) -> Self {
        self.steps_per_window = steps;
        self
    }

    pub fn with_zero_for_empty_window(mut self, zero: bool) -> Self {
        self.zero_for_empty_window = Some(zero);
        self
    }

    pub fn with_output_scaling_factor(mut self, factor: f64) -> Self {
        self.output_scaling_factor = factor;
        self
    }

    pub fn with_percentile_milli(mut self, percentile_milli: i32) -> Self {
        self.percentile_milli = Some(percentile_milli);
        self
    }

    pub fn with_max_sample_size(mut self, max_sample_size: i64) -> Self {
        self.max_sample_size = Some(max_sample_size);
        self
    }

    fn is_op(&self, op: WindowOperation) -> bool {
        self.window_operation == Some(op)
    }

    /// Check the field combination; the first violated rule is reported
    pub fn validate(&self) -> Result<(), ConfigError> {
        let error_op = self.is_op(WindowOperation::ErrorCount);
        let ratio_op = self.is_op(WindowOperation::RatioSum);

        if error_op && !self.input_metric_keys.is_empty() {
            return Err(ConfigError::UnexpectedInputMetricKeys);
        }
        if error_op && self.error_sampler_name_inputs.is_empty() {
            return Err(ConfigError::MissingErrorSamplerNames);
        }
        if !error_op && !self.error_sampler_name_inputs.is_empty() {
            return Err(ConfigError::UnexpectedErrorSamplerNames);
        }
        if !error_op && self.input_metric_keys.is_empty() {
            return Err(ConfigError::MissingInputMetricKeys);
        }
        if ratio_op && self.denominator_input_metric_keys.is_empty() {
            return Err(ConfigError::MissingDenominatorKeys);
        }
        if !ratio_op && !self.denominator_input_metric_keys.is_empty() {
            return Err(ConfigError::UnexpectedDenominatorKeys);
        }

        if self.output_metric_key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingOutputMetricKey);
        }
        if self.window_operation.is_none() {
            return Err(ConfigError::MissingWindowOperation);
        }
        // NaN fails this too
        if !self.window_size.map_or(false, |size| size > 0.0) {
            return Err(ConfigError::InvalidWindowSize);
        }
        if self.steps_per_window <= 0 {
            return Err(ConfigError::InvalidStepsPerWindow);
        }
        if self.zero_for_empty_window.is_none() {
            return Err(ConfigError::MissingZeroForEmptyWindow);
        }
        if self.output_scaling_factor == 0.0 {
            return Err(ConfigError::ZeroScalingFactor);
        }

        if self.is_op(WindowOperation::Percentile) {
            match self.percentile_milli {
                None => return Err(ConfigError::MissingPercentile),
                Some(p) if p <= 0 || p > 100_000 => {
                    return Err(ConfigError::InvalidPercentile(p))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Reservoir capacity needed to serve this config
    ///
    /// Only PERCENTILE reads the reservoir; it gets `max_sample_size` when
    /// set and an unbounded reservoir otherwise.
    pub fn effective_sample_capacity(&self) -> SampleCapacity {
        if !self.is_op(WindowOperation::Percentile) {
            return SampleCapacity::Disabled;
        }
        match self.max_sample_size {
            Some(size) => SampleCapacity::from_max_sample_size(size),
            None => SampleCapacity::Unbounded,
        }
    }

    /// Percentile rank in `[0, 1]`, zero when unset
    pub fn percentile_fraction(&self) -> f64 {
        self.percentile_milli
            .map_or(0.0, |milli| f64::from(milli) / 100_000.0)
    }

    /// Whether a non-empty error matcher is configured, whatever the operation
    pub fn has_error_matcher(&self) -> bool {
        self.error_matcher.as_deref().map_or(false, |m| !m.is_empty())
    }
}
