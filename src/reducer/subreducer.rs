//! Reduction state for one group of structurally identical configs

use super::config::{RwrConfig, WindowOperation};
use crate::error::ConfigError;
use crate::math;
use crate::sample::{AddPointsInput, SamplePoint};
use crate::sampling::SampleCapacity;
use crate::window::{WindowDataProcessor, WindowGrid};
use rand::Rng;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use tracing::{trace, warn};

/// Output side of one config served by a subreducer
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub metric_key: String,
    pub window_operation: WindowOperation,
    /// Percentile rank in `[0, 1]`
    pub percentile: f64,
    pub scaling_factor: f64,
    pub zero_for_empty_window: bool,
}

impl OutputConfig {
    /// Output side of an already validated config
    fn from_config(config: &RwrConfig) -> Self {
        Self {
            metric_key: config.output_metric_key.clone().unwrap_or_default(),
            window_operation: config.window_operation.unwrap_or(WindowOperation::Sum),
            percentile: config.percentile_fraction(),
            scaling_factor: config.output_scaling_factor,
            zero_for_empty_window: config.zero_for_empty_window.unwrap_or(false),
        }
    }
}

fn key_set(keys: &[String]) -> BTreeSet<String> {
    keys.iter().cloned().collect()
}

/// Windows, key sets and outputs shared by merged configs
///
/// All merged outputs read the same per-window statistics, so the input side
/// is only accumulated once however many outputs are attached.
#[derive(Debug)]
pub struct Subreducer {
    grid: WindowGrid,
    steps_per_window: i32,
    input_metric_keys: BTreeSet<String>,
    denominator_input_metric_keys: BTreeSet<String>,
    error_sampler_name_inputs: BTreeSet<String>,
    /// Set when any config of this group carries an error matcher
    has_error_matcher: bool,
    error_matcher: Option<Regex>,
    capacity: SampleCapacity,
    window_data: BTreeMap<i64, WindowDataProcessor>,
    window_data_denominator: BTreeMap<i64, WindowDataProcessor>,
    outputs: Vec<OutputConfig>,
}

impl Subreducer {
    /// Build from a validated config
    ///
    /// The error matcher is only compiled for ERROR_COUNT; other operations
    /// never read error messages.
    pub fn new(config: &RwrConfig) -> Result<Self, ConfigError> {
        let error_matcher = match config.error_matcher.as_deref() {
            Some(pattern)
                if !pattern.is_empty()
                    && config.window_operation == Some(WindowOperation::ErrorCount) =>
            {
                let regex =
                    Regex::new(pattern).map_err(|e| ConfigError::InvalidErrorMatcher(e.to_string()))?;
                Some(regex)
            }
            _ => None,
        };

        let steps = u32::try_from(config.steps_per_window).map_err(|_| ConfigError::InvalidStepsPerWindow)?;

        Ok(Self {
            grid: WindowGrid::new(config.window_size.unwrap_or_default(), steps),
            steps_per_window: config.steps_per_window,
            input_metric_keys: key_set(&config.input_metric_keys),
            denominator_input_metric_keys: key_set(&config.denominator_input_metric_keys),
            error_sampler_name_inputs: key_set(&config.error_sampler_name_inputs),
            has_error_matcher: config.has_error_matcher(),
            error_matcher,
            capacity: config.effective_sample_capacity(),
            window_data: BTreeMap::new(),
            window_data_denominator: BTreeMap::new(),
            outputs: vec![OutputConfig::from_config(config)],
        })
    }

    /// Attach `other` as an additional output if it reads exactly the same
    /// input, widening the reservoir to what every output needs
    pub fn try_merge_similar_config(&mut self, other: &RwrConfig) -> bool {
        if other.window_size != Some(self.grid.window_size())
            || other.steps_per_window != self.steps_per_window
        {
            trace!("cannot merge: different window sizes");
            return false;
        }
        if self.has_error_matcher || other.has_error_matcher() {
            trace!("cannot merge: config has error matcher regex");
            return false;
        }
        if self.input_metric_keys != key_set(&other.input_metric_keys) {
            trace!("cannot merge: different input_metric_keys");
            return false;
        }
        if self.denominator_input_metric_keys != key_set(&other.denominator_input_metric_keys) {
            trace!("cannot merge: different denominator_input_metric_keys");
            return false;
        }
        if self.error_sampler_name_inputs != key_set(&other.error_sampler_name_inputs) {
            trace!("cannot merge: different error_sampler_name_inputs");
            return false;
        }

        self.outputs.push(OutputConfig::from_config(other));
        self.capacity = self.capacity.widen(other.effective_sample_capacity());
        true
    }

    pub fn outputs(&self) -> &[OutputConfig] {
        &self.outputs
    }

    pub fn sample_capacity(&self) -> SampleCapacity {
        self.capacity
    }

    /// Route a batch into every containing window
    ///
    /// Error-counting groups (no input keys) only look at the batch errors;
    /// every other group only looks at the points. Unknown keys and sampler
    /// names are ignored.
    pub fn add_points<R: Rng + ?Sized>(&mut self, input: &AddPointsInput, rng: &mut R) {
        if self.input_metric_keys.is_empty() {
            for error in &input.errors {
                if self.error_sampler_name_inputs.contains(&error.sampler_name)
                    && self.is_match(&error.error_message)
                {
                    self.add_error_to_all_containing_windows(error.input_value);
                }
            }
            return;
        }

        for point in &input.points {
            for metric in &point.metric_values {
                self.add_point_to_all_containing_windows(
                    point.input_value,
                    metric.value,
                    &metric.value_key,
                    rng,
                );
            }
        }
    }

    fn is_match(&self, message: &str) -> bool {
        self.error_matcher
            .as_ref()
            .map_or(true, |regex| regex.is_match(message))
    }

    fn containing_windows(&mut self, x: f64) -> Option<RangeInclusive<i64>> {
        let windows = self.grid.update_bounds(x);
        if windows.is_none() {
            warn!(x, base = ?self.grid.base_location(), "x-coordinate has no window, skipping");
        }
        windows
    }

    fn add_error_to_all_containing_windows(&mut self, x: f64) {
        let Some(windows) = self.containing_windows(x) else {
            return;
        };
        let capacity = self.capacity;
        for index in windows {
            self.window_data
                .entry(index)
                .or_insert_with(|| WindowDataProcessor::new(capacity))
                .add_error();
        }
    }

    fn add_point_to_all_containing_windows<R: Rng + ?Sized>(
        &mut self,
        x: f64,
        y: f64,
        key: &str,
        rng: &mut R,
    ) {
        let primary = self.input_metric_keys.contains(key);
        let denominator = self.denominator_input_metric_keys.contains(key);
        if !primary && !denominator {
            return;
        }

        let Some(windows) = self.containing_windows(x) else {
            return;
        };
        let capacity = self.capacity;
        for index in windows {
            if primary {
                self.window_data
                    .entry(index)
                    .or_insert_with(|| WindowDataProcessor::new(capacity))
                    .add_point(y, rng);
            }
            if denominator {
                self.window_data_denominator
                    .entry(index)
                    .or_insert_with(|| WindowDataProcessor::new(capacity))
                    .add_point(y, rng);
            }
        }
    }

    /// Append one output point per (window, output) to `output`
    ///
    /// Nothing is emitted until a value reached the primary series. When
    /// any output asks for zero-filled windows the whole index range is
    /// walked; otherwise only populated windows are.
    pub fn complete_into(&self, output: &mut Vec<SamplePoint>) {
        if self.window_data.is_empty() {
            return;
        }

        let care_about_empty_windows = self.outputs.iter().any(|o| o.zero_for_empty_window);

        if care_about_empty_windows {
            if let Some(range) = self.grid.index_range() {
                for index in range {
                    self.append_output_points_for_window(index, self.window_data.get(&index), output);
                }
            }
        } else {
            for (&index, window) in &self.window_data {
                self.append_output_points_for_window(index, Some(window), output);
            }
        }
    }

    fn append_output_points_for_window(
        &self,
        index: i64,
        window: Option<&WindowDataProcessor>,
        output: &mut Vec<SamplePoint>,
    ) {
        let Some(location) = self.grid.window_location(index) else {
            return;
        };

        for config in &self.outputs {
            if window.is_none() && !config.zero_for_empty_window {
                continue;
            }

            let mut value = window.map_or(0.0, |w| {
                w.get_window_value(config.window_operation, config.percentile)
            });

            if config.window_operation == WindowOperation::RatioSum {
                match self.window_data_denominator.get(&index) {
                    Some(den) => {
                        let denominator =
                            den.get_window_value(config.window_operation, config.percentile);
                        value = math::ratio(value, denominator);
                    }
                    None if !config.zero_for_empty_window => continue,
                    None => value = 0.0,
                }
            }

            value *= config.scaling_factor;
            output.push(SamplePoint::single(location, config.metric_key.as_str(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sum_config(output: &str) -> RwrConfig {
        RwrConfig::new(WindowOperation::Sum)
            .with_input_metric_key("k1")
            .with_output_metric_key(output)
            .with_window_size(1.0)
            .with_steps_per_window(10)
            .with_zero_for_empty_window(false)
    }

    fn error_config(matcher: &str) -> RwrConfig {
        RwrConfig::new(WindowOperation::ErrorCount)
            .with_error_sampler_name_input("sampler")
            .with_error_matcher(matcher)
            .with_output_metric_key("errors")
            .with_window_size(1.0)
            .with_zero_for_empty_window(false)
    }

    fn values(points: &[SamplePoint]) -> Vec<(f64, f64)> {
        points
            .iter()
            .map(|p| (p.input_value, p.metric_values[0].value))
            .collect()
    }

    #[test]
    fn test_merge_rules() {
        let mut sub = Subreducer::new(&sum_config("a")).unwrap();

        assert!(sub.try_merge_similar_config(&sum_config("b")));
        assert!(!sub.try_merge_similar_config(&sum_config("c").with_window_size(2.0)));
        assert!(!sub.try_merge_similar_config(&sum_config("c").with_steps_per_window(5)));
        assert!(!sub.try_merge_similar_config(&sum_config("c").with_input_metric_key("k2")));
        assert!(!sub.try_merge_similar_config(&sum_config("c").with_error_matcher("x")));
        assert_eq!(sub.outputs().len(), 2);

        let mut with_matcher = Subreducer::new(&error_config("boom")).unwrap();
        assert!(!with_matcher.try_merge_similar_config(&error_config("")));
    }

    #[test]
    fn test_merge_widens_capacity() {
        let mut sub = Subreducer::new(&sum_config("a")).unwrap();
        assert_eq!(sub.sample_capacity(), SampleCapacity::Disabled);

        let mut p90 = sum_config("p90").with_percentile_milli(90_000).with_max_sample_size(50);
        p90.window_operation = Some(WindowOperation::Percentile);
        assert!(sub.try_merge_similar_config(&p90));
        assert_eq!(sub.sample_capacity(), SampleCapacity::Bounded(50));

        let mut p50 = p90.clone().with_max_sample_size(-1);
        p50.output_metric_key = Some("p50".into());
        assert!(sub.try_merge_similar_config(&p50));
        assert_eq!(sub.sample_capacity(), SampleCapacity::Unbounded);

        assert!(sub.try_merge_similar_config(&p90));
        assert_eq!(sub.sample_capacity(), SampleCapacity::Unbounded);
    }

    #[test]
    fn test_invalid_matcher_only_for_error_count() {
        let err = Subreducer::new(&error_config("((")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidErrorMatcher(_)));

        assert!(Subreducer::new(&sum_config("a").with_error_matcher("((")).is_ok());
    }

    #[test]
    fn test_boundary_sums() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut sub = Subreducer::new(&sum_config("out")).unwrap();
        sub.add_points(&AddPointsInput::from_pairs("k1", &[(1.0, 10.0), (1.5, 20.0)]), &mut rng);

        let mut out = Vec::new();
        sub.complete_into(&mut out);
        let points = values(&out);

        assert_eq!(points.len(), 15);
        let at = |x: f64| {
            points
                .iter()
                .find(|(px, _)| (px - x).abs() < 1e-9)
                .map(|&(_, y)| y)
        };
        assert_eq!(at(1.0), Some(10.0));
        assert_eq!(at(1.1), Some(30.0));
        assert_eq!(at(2.0), Some(20.0));
    }

    #[test]
    fn test_errors_filtered_by_sampler_and_matcher() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut sub = Subreducer::new(&error_config("time.*out")).unwrap();
        let input = AddPointsInput {
            points: vec![SamplePoint::single(0.0, "sampler", 1.0)],
            errors: vec![
                SampleError::new(0.0, "sampler", "request timed out"),
                SampleError::new(0.0, "sampler", "connection refused"),
                SampleError::new(0.0, "other", "request timed out"),
            ],
        };
        sub.add_points(&input, &mut rng);

        let mut out = Vec::new();
        sub.complete_into(&mut out);
        assert_eq!(values(&out), vec![(0.0, 1.0)]);
    }

    #[test]
    fn test_denominator_only_data_emits_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = RwrConfig::new(WindowOperation::RatioSum)
            .with_input_metric_key("num")
            .with_denominator_input_metric_key("den")
            .with_output_metric_key("ratio")
            .with_window_size(1.0)
            .with_zero_for_empty_window(true);
        let mut sub = Subreducer::new(&config).unwrap();
        sub.add_points(&AddPointsInput::from_pairs("den", &[(0.0, 4.0)]), &mut rng);

        let mut out = Vec::new();
        sub.complete_into(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_self_referencing_ratio() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = RwrConfig::new(WindowOperation::RatioSum)
            .with_input_metric_key("ok")
            .with_denominator_input_metric_key("ok")
            .with_denominator_input_metric_key("failed")
            .with_output_metric_key("success_rate")
            .with_window_size(1.0)
            .with_zero_for_empty_window(false);
        let mut sub = Subreducer::new(&config).unwrap();
        let input = AddPointsInput {
            points: vec![SamplePoint::new(0.0).with_value("ok", 3.0).with_value("failed", 1.0)],
            errors: Vec::new(),
        };
        sub.add_points(&input, &mut rng);

        let mut out = Vec::new();
        sub.complete_into(&mut out);
        assert_eq!(values(&out), vec![(0.0, 0.75)]);
    }
}
