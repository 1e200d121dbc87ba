//! Merging orchestrator over subreducers

use super::config::RwrConfig;
use super::subreducer::Subreducer;
use crate::error::{ConfigError, ReduceError};
use crate::sample::{AddPointsInput, CompleteOutput, SamplePoint};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error};

/// Rolling window reducer over one or more configs
///
/// Configs that read exactly the same input share a [`Subreducer`], so each
/// input value is accumulated once per distinct input shape. The reducer is
/// single-threaded: shard across instances for parallel ingestion.
///
/// `add_points` may still be called after `complete`; a later `complete`
/// then reflects the additional data.
///
/// # Example
///
/// ```
/// use rollstats::prelude::*;
///
/// let config = RwrConfig::new(WindowOperation::Mean)
///     .with_input_metric_key("k1")
///     .with_output_metric_key("out")
///     .with_window_size(1.0)
///     .with_steps_per_window(10)
///     .with_zero_for_empty_window(false);
///
/// let mut reducer = RollingWindowReducer::new(&config).unwrap();
/// reducer.add_points(&AddPointsInput::from_pairs("k1", &[(1.0, 10.0), (1.5, 20.0)]));
///
/// let output = reducer.complete();
/// let at = |x: f64| {
///     output.points.iter()
///         .find(|p| (p.input_value - x).abs() < 1e-9)
///         .map(|p| p.metric_values[0].value)
/// };
/// assert_eq!(at(1.0), Some(10.0));
/// assert_eq!(at(1.1), Some(15.0));
/// assert_eq!(at(2.0), Some(20.0));
/// ```
#[derive(Debug)]
pub struct RollingWindowReducer {
    subreducers: Vec<Subreducer>,
    rng: StdRng,
}

impl RollingWindowReducer {
    /// Reducer for a single config
    pub fn new(config: &RwrConfig) -> Result<Self, ReduceError> {
        Self::new_merged(core::slice::from_ref(config))
    }

    /// Reducer for several configs, merging the ones that share input
    pub fn new_merged(configs: &[RwrConfig]) -> Result<Self, ReduceError> {
        Self::with_rng(configs, StdRng::from_entropy())
    }

    /// Like [`new_merged`](Self::new_merged) with a reproducible reservoir
    pub fn with_seed(configs: &[RwrConfig], seed: u64) -> Result<Self, ReduceError> {
        Self::with_rng(configs, StdRng::seed_from_u64(seed))
    }

    /// Like [`new_merged`](Self::new_merged) with a caller-supplied generator
    ///
    /// The generator drives reservoir replacement for every subreducer.
    pub fn with_rng(configs: &[RwrConfig], rng: StdRng) -> Result<Self, ReduceError> {
        let mut reducer = Self {
            subreducers: Vec::new(),
            rng,
        };
        for (index, config) in configs.iter().enumerate() {
            reducer
                .add_config(config)
                .map_err(|source| ReduceError::InvalidConfig { index, source })?;
        }
        Ok(reducer)
    }

    /// Construct for callers that cannot handle an error; failures are
    /// logged and yield `None`
    pub fn create(config: &RwrConfig) -> Option<Self> {
        match Self::new(config) {
            Ok(reducer) => Some(reducer),
            Err(err) => {
                error!(error = %err, "failed to create reducer");
                None
            }
        }
    }

    fn add_config(&mut self, config: &RwrConfig) -> Result<(), ConfigError> {
        config.validate()?;

        for subreducer in &mut self.subreducers {
            if subreducer.try_merge_similar_config(config) {
                debug!(output = ?config.output_metric_key, "merging config");
                return Ok(());
            }
        }

        debug!(
            output = ?config.output_metric_key,
            operation = ?config.window_operation,
            "creating new subreducer"
        );
        self.subreducers.push(Subreducer::new(config)?);
        Ok(())
    }

    /// Number of distinct input shapes after merging
    pub fn subreducer_count(&self) -> usize {
        self.subreducers.len()
    }

    pub fn subreducers(&self) -> &[Subreducer] {
        &self.subreducers
    }

    /// Route a batch to every subreducer
    pub fn add_points(&mut self, input: &AddPointsInput) {
        for subreducer in &mut self.subreducers {
            subreducer.add_points(input, &mut self.rng);
        }
    }

    /// Reduce every window seen so far
    ///
    /// Output order is not meaningful. Completing does not consume or reset
    /// any state, so repeated calls return the same points.
    pub fn complete(&self) -> CompleteOutput {
        let mut points = Vec::new();
        self.complete_into(&mut points);
        CompleteOutput { points }
    }

    /// Append the reduced points to `output`
    pub fn complete_into(&self, output: &mut Vec<SamplePoint>) {
        for subreducer in &self.subreducers {
            subreducer.complete_into(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::WindowOperation;

    fn config(op: WindowOperation, output: &str) -> RwrConfig {
        RwrConfig::new(op)
            .with_input_metric_key("k1")
            .with_output_metric_key(output)
            .with_window_size(1.0)
            .with_zero_for_empty_window(false)
    }

    #[test]
    fn test_merges_shared_input() {
        let configs = [
            config(WindowOperation::Sum, "sum"),
            config(WindowOperation::Mean, "mean"),
            config(WindowOperation::Count, "count").with_steps_per_window(2),
        ];
        let reducer = RollingWindowReducer::with_seed(&configs, 1).unwrap();
        assert_eq!(reducer.subreducer_count(), 2);
        assert_eq!(reducer.subreducers()[0].outputs().len(), 2);
    }

    #[test]
    fn test_invalid_config_index() {
        let configs = [
            config(WindowOperation::Sum, "sum"),
            config(WindowOperation::Sum, "bad").with_window_size(0.0),
        ];
        let err = RollingWindowReducer::new_merged(&configs).unwrap_err();
        match err {
            ReduceError::InvalidConfig { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, ConfigError::InvalidWindowSize);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_create_swallows_error() {
        assert!(RollingWindowReducer::create(&config(WindowOperation::Sum, "")).is_none());
        assert!(RollingWindowReducer::create(&config(WindowOperation::Sum, "ok")).is_some());
    }

    #[test]
    fn test_add_after_complete() {
        let mut reducer = RollingWindowReducer::with_seed(&[config(WindowOperation::Sum, "s")], 0).unwrap();
        reducer.add_points(&AddPointsInput::from_pairs("k1", &[(0.0, 1.0)]));
        let first = reducer.complete();
        assert_eq!(first, reducer.complete());

        reducer.add_points(&AddPointsInput::from_pairs("k1", &[(0.0, 2.0)]));
        let second = reducer.complete();
        assert_eq!(second.points, vec![SamplePoint::single(0.0, "s", 3.0)]);
    }
}
