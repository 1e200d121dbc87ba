//! Sample records consumed and produced by the reducer
//!
//! A [`SamplePoint`] is one x-coordinate carrying any number of keyed metric
//! values; a [`SampleError`] is a sampler failure observed at an
//! x-coordinate. Reduced output is again a list of sample points, each with
//! exactly one keyed value.

use serde::{Deserialize, Serialize};

/// A metric value tagged with its key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedValue {
    pub value_key: String,
    pub value: f64,
}

impl KeyedValue {
    pub fn new(value_key: impl Into<String>, value: f64) -> Self {
        Self {
            value_key: value_key.into(),
            value,
        }
    }
}

/// Metric values observed at one x-coordinate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SamplePoint {
    pub input_value: f64,
    #[serde(default)]
    pub metric_values: Vec<KeyedValue>,
}

impl SamplePoint {
    /// A point with no metric values yet
    pub fn new(input_value: f64) -> Self {
        Self {
            input_value,
            metric_values: Vec::new(),
        }
    }

    /// A point with a single metric value
    pub fn single(input_value: f64, value_key: impl Into<String>, value: f64) -> Self {
        Self::new(input_value).with_value(value_key, value)
    }

    /// Append a metric value
    pub fn with_value(mut self, value_key: impl Into<String>, value: f64) -> Self {
        self.metric_values.push(KeyedValue::new(value_key, value));
        self
    }
}

/// A sampler error observed at one x-coordinate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleError {
    pub input_value: f64,
    pub sampler_name: String,
    #[serde(default)]
    pub error_message: String,
}

impl SampleError {
    pub fn new(
        input_value: f64,
        sampler_name: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            input_value,
            sampler_name: sampler_name.into(),
            error_message: error_message.into(),
        }
    }

    /// Approximate encoded size in bytes, used for batch budgeting
    pub fn encoded_len(&self) -> usize {
        core::mem::size_of::<f64>() + self.sampler_name.len() + self.error_message.len()
    }
}

/// One record of a sample file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleRecord {
    SamplePoint(SamplePoint),
    SampleError(SampleError),
}

impl From<SamplePoint> for SampleRecord {
    fn from(point: SamplePoint) -> Self {
        SampleRecord::SamplePoint(point)
    }
}

impl From<SampleError> for SampleRecord {
    fn from(error: SampleError) -> Self {
        SampleRecord::SampleError(error)
    }
}

/// A batch of points and errors handed to
/// [`RollingWindowReducer::add_points`](crate::reducer::RollingWindowReducer::add_points)
///
/// Batches should be as large as memory allows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AddPointsInput {
    #[serde(default)]
    pub points: Vec<SamplePoint>,
    #[serde(default)]
    pub errors: Vec<SampleError>,
}

impl AddPointsInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch of single-valued points sharing one metric key
    pub fn from_pairs(value_key: &str, pairs: &[(f64, f64)]) -> Self {
        Self {
            points: pairs
                .iter()
                .map(|&(x, y)| SamplePoint::single(x, value_key, y))
                .collect(),
            errors: Vec::new(),
        }
    }

    /// A batch of errors from one sampler, with empty messages
    pub fn from_errors(sampler_name: &str, input_values: &[f64]) -> Self {
        Self {
            points: Vec::new(),
            errors: input_values
                .iter()
                .map(|&x| SampleError::new(x, sampler_name, ""))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.errors.clear();
    }
}

/// Points produced by
/// [`RollingWindowReducer::complete`](crate::reducer::RollingWindowReducer::complete)
///
/// Each point has the window location as x and exactly one keyed value.
/// Ordering is not meaningful.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompleteOutput {
    pub points: Vec<SamplePoint>,
}

impl CompleteOutput {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Output points carrying the given metric key
    pub fn with_key<'a>(&'a self, value_key: &'a str) -> impl Iterator<Item = &'a SamplePoint> {
        self.points.iter().filter(move |p| {
            p.metric_values
                .first()
                .map_or(false, |kv| kv.value_key == value_key)
        })
    }
}
