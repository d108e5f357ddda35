// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Abstract definitions for pipeline metrics.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A unique, structured identifier for a metric.
///
/// A `MetricId` is composed of a namespace, a name, and a set of key-value
/// labels (e.g. `cull:objects_admitted[bin=opaque]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricId {
    /// The broad category of the metric (e.g., "cull", "draw").
    pub namespace: String,
    /// The specific name of the metric (e.g., "objects_admitted").
    pub name: String,
    /// Sorted key-value pairs for dimensional filtering.
    pub labels: Vec<(String, String)>,
}

impl MetricId {
    /// Creates a new `MetricId` with a namespace and a name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            labels: Vec::new(),
        }
    }

    /// Adds a dimensional label to the metric ID, returning a new `MetricId`.
    /// Labels are kept sorted by key for consistent hashing and display.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self.labels.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)?;
        if !self.labels.is_empty() {
            let labels = self
                .labels
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "[{labels}]")?;
        }
        Ok(())
    }
}

/// The fundamental type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// A value that only ever increases or resets to zero.
    Counter,
    /// A value that can go up or down.
    Gauge,
    /// The distribution of a set of measurements.
    Histogram,
}

/// An enumeration of possible metric values.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// A 64-bit unsigned integer for counters.
    Counter(u64),
    /// A 64-bit float for gauges.
    Gauge(f64),
    /// Sample counts per bucket.
    Histogram {
        /// The upper bounds of the histogram buckets.
        bucket_bounds: Vec<f64>,
        /// The count of samples within each bucket; one extra overflow bucket at the end.
        bucket_counts: Vec<u64>,
        /// The number of samples recorded.
        count: u64,
        /// The sum of every sample recorded.
        sum: f64,
    },
}

impl MetricValue {
    /// Returns the [`MetricType`] corresponding to this value.
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricValue::Counter(_) => MetricType::Counter,
            MetricValue::Gauge(_) => MetricType::Gauge,
            MetricValue::Histogram { .. } => MetricType::Histogram,
        }
    }

    /// Returns the value as a `u64` if it is a `Counter`.
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            MetricValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is a `Gauge`.
    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number of samples if it is a `Histogram`.
    pub fn sample_count(&self) -> Option<u64> {
        match self {
            MetricValue::Histogram { count, .. } => Some(*count),
            _ => None,
        }
    }
}

/// A metric: its identifier, description and current value.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric's unique identifier.
    pub id: MetricId,
    /// A human-readable description of what the metric measures.
    pub description: String,
    /// The unit of measurement (e.g., "ms", "objects").
    pub unit: String,
    /// The current value of the metric.
    pub value: MetricValue,
}

impl Metric {
    /// A convenience constructor for creating a new `Counter` metric.
    pub fn new_counter(id: MetricId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            unit: "count".to_owned(),
            value: MetricValue::Counter(0),
        }
    }

    /// A convenience constructor for creating a new `Gauge` metric.
    pub fn new_gauge(id: MetricId, description: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            unit: unit.into(),
            value: MetricValue::Gauge(0.0),
        }
    }

    /// A convenience constructor for creating a new `Histogram` metric.
    pub fn new_histogram(
        id: MetricId,
        description: impl Into<String>,
        unit: impl Into<String>,
        bucket_bounds: Vec<f64>,
    ) -> Self {
        let bucket_counts = vec![0; bucket_bounds.len() + 1];
        Self {
            id,
            description: description.into(),
            unit: unit.into(),
            value: MetricValue::Histogram {
                bucket_bounds,
                bucket_counts,
                count: 0,
                sum: 0.0,
            },
        }
    }
}

/// A specialized `Result` type for metric-related operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// An error that can occur within the metrics system.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// The requested metric was not found in the registry.
    MetricNotFound(MetricId),
    /// An operation was attempted on a metric of the wrong type.
    TypeMismatch {
        /// The expected metric type for the operation.
        expected: MetricType,
        /// The actual metric type that was found.
        found: MetricType,
    },
    /// An invalid operation was attempted (e.g., unsorted histogram bounds).
    InvalidOperation(String),
}

impl Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::MetricNotFound(id) => write!(f, "Metric not found: {id}"),
            MetricsError::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {expected:?}, found {found:?}")
            }
            MetricsError::InvalidOperation(msg) => write!(f, "Invalid operation: {msg}"),
        }
    }
}

impl std::error::Error for MetricsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_id_labels_are_sorted() {
        let id = MetricId::new("cull", "objects_admitted")
            .with_label("stage", "0")
            .with_label("bin", "opaque");
        assert_eq!(id.labels[0], ("bin".to_string(), "opaque".to_string()));
        assert_eq!(id.to_string(), "cull:objects_admitted[bin=opaque,stage=0]");
        assert_eq!(MetricId::new("draw", "objects").to_string(), "draw:objects");
    }

    #[test]
    fn test_histogram_has_overflow_bucket() {
        let metric = Metric::new_histogram(MetricId::new("draw", "time"), "", "ms", vec![1.0, 2.0]);
        match metric.value {
            MetricValue::Histogram { bucket_counts, .. } => assert_eq!(bucket_counts.len(), 3),
            other => panic!("unexpected value {other:?}"),
        }
    }
}
