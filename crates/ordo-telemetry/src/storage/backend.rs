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

//! Defines the `MetricsBackend` trait.

use ordo_core::telemetry::{
    metrics::MetricType, Metric, MetricId, MetricValue, MetricsError, MetricsResult,
};
use std::fmt::Debug;

/// Trait defining the interface for metrics storage backends.
pub trait MetricsBackend: Send + Sync + Debug + 'static {
    /// Stores a metric, replacing any metric with the same id.
    fn put_metric(&self, metric: Metric) -> MetricsResult<()>;

    /// Retrieves a copy of a metric by id.
    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric>;

    /// Checks if a metric exists.
    fn contains_metric(&self, id: &MetricId) -> bool;

    /// Returns a copy of every stored metric.
    fn list_all_metrics(&self) -> Vec<Metric>;

    /// Returns the number of metrics stored.
    fn metric_count(&self) -> usize;

    /// Applies `update` to the stored value of `id` atomically.
    fn modify(
        &self,
        id: &MetricId,
        update: &mut dyn FnMut(&mut MetricValue) -> MetricsResult<()>,
    ) -> MetricsResult<()>;

    // Convenience methods for common operations

    /// Increments a counter and returns its new value.
    fn increment_counter(&self, id: &MetricId, delta: u64) -> MetricsResult<u64> {
        let mut result = 0;
        self.modify(id, &mut |value| match value {
            MetricValue::Counter(count) => {
                *count = count.saturating_add(delta);
                result = *count;
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: other.metric_type(),
            }),
        })?;
        Ok(result)
    }

    /// Sets a gauge value.
    fn set_gauge(&self, id: &MetricId, new_value: f64) -> MetricsResult<()> {
        self.modify(id, &mut |value| match value {
            MetricValue::Gauge(gauge) => {
                *gauge = new_value;
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: other.metric_type(),
            }),
        })
    }

    /// Adds a sample to a histogram.
    fn record_histogram_sample(&self, id: &MetricId, sample: f64) -> MetricsResult<()> {
        self.modify(id, &mut |value| match value {
            MetricValue::Histogram {
                bucket_bounds,
                bucket_counts,
                count,
                sum,
            } => {
                let bucket = bucket_bounds
                    .iter()
                    .position(|bound| sample <= *bound)
                    .unwrap_or(bucket_bounds.len());
                bucket_counts[bucket] += 1;
                *count += 1;
                *sum += sample;
                Ok(())
            }
            other => Err(MetricsError::TypeMismatch {
                expected: MetricType::Histogram,
                found: other.metric_type(),
            }),
        })
    }
}
