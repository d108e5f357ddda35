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

//! Provides RAII-based timers for automatically recording metrics.

use crate::metrics::registry::HistogramHandle;
use ordo_core::Stopwatch;

/// Times a scope and records the duration, in milliseconds, into a
/// histogram when dropped.
pub struct ScopedMetricTimer<'a> {
    stopwatch: Stopwatch,
    histogram: &'a HistogramHandle,
}

impl<'a> ScopedMetricTimer<'a> {
    /// Creates a new timer for the given histogram and starts it immediately.
    pub fn new(histogram: &'a HistogramHandle) -> Self {
        Self {
            stopwatch: Stopwatch::new(),
            histogram,
        }
    }
}

impl Drop for ScopedMetricTimer<'_> {
    fn drop(&mut self) {
        if let Some(elapsed_secs) = self.stopwatch.elapsed_secs_f64() {
            if let Err(e) = self.histogram.observe(elapsed_secs * 1000.0) {
                log::warn!("[ScopedMetricTimer] Failed to record metric: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsRegistry;
    use ordo_core::telemetry::MetricId;

    #[test]
    fn test_timer_records_on_drop() {
        let registry = MetricsRegistry::new();
        let histogram = registry
            .register_histogram(MetricId::new("test", "scope"), "", "ms", vec![1000.0])
            .unwrap();
        {
            let _timer = ScopedMetricTimer::new(&histogram);
        }
        assert_eq!(histogram.get_metric().unwrap().value.sample_count(), Some(1));
    }
}
