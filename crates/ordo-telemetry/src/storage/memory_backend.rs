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

//! In-memory metrics storage.

use crate::storage::backend::MetricsBackend;
use ordo_core::telemetry::metrics::{Metric, MetricId, MetricValue, MetricsError, MetricsResult};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory metrics backend using `RwLock<HashMap>`.
///
/// Reads run concurrently; updates take the write lock for the duration of
/// one `modify` call.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    storage: RwLock<HashMap<MetricId, Metric>>,
}

impl InMemoryBackend {
    /// Create a new in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get metrics by namespace.
    pub fn get_metrics_by_namespace(&self, namespace: &str) -> Vec<Metric> {
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        storage
            .values()
            .filter(|metric| metric.id.namespace == namespace)
            .cloned()
            .collect()
    }
}

impl MetricsBackend for InMemoryBackend {
    fn put_metric(&self, metric: Metric) -> MetricsResult<()> {
        let mut storage = self.storage.write().unwrap_or_else(PoisonError::into_inner);
        storage.insert(metric.id.clone(), metric);
        Ok(())
    }

    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        storage
            .get(id)
            .cloned()
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))
    }

    fn contains_metric(&self, id: &MetricId) -> bool {
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        storage.contains_key(id)
    }

    fn list_all_metrics(&self) -> Vec<Metric> {
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        storage.values().cloned().collect()
    }

    fn metric_count(&self) -> usize {
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        storage.len()
    }

    fn modify(
        &self,
        id: &MetricId,
        update: &mut dyn FnMut(&mut MetricValue) -> MetricsResult<()>,
    ) -> MetricsResult<()> {
        let mut storage = self.storage.write().unwrap_or_else(PoisonError::into_inner);
        let metric = storage
            .get_mut(id)
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))?;
        update(&mut metric.value)
    }
}
