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

//! Performance collectors for the cull and draw phases.
//!
//! A [`CullCollectors`] is shared by a cull result and every bin it creates.
//! Each bin receives a [`BinCollector`] labelled with its name.

use crate::metrics::{CounterHandle, HistogramHandle, MetricsRegistry};
use crate::utils::timer::ScopedMetricTimer;
use ordo_core::telemetry::{MetricId, MetricsResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Namespace of cull-phase metrics.
pub const CULL_NAMESPACE: &str = "cull";
/// Namespace of draw-phase metrics.
pub const DRAW_NAMESPACE: &str = "draw";

/// Draw-time histogram buckets, in milliseconds.
const DRAW_TIME_BUCKETS_MS: [f64; 6] = [0.05, 0.1, 0.5, 1.0, 5.0, 16.0];

/// Why an object was not admitted into a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Its geometry was not resident and incomplete renders are allowed.
    NotResident,
    /// The backend could not adapt its geometry.
    MungeFailed,
    /// It was the opaque half of a dual-pass split with that half disabled.
    DualOpaqueDisabled,
}

/// Per-bin counters and the draw-time histogram.
#[derive(Debug, Clone)]
pub struct BinCollector {
    bin: String,
    admitted: CounterHandle,
    drawn: CounterHandle,
    draw_time: HistogramHandle,
}

impl BinCollector {
    fn register(registry: &MetricsRegistry, bin: &str) -> MetricsResult<Self> {
        let admitted = registry.register_counter(
            MetricId::new(CULL_NAMESPACE, "objects_admitted").with_label("bin", bin),
            "Objects admitted into the bin",
        )?;
        let drawn = registry.register_counter(
            MetricId::new(DRAW_NAMESPACE, "objects_drawn").with_label("bin", bin),
            "Objects drawn from the bin",
        )?;
        let draw_time = registry.register_histogram(
            MetricId::new(DRAW_NAMESPACE, "bin_draw_time").with_label("bin", bin),
            "Time spent drawing the bin",
            "ms",
            DRAW_TIME_BUCKETS_MS.to_vec(),
        )?;
        Ok(Self {
            bin: bin.to_owned(),
            admitted,
            drawn,
            draw_time,
        })
    }

    /// The bin name this collector reports for.
    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Records one admitted object.
    pub fn record_admitted(&self) {
        if let Err(e) = self.admitted.increment() {
            log::warn!("Failed to record admission for bin '{}': {e}", self.bin);
        }
    }

    /// Records `count` drawn objects.
    pub fn record_drawn(&self, count: usize) {
        if let Err(e) = self.drawn.increment_by(count as u64) {
            log::warn!("Failed to record draws for bin '{}': {e}", self.bin);
        }
    }

    /// Starts timing a bin draw; the sample is recorded when the guard drops.
    pub fn draw_timer(&self) -> ScopedMetricTimer<'_> {
        ScopedMetricTimer::new(&self.draw_time)
    }

    /// The number of objects admitted so far.
    pub fn admitted(&self) -> u64 {
        self.admitted.get().unwrap_or(0)
    }

    /// The number of objects drawn so far.
    pub fn drawn(&self) -> u64 {
        self.drawn.get().unwrap_or(0)
    }
}

/// The collectors of one cull pipeline, shared across frames.
#[derive(Debug, Clone)]
pub struct CullCollectors {
    registry: Arc<MetricsRegistry>,
    not_resident: CounterHandle,
    munge_failed: CounterHandle,
    dual_opaque_disabled: CounterHandle,
    dual_splits: CounterHandle,
    bins: Arc<Mutex<HashMap<String, BinCollector>>>,
}

impl CullCollectors {
    /// Registers the pipeline-wide counters in `registry`.
    pub fn new(registry: Arc<MetricsRegistry>) -> MetricsResult<Self> {
        let dropped = |reason: &str| {
            registry.register_counter(
                MetricId::new(CULL_NAMESPACE, "objects_dropped").with_label("reason", reason),
                "Objects skipped during cull",
            )
        };
        let not_resident = dropped("not_resident")?;
        let munge_failed = dropped("munge_failed")?;
        let dual_opaque_disabled = dropped("dual_opaque_disabled")?;
        let dual_splits = registry.register_counter(
            MetricId::new(CULL_NAMESPACE, "dual_splits"),
            "Objects split into two dual-pass copies",
        )?;
        Ok(Self {
            registry,
            not_resident,
            munge_failed,
            dual_opaque_disabled,
            dual_splits,
            bins: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// The registry the collectors report into.
    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    /// Returns the collector for `bin`, registering its metrics on first use.
    pub fn bin_collector(&self, bin: &str) -> MetricsResult<BinCollector> {
        let mut bins = self.bins.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(collector) = bins.get(bin) {
            return Ok(collector.clone());
        }
        let collector = BinCollector::register(&self.registry, bin)?;
        bins.insert(bin.to_owned(), collector.clone());
        Ok(collector)
    }

    /// Records an object that was not admitted.
    pub fn record_drop(&self, reason: DropReason) {
        let counter = match reason {
            DropReason::NotResident => &self.not_resident,
            DropReason::MungeFailed => &self.munge_failed,
            DropReason::DualOpaqueDisabled => &self.dual_opaque_disabled,
        };
        if let Err(e) = counter.increment() {
            log::warn!("Failed to record dropped object ({reason:?}): {e}");
        }
    }

    /// Records one dual-pass split.
    pub fn record_dual_split(&self) {
        if let Err(e) = self.dual_splits.increment() {
            log::warn!("Failed to record dual split: {e}");
        }
    }

    /// The number of objects dropped for `reason` so far.
    pub fn dropped(&self, reason: DropReason) -> u64 {
        let counter = match reason {
            DropReason::NotResident => &self.not_resident,
            DropReason::MungeFailed => &self.munge_failed,
            DropReason::DualOpaqueDisabled => &self.dual_opaque_disabled,
        };
        counter.get().unwrap_or(0)
    }

    /// The number of dual-pass splits so far.
    pub fn dual_splits(&self) -> u64 {
        self.dual_splits.get().unwrap_or(0)
    }
}
