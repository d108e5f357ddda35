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

//! # Ordo Telemetry
//!
//! Metrics for the cull, bin and draw pipeline: a registry of counters,
//! gauges and histograms over a pluggable storage backend, scoped timers,
//! and the per-bin collectors the pipeline reports into.

#![warn(missing_docs)]

pub mod collectors;
pub mod metrics;
pub mod storage;
pub mod utils;

pub use self::collectors::{BinCollector, CullCollectors, DropReason};
pub use self::metrics::{CounterHandle, GaugeHandle, HistogramHandle, MetricsRegistry};
pub use self::utils::timer::ScopedMetricTimer;
