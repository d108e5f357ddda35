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

//! Defines `Stopwatch`, a restartable wall-clock timer.

use std::time::{Duration, Instant};

/// Measures elapsed wall-clock time from its last start.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Option<Instant>,
    stopped: Option<Duration>,
}

impl Stopwatch {
    /// Creates a running stopwatch.
    pub fn new() -> Self {
        Self {
            started: Some(Instant::now()),
            stopped: None,
        }
    }

    /// Restarts the stopwatch from zero.
    pub fn restart(&mut self) {
        self.started = Some(Instant::now());
        self.stopped = None;
    }

    /// Freezes the elapsed time.
    pub fn stop(&mut self) {
        if self.stopped.is_none() {
            self.stopped = self.started.map(|start| start.elapsed());
        }
    }

    /// The elapsed time, or `None` if the stopwatch never started.
    pub fn elapsed(&self) -> Option<Duration> {
        self.stopped.or_else(|| self.started.map(|start| start.elapsed()))
    }

    /// The elapsed time in seconds.
    pub fn elapsed_secs_f64(&self) -> Option<f64> {
        self.elapsed().map(|d| d.as_secs_f64())
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}
