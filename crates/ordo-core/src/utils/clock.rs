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

//! The frame time source used for debug flashing.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// A source of frame time, in seconds.
pub trait FrameClock: Send + Sync + Debug {
    /// The time of the current frame, in seconds.
    fn frame_time(&self) -> f64;

    /// The flash cycle at `rate` flashes per second: `floor(frame_time * rate)`.
    fn flash_cycle(&self, rate: f64) -> i64 {
        (self.frame_time() * rate).floor() as i64
    }
}

/// A clock that only moves when told to. Used in tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    seconds: AtomicU64,
}

impl ManualClock {
    /// A clock reading `seconds`.
    pub fn new(seconds: f64) -> Self {
        Self {
            seconds: AtomicU64::new(seconds.to_bits()),
        }
    }

    /// Sets the current time.
    pub fn set(&self, seconds: f64) {
        self.seconds.store(seconds.to_bits(), Ordering::Release);
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        self.set(self.frame_time() + seconds);
    }
}

impl FrameClock for ManualClock {
    fn frame_time(&self) -> f64 {
        f64::from_bits(self.seconds.load(Ordering::Acquire))
    }
}
