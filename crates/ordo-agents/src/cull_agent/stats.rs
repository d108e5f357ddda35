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

use std::time::Duration;

/// What happened during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// The frame number.
    pub frame_number: u64,
    /// Objects handed to the cull.
    pub submitted: usize,
    /// Copies admitted into bins (dual-pass splits count twice).
    pub admitted: usize,
    /// Objects left in bins after the end of cull.
    pub binned: usize,
    /// `false` if the output could not begin the frame.
    pub drawn: bool,
    /// Time spent admitting and sorting.
    pub cull_time: Duration,
    /// Time spent drawing.
    pub draw_time: Duration,
}

impl FrameStats {
    /// Admitted copies minus submitted objects: positive when dual-pass
    /// splits outnumber drops.
    pub fn admission_delta(&self) -> isize {
        self.admitted as isize - self.submitted as isize
    }
}
