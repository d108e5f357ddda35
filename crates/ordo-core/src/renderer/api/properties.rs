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

//! Defines `FrameBufferProperties`.

use serde::{Deserialize, Serialize};

/// The framebuffer a guardian is asked to render into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameBufferProperties {
    /// Bits per color channel.
    pub color_bits: u8,
    /// Bits of the alpha channel.
    pub alpha_bits: u8,
    /// Bits of the depth buffer.
    pub depth_bits: u8,
    /// Samples per pixel; `0` or `1` disables multisampling.
    pub multisamples: u32,
}

impl Default for FrameBufferProperties {
    fn default() -> Self {
        Self {
            color_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            multisamples: 0,
        }
    }
}

impl FrameBufferProperties {
    /// Returns a copy requesting `samples` samples per pixel.
    pub fn with_multisamples(mut self, samples: u32) -> Self {
        self.multisamples = samples;
        self
    }

    /// Returns `true` if more than one sample per pixel is requested.
    pub fn is_multisample(&self) -> bool {
        self.multisamples > 1
    }
}
