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

use ordo_core::renderer::{FrameContext, FrameMode, GraphicsOutput, GraphicsStateGuardian, OutputKind};
use std::sync::Arc;

/// A window or offscreen buffer of the software pipe. Only its bookkeeping
/// exists; frames are forwarded to the guardian.
#[derive(Debug)]
pub struct SoftwareOutput {
    name: String,
    size: (u32, u32),
    kind: OutputKind,
    gsg: Arc<dyn GraphicsStateGuardian>,
    frames_rendered: u64,
}

impl SoftwareOutput {
    /// Creates an output drawing through `gsg`.
    pub fn new(
        name: impl Into<String>,
        size: (u32, u32),
        kind: OutputKind,
        gsg: Arc<dyn GraphicsStateGuardian>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            kind,
            gsg,
            frames_rendered: 0,
        }
    }

    /// The number of frames completed in `Render` mode.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl GraphicsOutput for SoftwareOutput {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn kind(&self) -> OutputKind {
        self.kind
    }

    fn gsg(&self) -> &Arc<dyn GraphicsStateGuardian> {
        &self.gsg
    }

    fn is_valid(&self) -> bool {
        self.gsg.is_valid()
    }

    fn begin_frame(&mut self, mode: FrameMode, frame: &FrameContext) -> bool {
        if !self.is_valid() {
            return false;
        }
        match mode {
            FrameMode::Render => self.gsg.begin_frame(frame),
            FrameMode::Refresh => true,
        }
    }

    fn end_frame(&mut self, mode: FrameMode, frame: &FrameContext) {
        if mode == FrameMode::Render {
            self.gsg.end_frame(frame);
            self.frames_rendered += 1;
        }
    }
}
