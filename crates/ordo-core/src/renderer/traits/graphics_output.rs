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

use super::GraphicsStateGuardian;
use crate::renderer::api::{FrameContext, FrameMode, OutputKind};
use std::fmt::Debug;
use std::sync::Arc;

/// A window or buffer that frames are drawn into.
pub trait GraphicsOutput: Send + Debug {
    /// The output name.
    fn name(&self) -> &str;

    /// The size in pixels.
    fn size(&self) -> (u32, u32);

    /// Whether this is a window or a buffer.
    fn kind(&self) -> OutputKind;

    /// The guardian drawing into this output.
    fn gsg(&self) -> &Arc<dyn GraphicsStateGuardian>;

    /// Returns `true` while the output and its guardian are usable.
    fn is_valid(&self) -> bool;

    /// Starts a frame. Returns `false` if nothing should be drawn.
    fn begin_frame(&mut self, mode: FrameMode, frame: &FrameContext) -> bool;

    /// Finishes the frame started with [`Self::begin_frame`].
    fn end_frame(&mut self, mode: FrameMode, frame: &FrameContext);
}
