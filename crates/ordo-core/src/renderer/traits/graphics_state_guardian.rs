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

use crate::geom::{Geom, GeomMunger};
use crate::math::Mat4;
use crate::renderer::api::{AdapterInfo, FrameContext};
use crate::renderer::error::RenderError;
use crate::state::RenderState;
use std::fmt::Debug;
use std::sync::Arc;

/// The backend object that owns rendering state and executes draw calls.
///
/// Bins hold a shared handle to the guardian and submit their objects to it
/// in draw order. A guardian is created by a [`GraphicsPipe`](super::GraphicsPipe)
/// and stays valid until the pipe closes it.
pub trait GraphicsStateGuardian: Send + Sync + Debug + 'static {
    /// Returns `true` while the guardian can accept work.
    fn is_valid(&self) -> bool;

    /// Describes the backend behind this guardian.
    fn adapter_info(&self) -> AdapterInfo;

    /// Returns `true` if multisample transparency is available.
    ///
    /// When it is not, multisample transparency is rewritten to binary
    /// transparency during cull.
    fn supports_multisample(&self) -> bool;

    /// Creates the geometry adaptation this backend wants for `state`.
    fn make_geom_munger(&self, state: &RenderState) -> GeomMunger;

    /// Prepares a frame. Returns `false` if the frame cannot be drawn.
    fn begin_frame(&self, frame: &FrameContext) -> bool;

    /// Finishes a frame started with [`Self::begin_frame`].
    fn end_frame(&self, frame: &FrameContext);

    /// Prepares a scene inside the current frame. Returns `false` to skip it.
    fn begin_scene(&self) -> bool {
        true
    }

    /// Finishes the scene started with [`Self::begin_scene`].
    fn end_scene(&self) {}

    /// Sets the render state and model-to-world transform for the next draw calls.
    fn set_state_and_transform(&self, state: &Arc<RenderState>, transform: &Mat4);

    /// Draws `geom` with the current state and transform.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the backend rejects the call.
    fn draw_geom(&self, geom: &Geom, frame: &FrameContext) -> Result<(), RenderError>;
}
