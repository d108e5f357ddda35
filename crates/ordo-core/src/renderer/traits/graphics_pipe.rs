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

use super::{GraphicsOutput, GraphicsStateGuardian};
use crate::renderer::api::{FrameBufferProperties, OutputRequest, OutputTypes};
use crate::renderer::error::PipeError;
use std::fmt::Debug;
use std::sync::Arc;

/// A factory for one graphics backend.
///
/// The pipe reports which kinds of output it can create and builds the
/// guardians and outputs for them. Pipes are selected by name at startup.
pub trait GraphicsPipe: Send + Sync + Debug {
    /// The name of the backend interface (e.g. `"Software"`).
    fn interface_name(&self) -> &str;

    /// Returns `false` if the backend could not be initialized on this system.
    fn is_valid(&self) -> bool;

    /// The output types this pipe can create.
    fn supported_types(&self) -> OutputTypes;

    /// Returns `true` if every type in `types` is supported.
    fn supports_type(&self, types: OutputTypes) -> bool {
        self.supported_types().contains(types)
    }

    /// The size of the display, in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Creates a guardian for the given framebuffer properties.
    ///
    /// `share_with` names an existing guardian whose resources the new one
    /// should share.
    ///
    /// # Errors
    ///
    /// Returns a [`PipeError`] if the pipe is invalid or the guardian to
    /// share with cannot be shared.
    fn make_gsg(
        &self,
        properties: &FrameBufferProperties,
        share_with: Option<&Arc<dyn GraphicsStateGuardian>>,
    ) -> Result<Arc<dyn GraphicsStateGuardian>, PipeError>;

    /// Releases a guardian created by this pipe. It becomes invalid.
    fn close_gsg(&self, gsg: &Arc<dyn GraphicsStateGuardian>);

    /// Creates an output drawing through `gsg`, or through a new guardian
    /// when `gsg` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`PipeError`] when no supported output type satisfies the
    /// request's flags, or when a new guardian is needed but
    /// `NO_NEW_GSG` is set.
    fn make_output(
        &self,
        request: &OutputRequest,
        gsg: Option<Arc<dyn GraphicsStateGuardian>>,
    ) -> Result<Box<dyn GraphicsOutput>, PipeError>;
}
