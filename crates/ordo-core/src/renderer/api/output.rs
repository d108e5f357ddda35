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

//! Requests for new graphics outputs.

use super::{BufferCreationFlags, FrameBufferProperties, OutputTypes};

/// What kind of output a [`GraphicsOutput`](crate::renderer::GraphicsOutput) is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// A window.
    Window,
    /// An offscreen buffer.
    Buffer,
}

impl OutputKind {
    /// The output type flag for this kind.
    pub fn output_type(self) -> OutputTypes {
        match self {
            OutputKind::Window => OutputTypes::WINDOW,
            OutputKind::Buffer => OutputTypes::BUFFER,
        }
    }
}

/// Parameters for [`GraphicsPipe::make_output`](crate::renderer::GraphicsPipe::make_output).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRequest {
    /// A name for the output, used in logs.
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Creation constraints.
    pub flags: BufferCreationFlags,
    /// The framebuffer to request.
    pub properties: FrameBufferProperties,
}

impl OutputRequest {
    /// A request for an output of the given size with default properties.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            flags: BufferCreationFlags::empty(),
            properties: FrameBufferProperties::default(),
        }
    }

    /// Sets the creation constraints.
    pub fn with_flags(mut self, flags: BufferCreationFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the framebuffer properties.
    pub fn with_properties(mut self, properties: FrameBufferProperties) -> Self {
        self.properties = properties;
        self
    }
}
