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

//! Output type and buffer creation flags negotiated with a graphics pipe.

use bitflags::bitflags;

bitflags! {
    /// The kinds of output a pipe can create.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OutputTypes: u32 {
        /// An on-screen window.
        const WINDOW = 0x0001;
        /// A window covering the whole display.
        const FULLSCREEN_WINDOW = 0x0002;
        /// An offscreen buffer.
        const BUFFER = 0x0004;
        /// An offscreen buffer that renders directly into a texture.
        const TEXTURE_BUFFER = 0x0008;
    }
}

bitflags! {
    /// Constraints on how an output may be created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BufferCreationFlags: u32 {
        /// Never create a window, even a hidden one.
        const REFUSE_WINDOW = 0x0001;
        /// Only a window is acceptable.
        const REQUIRE_WINDOW = 0x0002;
        /// Fail rather than create a new guardian.
        const NO_NEW_GSG = 0x0004;
        /// Resize the output whenever its host resizes.
        const SIZE_TRACK_HOST = 0x0008;
    }
}

impl BufferCreationFlags {
    /// The output types acceptable under these constraints.
    pub fn acceptable_types(self) -> OutputTypes {
        if self.contains(BufferCreationFlags::REQUIRE_WINDOW) {
            OutputTypes::WINDOW | OutputTypes::FULLSCREEN_WINDOW
        } else if self.contains(BufferCreationFlags::REFUSE_WINDOW) {
            OutputTypes::BUFFER | OutputTypes::TEXTURE_BUFFER
        } else {
            OutputTypes::all()
        }
    }
}
