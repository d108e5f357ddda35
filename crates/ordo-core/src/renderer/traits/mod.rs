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

//! Defines the core architectural traits for the rendering subsystem.
//!
//! - [`GraphicsPipe`]: a backend factory for guardians and outputs.
//! - [`GraphicsStateGuardian`]: owns backend state and executes draw calls.
//! - [`GraphicsOutput`]: a window or buffer a frame is drawn into.

mod graphics_output;
mod graphics_pipe;
mod graphics_state_guardian;

pub use self::graphics_output::GraphicsOutput;
pub use self::graphics_pipe::GraphicsPipe;
pub use self::graphics_state_guardian::GraphicsStateGuardian;
