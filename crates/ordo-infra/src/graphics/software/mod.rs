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

//! A CPU-only pipe that records what would have been drawn.
//!
//! The [`SoftwareGuardian`] keeps an ordered log of frame boundaries, state
//! changes and draw calls. It is the backend used by the tests and by the
//! sandbox when no other pipe is configured.

mod guardian;
mod output;
mod pipe;

pub use guardian::{DrawCommand, SoftwareGuardian};
pub use output::SoftwareOutput;
pub use pipe::SoftwarePipe;

/// The name the software pipe is registered under.
pub const PIPE_NAME: &str = "software";

/// The interface name reported by the software pipe and its guardians.
pub const INTERFACE_NAME: &str = "Software";
