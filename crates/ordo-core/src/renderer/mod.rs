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

//! Provides the backend-agnostic contracts between the cull pipeline and a
//! graphics backend.
//!
//! A [`GraphicsPipe`] is a factory for one backend. It creates
//! [`GraphicsStateGuardian`]s, which own the backend state and execute draw
//! calls, and [`GraphicsOutput`]s, the windows and buffers frames are drawn
//! into. Concrete pipes live in the infra crate; the lanes and agents only
//! talk to these traits.

pub mod api;
pub mod error;
pub mod traits;

pub use self::api::*;
pub use self::error::{MungeError, PipeError, RenderError};
pub use self::traits::{GraphicsOutput, GraphicsPipe, GraphicsStateGuardian};
