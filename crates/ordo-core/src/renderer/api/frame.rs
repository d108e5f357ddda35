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

//! Per-frame context passed through the cull and draw calls.

use crate::math::{Mat4, Vec3};

/// The thread role a pipeline call runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadRole {
    /// The application thread.
    App,
    /// The cull thread.
    Cull,
    /// The draw thread.
    Draw,
}

impl ThreadRole {
    /// A short name for logs.
    pub fn name(self) -> &'static str {
        match self {
            ThreadRole::App => "app",
            ThreadRole::Cull => "cull",
            ThreadRole::Draw => "draw",
        }
    }
}

/// Identifies the thread, pipeline stage and frame of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameContext {
    /// The frame being produced.
    pub frame_number: u64,
    /// The thread the call runs on.
    pub thread: ThreadRole,
    /// The pipeline stage; `0` when the pipeline is not staged.
    pub pipeline_stage: u32,
}

impl FrameContext {
    /// A context on the application thread, stage 0.
    pub fn new(frame_number: u64) -> Self {
        Self {
            frame_number,
            thread: ThreadRole::App,
            pipeline_stage: 0,
        }
    }

    /// Returns a copy for another thread role.
    pub fn on(mut self, thread: ThreadRole) -> Self {
        self.thread = thread;
        self
    }
}

/// Whether a frame is rendered from scratch or redisplayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// A full render.
    Render,
    /// Redisplay the last frame only.
    Refresh,
}

/// The camera data needed at the end of cull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSetup {
    /// Transforms world space into view space (camera at the origin, looking down `-Z`).
    pub world_to_view: Mat4,
}

impl SceneSetup {
    /// A scene setup with the given world-to-view transform.
    pub fn new(world_to_view: Mat4) -> Self {
        Self { world_to_view }
    }

    /// The distance in front of the camera of a world-space point. Larger is farther.
    pub fn view_depth(&self, world_point: Vec3) -> f32 {
        -self.world_to_view.transform_point(world_point).z
    }
}

impl Default for SceneSetup {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_depth_grows_away_from_camera() {
        let setup = SceneSetup::new(Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0)));
        assert_eq!(setup.view_depth(Vec3::new(0.0, 0.0, 0.0)), 2.0);
        assert_eq!(setup.view_depth(Vec3::new(0.0, 0.0, -3.0)), 5.0);
    }

    #[test]
    fn test_thread_role_names() {
        let ctx = FrameContext::new(4).on(ThreadRole::Draw);
        assert_eq!(ctx.thread.name(), "draw");
        assert_eq!(ctx.frame_number, 4);
    }
}
