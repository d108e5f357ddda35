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

//! A minimal recording guardian for the unit tests of this lane.

use super::CullableObject;
use ordo_core::geom::{Geom, GeomId, GeomMunger, VertexFormat};
use ordo_core::math::{Mat4, Vec3};
use ordo_core::renderer::{AdapterInfo, FrameContext, GraphicsStateGuardian, RenderError};
use ordo_core::state::RenderState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct RecordingGsg {
    multisample: bool,
    failing: bool,
    drawn: Mutex<Vec<u64>>,
    state_changes: AtomicUsize,
    mungers_made: AtomicUsize,
}

impl RecordingGsg {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn multisample() -> Self {
        Self {
            multisample: true,
            ..Self::default()
        }
    }

    pub fn drawn(&self) -> Vec<u64> {
        self.drawn.lock().unwrap().clone()
    }

    pub fn state_changes(&self) -> usize {
        self.state_changes.load(Ordering::SeqCst)
    }

    pub fn mungers_made(&self) -> usize {
        self.mungers_made.load(Ordering::SeqCst)
    }
}

impl GraphicsStateGuardian for RecordingGsg {
    fn is_valid(&self) -> bool {
        true
    }

    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo {
            name: "recording".to_owned(),
            interface_name: "Test".to_owned(),
        }
    }

    fn supports_multisample(&self) -> bool {
        self.multisample
    }

    fn make_geom_munger(&self, _state: &RenderState) -> GeomMunger {
        self.mungers_made.fetch_add(1, Ordering::SeqCst);
        GeomMunger::new(VertexFormat::POSITION, VertexFormat::empty())
    }

    fn begin_frame(&self, _frame: &FrameContext) -> bool {
        true
    }

    fn end_frame(&self, _frame: &FrameContext) {}

    fn set_state_and_transform(&self, _state: &Arc<RenderState>, _transform: &Mat4) {
        self.state_changes.fetch_add(1, Ordering::SeqCst);
    }

    fn draw_geom(&self, geom: &Geom, _frame: &FrameContext) -> Result<(), RenderError> {
        if self.failing {
            return Err(RenderError::DrawFailed {
                geom: geom.id(),
                reason: "test failure".to_owned(),
            });
        }
        self.drawn.lock().unwrap().push(geom.id().0);
        Ok(())
    }
}

/// An object whose bounds center sits at `(0, 0, z)` in world space.
pub fn object_at(id: u64, z: f32, state: Arc<RenderState>) -> CullableObject {
    let geom = Geom::new(GeomId(id), VertexFormat::POSITION, 3)
        .with_bounds_center(Vec3::new(0.0, 0.0, z));
    CullableObject::new(Arc::new(geom), state, Mat4::IDENTITY)
}
