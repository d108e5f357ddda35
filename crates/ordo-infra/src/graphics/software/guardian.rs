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

use super::INTERFACE_NAME;
use ordo_core::geom::{Geom, GeomId, GeomMunger, VertexFormat};
use ordo_core::math::Mat4;
use ordo_core::renderer::{
    AdapterInfo, FrameBufferProperties, FrameContext, GraphicsStateGuardian, RenderError,
};
use ordo_core::state::{RenderState, StateId};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One entry of the software guardian's draw log.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// A frame began.
    BeginFrame(u64),
    /// The state and transform for the following draws changed.
    SetState {
        /// The interned state.
        state: StateId,
        /// The model-to-world transform.
        transform: Mat4,
    },
    /// A geometry was drawn.
    Draw {
        /// The geometry.
        geom: GeomId,
        /// The vertex columns actually submitted.
        format: VertexFormat,
        /// The number of vertices.
        vertex_count: u32,
    },
    /// A frame ended.
    EndFrame(u64),
}

/// A guardian that draws nothing and records everything.
#[derive(Debug)]
pub struct SoftwareGuardian {
    properties: FrameBufferProperties,
    multisample: bool,
    valid: AtomicBool,
    in_frame: AtomicBool,
    failing_geom: AtomicU64,
    log: Mutex<Vec<DrawCommand>>,
}

const NO_FAILING_GEOM: u64 = u64::MAX;

impl SoftwareGuardian {
    /// Creates a guardian. Multisampling is available only if the pipe can
    /// do it and the properties ask for it.
    pub fn new(properties: FrameBufferProperties, pipe_multisample: bool) -> Self {
        Self {
            multisample: pipe_multisample && properties.is_multisample(),
            properties,
            valid: AtomicBool::new(true),
            in_frame: AtomicBool::new(false),
            failing_geom: AtomicU64::new(NO_FAILING_GEOM),
            log: Mutex::new(Vec::new()),
        }
    }

    fn log(&self) -> MutexGuard<'_, Vec<DrawCommand>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The properties the guardian was created with.
    pub fn properties(&self) -> &FrameBufferProperties {
        &self.properties
    }

    /// Marks the guardian as released. Frames can no longer begin.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }

    /// Makes every draw of `geom` fail, for exercising error paths.
    pub fn fail_on(&self, geom: Option<GeomId>) {
        self.failing_geom
            .store(geom.map_or(NO_FAILING_GEOM, |id| id.0), Ordering::Relaxed);
    }

    /// A copy of the draw log.
    pub fn draw_log(&self) -> Vec<DrawCommand> {
        self.log().clone()
    }

    /// Empties the draw log and returns its contents.
    pub fn take_draw_log(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut *self.log())
    }

    /// The geometries drawn so far, in order.
    pub fn drawn_geoms(&self) -> Vec<GeomId> {
        self.log()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Draw { geom, .. } => Some(*geom),
                _ => None,
            })
            .collect()
    }
}

impl GraphicsStateGuardian for SoftwareGuardian {
    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo {
            name: "Software Rasterizer".to_owned(),
            interface_name: INTERFACE_NAME.to_owned(),
        }
    }

    fn supports_multisample(&self) -> bool {
        self.multisample
    }

    fn make_geom_munger(&self, state: &RenderState) -> GeomMunger {
        let mut stripped = VertexFormat::empty();
        if state.color().is_some_and(|color| !color.uses_vertex_color()) {
            stripped |= VertexFormat::COLOR;
        }
        if state.texture().is_none_or(|texture| texture.is_off()) {
            stripped |= VertexFormat::TEXCOORD;
        }
        if state.light().is_none_or(|light| light.is_off()) {
            stripped |= VertexFormat::NORMAL;
        }
        GeomMunger::new(VertexFormat::POSITION, stripped)
    }

    fn begin_frame(&self, frame: &FrameContext) -> bool {
        if !self.is_valid() {
            log::warn!("Frame {} not started: guardian was closed", frame.frame_number);
            return false;
        }
        self.in_frame.store(true, Ordering::Release);
        self.log().push(DrawCommand::BeginFrame(frame.frame_number));
        true
    }

    fn end_frame(&self, frame: &FrameContext) {
        self.in_frame.store(false, Ordering::Release);
        self.log().push(DrawCommand::EndFrame(frame.frame_number));
    }

    fn set_state_and_transform(&self, state: &Arc<RenderState>, transform: &Mat4) {
        self.log().push(DrawCommand::SetState {
            state: state.id(),
            transform: *transform,
        });
    }

    fn draw_geom(&self, geom: &Geom, _frame: &FrameContext) -> Result<(), RenderError> {
        if !self.is_valid() {
            return Err(RenderError::InvalidGuardian);
        }
        if !self.in_frame.load(Ordering::Acquire) {
            return Err(RenderError::NotInFrame);
        }
        if geom.id().0 == self.failing_geom.load(Ordering::Relaxed) {
            return Err(RenderError::DrawFailed {
                geom: geom.id(),
                reason: "rejected by the software rasterizer".to_owned(),
            });
        }
        self.log().push(DrawCommand::Draw {
            geom: geom.id(),
            format: geom.format(),
            vertex_count: geom.vertex_count(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_core::state::{
        ColorAttrib, LightAttrib, LightId, RenderAttrib, TextureAttrib, TextureId,
    };

    fn frame() -> FrameContext {
        FrameContext::new(1)
    }

    #[test]
    fn test_multisample_needs_pipe_and_properties() {
        let ms = FrameBufferProperties::default().with_multisamples(4);
        assert!(SoftwareGuardian::new(ms, true).supports_multisample());
        assert!(!SoftwareGuardian::new(ms, false).supports_multisample());
        assert!(!SoftwareGuardian::new(FrameBufferProperties::default(), true).supports_multisample());
    }

    #[test]
    fn test_munger_strips_unused_columns() {
        let gsg = SoftwareGuardian::new(FrameBufferProperties::default(), false);
        let bare = gsg.make_geom_munger(&RenderState::empty());
        assert_eq!(bare.required(), VertexFormat::POSITION);
        assert_eq!(bare.stripped(), VertexFormat::TEXCOORD | VertexFormat::NORMAL);

        let full = RenderState::make([
            RenderAttrib::Color(ColorAttrib::Flat(ordo_core::math::LinearRgba::RED)),
            RenderAttrib::Texture(TextureAttrib::new([TextureId(1)])),
            RenderAttrib::Light(LightAttrib::new([LightId(1)])),
        ]);
        assert_eq!(gsg.make_geom_munger(&full).stripped(), VertexFormat::COLOR);
    }

    #[test]
    fn test_draw_outside_frame_fails() {
        let gsg = SoftwareGuardian::new(FrameBufferProperties::default(), false);
        let geom = Geom::new(GeomId(1), VertexFormat::POSITION, 3);
        assert_eq!(gsg.draw_geom(&geom, &frame()), Err(RenderError::NotInFrame));
        assert!(gsg.begin_frame(&frame()));
        assert!(gsg.draw_geom(&geom, &frame()).is_ok());
        gsg.end_frame(&frame());
        assert_eq!(gsg.drawn_geoms(), vec![GeomId(1)]);
    }

    #[test]
    fn test_invalidated_guardian_refuses_frames() {
        let gsg = SoftwareGuardian::new(FrameBufferProperties::default(), false);
        gsg.invalidate();
        assert!(!gsg.is_valid());
        assert!(!gsg.begin_frame(&frame()));
    }

    #[test]
    fn test_fail_on_rejects_one_geom() {
        let gsg = SoftwareGuardian::new(FrameBufferProperties::default(), false);
        gsg.fail_on(Some(GeomId(2)));
        gsg.begin_frame(&frame());
        assert!(gsg.draw_geom(&Geom::new(GeomId(1), VertexFormat::POSITION, 3), &frame()).is_ok());
        assert!(matches!(
            gsg.draw_geom(&Geom::new(GeomId(2), VertexFormat::POSITION, 3), &frame()),
            Err(RenderError::DrawFailed { .. })
        ));
    }
}
