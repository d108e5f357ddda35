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

//! The transient per-frame record the cull pass sorts into bins.

use ordo_core::geom::{Geom, GeomMunger};
use ordo_core::math::Mat4;
use ordo_core::renderer::{MungeError, SceneSetup};
use ordo_core::state::RenderState;
use ordo_telemetry::DropReason;
use std::sync::Arc;

/// A drawable geometry paired with its resolved state and transform.
///
/// Cloning produces an independent record; the geometry and state handles are
/// shared, which is fine since both are immutable.
#[derive(Debug, Clone)]
pub struct CullableObject {
    /// The geometry to draw.
    pub geom: Arc<Geom>,
    /// The fully resolved render state.
    pub state: Arc<RenderState>,
    /// Model-to-world transform.
    pub transform: Mat4,
    /// `true` if the object has decals layered onto it.
    pub has_decals: bool,
}

impl CullableObject {
    /// Creates an object without decals.
    pub fn new(geom: Arc<Geom>, state: Arc<RenderState>, transform: Mat4) -> Self {
        Self {
            geom,
            state,
            transform,
            has_decals: false,
        }
    }

    /// Marks the object as carrying decals.
    pub fn with_decals(mut self, has_decals: bool) -> Self {
        self.has_decals = has_decals;
        self
    }

    /// Replaces the geometry with the munger's adaptation of it.
    pub fn adapt(&mut self, munger: &GeomMunger) -> Result<(), MungeError> {
        self.geom = munger.munge(&self.geom)?;
        Ok(())
    }

    /// Munges the geometry for the backend and checks that it can be drawn.
    ///
    /// # Arguments
    ///
    /// * `munger`: the adaptation the backend asked for.
    /// * `force`: when `true`, non-resident data is accepted; the backend is
    ///   expected to wait for it at draw time.
    ///
    /// # Errors
    ///
    /// [`DropReason::MungeFailed`] if the geometry cannot be adapted, or
    /// [`DropReason::NotResident`] if it is not resident and `force` is not
    /// set. Either way the object should not be drawn this frame.
    pub fn munge_geom(&mut self, munger: &GeomMunger, force: bool) -> Result<(), DropReason> {
        if let Err(e) = self.adapt(munger) {
            log::trace!("Munge of geometry {:?} failed: {e}", self.geom.id());
            return Err(DropReason::MungeFailed);
        }
        if force || self.request_resident() {
            Ok(())
        } else {
            Err(DropReason::NotResident)
        }
    }

    /// Returns `true` if the geometry data can be used right now; otherwise
    /// asks for it to be paged in.
    pub fn request_resident(&self) -> bool {
        self.geom.request_resident()
    }

    /// The view-space depth of the geometry's bounds center.
    pub fn view_depth(&self, scene: &SceneSetup) -> f32 {
        scene.view_depth(self.transform.transform_point(self.geom.bounds_center()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_core::geom::{GeomId, VertexFormat};
    use ordo_core::math::Vec3;

    fn object(geom: Geom) -> CullableObject {
        CullableObject::new(Arc::new(geom), RenderState::empty(), Mat4::IDENTITY)
    }

    #[test]
    fn test_clone_is_independent() {
        let a = object(Geom::new(GeomId(1), VertexFormat::POSITION, 3));
        let mut b = a.clone();
        b.transform = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        b.has_decals = true;
        assert_eq!(a.transform, Mat4::IDENTITY);
        assert!(!a.has_decals);
    }

    #[test]
    fn test_munge_geom_strips_and_accepts_resident() {
        let mut obj = object(Geom::new(GeomId(2), VertexFormat::all(), 3));
        let munger = GeomMunger::new(VertexFormat::POSITION, VertexFormat::COLOR);
        assert_eq!(obj.munge_geom(&munger, false), Ok(()));
        assert!(!obj.geom.format().contains(VertexFormat::COLOR));
    }

    #[test]
    fn test_munge_geom_rejects_missing_columns() {
        let mut obj = object(Geom::new(GeomId(3), VertexFormat::NORMAL, 3));
        let munger = GeomMunger::new(VertexFormat::POSITION, VertexFormat::empty());
        assert_eq!(obj.munge_geom(&munger, true), Err(DropReason::MungeFailed));
    }

    #[test]
    fn test_non_resident_needs_force() {
        let geom = Geom::new(GeomId(4), VertexFormat::POSITION, 3).non_resident();
        let munger = GeomMunger::new(VertexFormat::POSITION, VertexFormat::empty());

        let mut unforced = object(geom);
        assert_eq!(
            unforced.munge_geom(&munger, false),
            Err(DropReason::NotResident)
        );
        assert_eq!(unforced.geom.residency_requests(), 1);

        let mut forced = unforced.clone();
        assert_eq!(forced.munge_geom(&munger, true), Ok(()));
    }

    #[test]
    fn test_view_depth_uses_transform() {
        let geom = Geom::new(GeomId(5), VertexFormat::POSITION, 3)
            .with_bounds_center(Vec3::new(0.0, 0.0, -1.0));
        let mut obj = object(geom);
        obj.transform = Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0));
        approx::assert_relative_eq!(obj.view_depth(&SceneSetup::default()), 5.0);
    }
}
