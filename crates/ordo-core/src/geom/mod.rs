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

//! Geometry handles and their backend adaptation.
//!
//! A [`Geom`] is the drawable payload of a cullable object. The pipeline never
//! reads vertex data; it only needs an identity, a vertex format, a bounds
//! center for depth sorting and a residency flag. A [`GeomMunger`] describes
//! how a backend wants the vertex format adapted for one render state.

mod munger;

pub use self::munger::{GeomMunger, MungerId};

use crate::math::Vec3;
use bitflags::bitflags;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// A unique identifier for a piece of geometry. Adapted copies keep the id
/// of their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeomId(pub u64);

bitflags! {
    /// The set of vertex columns present in a geometry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VertexFormat: u32 {
        /// Vertex positions.
        const POSITION = 1 << 0;
        /// Vertex normals.
        const NORMAL = 1 << 1;
        /// Per-vertex colors.
        const COLOR = 1 << 2;
        /// Texture coordinates.
        const TEXCOORD = 1 << 3;
    }
}

/// Residency bookkeeping shared by a geometry and every adapted copy of it.
#[derive(Debug, Default)]
struct Residency {
    resident: AtomicBool,
    requests: AtomicU32,
}

/// A drawable piece of geometry.
#[derive(Debug)]
pub struct Geom {
    id: GeomId,
    format: VertexFormat,
    vertex_count: u32,
    bounds_center: Vec3,
    residency: Arc<Residency>,
}

impl Geom {
    /// Creates a resident geometry centered on the origin.
    pub fn new(id: GeomId, format: VertexFormat, vertex_count: u32) -> Self {
        let residency = Residency {
            resident: AtomicBool::new(true),
            requests: AtomicU32::new(0),
        };
        Self {
            id,
            format,
            vertex_count,
            bounds_center: Vec3::ZERO,
            residency: Arc::new(residency),
        }
    }

    /// Sets the object-space center of the geometry's bounds.
    pub fn with_bounds_center(mut self, center: Vec3) -> Self {
        self.bounds_center = center;
        self
    }

    /// Marks the geometry's data as not yet loaded.
    pub fn non_resident(self) -> Self {
        self.residency.resident.store(false, Ordering::Release);
        self
    }

    /// The geometry id.
    #[inline]
    pub fn id(&self) -> GeomId {
        self.id
    }

    /// The vertex columns present.
    #[inline]
    pub fn format(&self) -> VertexFormat {
        self.format
    }

    /// The number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// The object-space center of the bounds.
    #[inline]
    pub fn bounds_center(&self) -> Vec3 {
        self.bounds_center
    }

    /// Returns `true` if the data is loaded and usable.
    #[inline]
    pub fn is_resident(&self) -> bool {
        self.residency.resident.load(Ordering::Acquire)
    }

    /// Marks the data as loaded (or evicted).
    pub fn set_resident(&self, resident: bool) {
        self.residency.resident.store(resident, Ordering::Release);
    }

    /// Returns whether the data is usable right now. When it is not, a load
    /// request is recorded and the call returns immediately.
    pub fn request_resident(&self) -> bool {
        if self.is_resident() {
            return true;
        }
        self.residency.requests.fetch_add(1, Ordering::Relaxed);
        false
    }

    /// The number of load requests recorded so far.
    pub fn residency_requests(&self) -> u32 {
        self.residency.requests.load(Ordering::Relaxed)
    }

    /// A copy with a different vertex format, sharing identity and residency.
    pub fn with_format(&self, format: VertexFormat) -> Geom {
        Geom {
            id: self.id,
            format,
            vertex_count: self.vertex_count,
            bounds_center: self.bounds_center,
            residency: Arc::clone(&self.residency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_format_set_operations() {
        let f = VertexFormat::POSITION | VertexFormat::COLOR;
        assert!(f.contains(VertexFormat::POSITION));
        assert!(!f.contains(VertexFormat::NORMAL));
        assert_eq!(f.difference(VertexFormat::COLOR), VertexFormat::POSITION);
        assert!(VertexFormat::empty().is_empty());
        assert_eq!(format!("{f:?}"), "VertexFormat(POSITION | COLOR)");
    }

    #[test]
    fn test_request_resident_records_requests_only_when_missing() {
        let geom = Geom::new(GeomId(1), VertexFormat::all(), 3);
        assert!(geom.request_resident());
        assert_eq!(geom.residency_requests(), 0);

        let lazy = Geom::new(GeomId(2), VertexFormat::all(), 3).non_resident();
        assert!(!lazy.request_resident());
        assert!(!lazy.request_resident());
        assert_eq!(lazy.residency_requests(), 2);
    }

    #[test]
    fn test_adapted_copy_shares_residency() {
        let source = Geom::new(GeomId(3), VertexFormat::all(), 3).non_resident();
        let adapted = source.with_format(VertexFormat::POSITION);
        assert_eq!(adapted.id(), source.id());
        source.set_resident(true);
        assert!(adapted.is_resident());
    }
}
