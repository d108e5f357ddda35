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

//! Defines `GeomMunger`, the backend's description of how to adapt geometry.

use super::{Geom, VertexFormat};
use crate::renderer::error::MungeError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies a munger instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MungerId(pub u64);

static NEXT_MUNGER_ID: AtomicU64 = AtomicU64::new(1);

/// Adapts geometry to the vertex format a backend wants for one render state.
///
/// Geometry missing a `required` column cannot be adapted. Columns in
/// `stripped` are dropped from the adapted copy.
#[derive(Debug, Clone)]
pub struct GeomMunger {
    id: MungerId,
    required: VertexFormat,
    stripped: VertexFormat,
}

impl GeomMunger {
    /// Creates a munger with a fresh id.
    pub fn new(required: VertexFormat, stripped: VertexFormat) -> Self {
        Self {
            id: MungerId(NEXT_MUNGER_ID.fetch_add(1, Ordering::Relaxed)),
            required,
            stripped,
        }
    }

    /// The munger id.
    pub fn id(&self) -> MungerId {
        self.id
    }

    /// Columns a geometry must have to be adapted.
    pub fn required(&self) -> VertexFormat {
        self.required
    }

    /// Columns removed from adapted geometry.
    pub fn stripped(&self) -> VertexFormat {
        self.stripped
    }

    /// Adapts `geom`, returning the source handle when nothing changes.
    pub fn munge(&self, geom: &Arc<Geom>) -> Result<Arc<Geom>, MungeError> {
        if !geom.format().contains(self.required) {
            return Err(MungeError::MissingColumns {
                geom: geom.id(),
                missing: self.required.difference(geom.format()),
            });
        }
        let target = geom.format().difference(self.stripped);
        if target == geom.format() {
            return Ok(Arc::clone(geom));
        }
        Ok(Arc::new(geom.with_format(target)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::GeomId;

    #[test]
    fn test_munge_strips_columns() {
        let munger = GeomMunger::new(VertexFormat::POSITION, VertexFormat::COLOR);
        let geom = Arc::new(Geom::new(GeomId(1), VertexFormat::all(), 3));
        let out = munger.munge(&geom).unwrap();
        assert!(!out.format().contains(VertexFormat::COLOR));
        assert_eq!(out.id(), geom.id());
    }

    #[test]
    fn test_munge_keeps_handle_when_unchanged() {
        let munger = GeomMunger::new(VertexFormat::POSITION, VertexFormat::empty());
        let geom = Arc::new(Geom::new(GeomId(2), VertexFormat::POSITION, 3));
        assert!(Arc::ptr_eq(&munger.munge(&geom).unwrap(), &geom));
    }

    #[test]
    fn test_munge_fails_on_missing_columns() {
        let munger = GeomMunger::new(VertexFormat::POSITION | VertexFormat::NORMAL, VertexFormat::empty());
        let geom = Arc::new(Geom::new(GeomId(3), VertexFormat::POSITION, 3));
        match munger.munge(&geom) {
            Err(MungeError::MissingColumns { geom, missing }) => {
                assert_eq!(geom, GeomId(3));
                assert_eq!(missing, VertexFormat::NORMAL);
            }
            other => panic!("expected a munge failure, got {other:?}"),
        }
    }
}
