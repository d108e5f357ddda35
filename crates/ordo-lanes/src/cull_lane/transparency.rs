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

//! The cached states `CullResult` composes onto objects to implement each
//! transparency mode, and the debug flash recoloring.
//!
//! Every state here is built once and interned, so composing with it hits the
//! composition cache after the first object of each kind.

use ordo_core::cull::flash;
use ordo_core::math::LinearRgba;
use ordo_core::state::{
    AttribKind, CompareFunc, DepthWriteMode, RenderAttrib, RenderState, TransparencyMode,
    MAX_PRIORITY,
};
use ordo_core::FrameClock;
use std::sync::{Arc, OnceLock};

/// Alpha at or above this level counts as opaque in dual-pass rendering.
pub const DUAL_OPAQUE_LEVEL: f32 = 252.0 / 256.0;

const DUAL_TRANSPARENT_FLASH: LinearRgba = LinearRgba::new(0.8, 0.2, 0.2, 1.0);
const DUAL_OPAQUE_FLASH: LinearRgba = LinearRgba::new(0.2, 0.2, 0.8, 1.0);

static ALPHA: OnceLock<Arc<RenderState>> = OnceLock::new();
static BINARY: OnceLock<Arc<RenderState>> = OnceLock::new();
static DUAL_TRANSPARENT: OnceLock<Arc<RenderState>> = OnceLock::new();
static DUAL_TRANSPARENT_FLASHING: OnceLock<Arc<RenderState>> = OnceLock::new();
static DUAL_DECALS: OnceLock<Arc<RenderState>> = OnceLock::new();
static DUAL_DECALS_FLASHING: OnceLock<Arc<RenderState>> = OnceLock::new();
static DUAL_OPAQUE: OnceLock<Arc<RenderState>> = OnceLock::new();
static DUAL_OPAQUE_FLASHING: OnceLock<Arc<RenderState>> = OnceLock::new();

fn cached(cell: &OnceLock<Arc<RenderState>>, build: fn() -> Arc<RenderState>) -> Arc<RenderState> {
    Arc::clone(cell.get_or_init(build))
}

fn dual_transparent(test: CompareFunc, reference: f32) -> Arc<RenderState> {
    RenderState::make_with_priority(
        [
            RenderAttrib::alpha_test(test, reference),
            RenderAttrib::Transparency(TransparencyMode::Alpha),
            RenderAttrib::DepthWrite(DepthWriteMode::Off),
        ],
        MAX_PRIORITY,
    )
}

/// Composed onto alpha-blended objects: skips fully transparent fragments.
pub fn alpha_state() -> Arc<RenderState> {
    cached(&ALPHA, || {
        RenderState::make([RenderAttrib::alpha_test(CompareFunc::Greater, 0.0)])
    })
}

/// Composed onto binary-transparency objects: a hard alpha cutoff at 0.5
/// with blending disabled.
pub fn binary_state() -> Arc<RenderState> {
    cached(&BINARY, || {
        RenderState::make_with_priority(
            [
                RenderAttrib::alpha_test(CompareFunc::GreaterEqual, 0.5),
                RenderAttrib::Transparency(TransparencyMode::None),
            ],
            MAX_PRIORITY,
        )
    })
}

/// The state of the transparent half of a dual-pass split.
///
/// With decals, only the fragments the opaque pass rejects are drawn, so the
/// decals layered on the opaque part stay visible. The flashing variants tint
/// the result for debugging.
pub fn dual_transparent_state(has_decals: bool, flashing: bool) -> Arc<RenderState> {
    match (has_decals, flashing) {
        (false, false) => cached(&DUAL_TRANSPARENT, || {
            dual_transparent(CompareFunc::Greater, 0.0)
        }),
        (false, true) => cached(&DUAL_TRANSPARENT_FLASHING, || {
            dual_transparent(CompareFunc::Less, 1.0)
                .add_attrib(RenderAttrib::ColorScale(DUAL_TRANSPARENT_FLASH))
        }),
        (true, false) => cached(&DUAL_DECALS, || {
            dual_transparent(CompareFunc::Less, DUAL_OPAQUE_LEVEL)
        }),
        (true, true) => cached(&DUAL_DECALS_FLASHING, || {
            dual_transparent(CompareFunc::Less, DUAL_OPAQUE_LEVEL)
                .add_attrib(RenderAttrib::ColorScale(DUAL_TRANSPARENT_FLASH))
        }),
    }
}

/// The state of the opaque half of a dual-pass split.
pub fn dual_opaque_state(flashing: bool) -> Arc<RenderState> {
    fn opaque() -> Arc<RenderState> {
        RenderState::make_with_priority(
            [
                RenderAttrib::alpha_test(CompareFunc::GreaterEqual, DUAL_OPAQUE_LEVEL),
                RenderAttrib::Transparency(TransparencyMode::None),
            ],
            MAX_PRIORITY,
        )
    }
    if flashing {
        cached(&DUAL_OPAQUE_FLASHING, || {
            opaque().add_attrib(RenderAttrib::ColorScale(DUAL_OPAQUE_FLASH))
        })
    } else {
        cached(&DUAL_OPAQUE, opaque)
    }
}

/// Returns `true` during the "on" half of the debug flash cycle.
pub fn is_flash_frame(clock: &dyn FrameClock) -> bool {
    clock.flash_cycle(flash::RATE).rem_euclid(2) == 0
}

/// Replaces every color contribution of `state` with a flat `color`.
pub fn flash_recolor(state: &Arc<RenderState>, color: LinearRgba) -> Arc<RenderState> {
    state
        .remove_attribs(&[
            AttribKind::Texture,
            AttribKind::Light,
            AttribKind::ColorScale,
            AttribKind::Fog,
        ])
        .add_attrib_with_priority(RenderAttrib::flat_color(color), MAX_PRIORITY)
}
