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

//! Defines the render attributes a [`RenderState`](super::RenderState) is made of.
//!
//! Each attribute belongs to exactly one [`AttribKind`]; a state holds at most
//! one attribute per kind. Attributes are immutable values shared through
//! `Arc` between every state that contains them.

use crate::math::LinearRgba;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The kind of a render attribute. A state holds at most one attribute per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttribKind {
    /// Alpha comparison applied to fragments.
    AlphaTest,
    /// How the object handles transparency.
    Transparency,
    /// Whether the object writes to the depth buffer.
    DepthWrite,
    /// A multiplicative color factor. Accumulates on composition.
    ColorScale,
    /// The source of the object's base color.
    Color,
    /// An explicit bin assignment.
    CullBin,
    /// The textures bound to the object.
    Texture,
    /// The lights affecting the object.
    Light,
    /// The fog applied to the object.
    Fog,
}

impl AttribKind {
    /// The number of attribute kinds.
    pub const COUNT: usize = 9;

    /// Every kind, in slot order.
    pub const ALL: [AttribKind; Self::COUNT] = [
        AttribKind::AlphaTest,
        AttribKind::Transparency,
        AttribKind::DepthWrite,
        AttribKind::ColorScale,
        AttribKind::Color,
        AttribKind::CullBin,
        AttribKind::Texture,
        AttribKind::Light,
        AttribKind::Fog,
    ];

    /// The slot of this kind inside a state's attribute table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A comparison function, as used by the alpha test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompareFunc {
    /// The test is disabled; every fragment passes.
    None,
    /// No fragment passes.
    Never,
    /// Passes if `value < reference`.
    Less,
    /// Passes if `value == reference`.
    Equal,
    /// Passes if `value <= reference`.
    LessEqual,
    /// Passes if `value > reference`.
    Greater,
    /// Passes if `value != reference`.
    NotEqual,
    /// Passes if `value >= reference`.
    GreaterEqual,
    /// Every fragment passes.
    Always,
}

impl CompareFunc {
    /// Evaluates the comparison for `value` against `reference`.
    pub fn compare(self, value: f32, reference: f32) -> bool {
        match self {
            CompareFunc::None | CompareFunc::Always => true,
            CompareFunc::Never => false,
            CompareFunc::Less => value < reference,
            CompareFunc::Equal => value == reference,
            CompareFunc::LessEqual => value <= reference,
            CompareFunc::Greater => value > reference,
            CompareFunc::NotEqual => value != reference,
            CompareFunc::GreaterEqual => value >= reference,
        }
    }
}

/// An alpha test: fragments whose alpha fails the comparison are discarded.
#[derive(Debug, Clone, Copy)]
pub struct AlphaTestAttrib {
    /// The comparison applied to the fragment alpha.
    pub func: CompareFunc,
    /// The reference alpha value.
    pub reference: f32,
}

impl AlphaTestAttrib {
    /// Creates a new alpha test.
    pub const fn new(func: CompareFunc, reference: f32) -> Self {
        Self { func, reference }
    }

    /// Returns `true` if a fragment with the given alpha survives the test.
    #[inline]
    pub fn passes(&self, alpha: f32) -> bool {
        self.func.compare(alpha, self.reference)
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.func
            .cmp(&other.func)
            .then_with(|| self.reference.total_cmp(&other.reference))
    }
}

/// The transparency mode of an object.
///
/// The mode decides which bin an object lands in and, for the `Binary`,
/// `Multisample` and `Dual` modes, how its state is rewritten during cull.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TransparencyMode {
    /// Fully opaque.
    #[default]
    None,
    /// Alpha blended; drawn back to front.
    Alpha,
    /// Alpha to coverage with multisampling.
    Multisample,
    /// Multisample coverage mask.
    MultisampleMask,
    /// Hard-edged transparency through an alpha test only.
    Binary,
    /// Dual-pass: an opaque pass for solid texels and a blended pass for the rest.
    Dual,
}

impl TransparencyMode {
    /// Returns `true` if objects in this mode belong to the transparent bin by default.
    #[inline]
    pub fn prefers_transparent_bin(self) -> bool {
        matches!(
            self,
            TransparencyMode::Alpha
                | TransparencyMode::Multisample
                | TransparencyMode::MultisampleMask
                | TransparencyMode::Dual
        )
    }
}

/// Whether depth writes are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DepthWriteMode {
    /// Depth writes enabled.
    On,
    /// Depth writes disabled.
    Off,
}

/// The source of an object's base color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorAttrib {
    /// Use the per-vertex colors of the geometry.
    Vertex,
    /// Use a single flat color for the whole object.
    Flat(LinearRgba),
    /// Ignore vertex colors; draw white.
    Off,
}

impl ColorAttrib {
    fn rank(&self) -> u8 {
        match self {
            ColorAttrib::Vertex => 0,
            ColorAttrib::Flat(_) => 1,
            ColorAttrib::Off => 2,
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ColorAttrib::Flat(a), ColorAttrib::Flat(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Returns `true` if the geometry's vertex colors are consumed.
    pub fn uses_vertex_color(&self) -> bool {
        matches!(self, ColorAttrib::Vertex)
    }
}

/// An explicit bin assignment: the bin name and the draw order inside `Fixed` bins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CullBinAttrib {
    /// The bin name. An empty name means "no explicit bin".
    pub name: Arc<str>,
    /// The draw order used by `Fixed` bins.
    pub draw_order: i32,
}

impl CullBinAttrib {
    /// Creates a new bin assignment.
    pub fn new(name: &str, draw_order: i32) -> Self {
        Self {
            name: Arc::from(name),
            draw_order,
        }
    }
}

/// Identifies a texture owned by the backend or an asset system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Identifies a light in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub u32);

/// Identifies a fog description in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FogId(pub u32);

/// The ordered list of textures bound to an object, one per stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureAttrib {
    /// Texture per stage, in stage order.
    pub stages: Vec<TextureId>,
}

impl TextureAttrib {
    /// Creates a texture attribute binding `stages` in order.
    pub fn new(stages: impl IntoIterator<Item = TextureId>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
        }
    }

    /// Returns `true` if no texture stage is bound.
    pub fn is_off(&self) -> bool {
        self.stages.is_empty()
    }
}

/// The set of lights turned on for an object. An empty set means lighting is off.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightAttrib {
    on: Vec<LightId>,
}

impl LightAttrib {
    /// Creates a light attribute with the given lights on.
    pub fn new(on: impl IntoIterator<Item = LightId>) -> Self {
        let mut on: Vec<LightId> = on.into_iter().collect();
        on.sort_unstable();
        on.dedup();
        Self { on }
    }

    /// A light attribute with every light turned off.
    pub fn all_off() -> Self {
        Self { on: Vec::new() }
    }

    /// The lights turned on, sorted by id.
    pub fn on_lights(&self) -> &[LightId] {
        &self.on
    }

    /// Returns `true` if no light is on.
    pub fn is_off(&self) -> bool {
        self.on.is_empty()
    }
}

/// The fog applied to an object, or `None` for no fog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FogAttrib {
    /// The fog in effect.
    pub fog: Option<FogId>,
}

impl FogAttrib {
    /// A fog attribute that disables fog.
    pub const fn off() -> Self {
        Self { fog: None }
    }
}

/// One render attribute.
///
/// Equality, hashing and ordering are defined on content. Floating point
/// payloads are compared by their total order so that attributes can key
/// the state intern table.
#[derive(Debug, Clone)]
pub enum RenderAttrib {
    /// See [`AlphaTestAttrib`].
    AlphaTest(AlphaTestAttrib),
    /// See [`TransparencyMode`].
    Transparency(TransparencyMode),
    /// See [`DepthWriteMode`].
    DepthWrite(DepthWriteMode),
    /// A multiplicative color scale.
    ColorScale(LinearRgba),
    /// See [`ColorAttrib`].
    Color(ColorAttrib),
    /// See [`CullBinAttrib`].
    CullBin(CullBinAttrib),
    /// See [`TextureAttrib`].
    Texture(TextureAttrib),
    /// See [`LightAttrib`].
    Light(LightAttrib),
    /// See [`FogAttrib`].
    Fog(FogAttrib),
}

impl RenderAttrib {
    /// Shorthand for an alpha test attribute.
    pub fn alpha_test(func: CompareFunc, reference: f32) -> Self {
        RenderAttrib::AlphaTest(AlphaTestAttrib::new(func, reference))
    }

    /// Shorthand for an explicit bin attribute.
    pub fn cull_bin(name: &str, draw_order: i32) -> Self {
        RenderAttrib::CullBin(CullBinAttrib::new(name, draw_order))
    }

    /// Shorthand for a flat color attribute.
    pub fn flat_color(color: LinearRgba) -> Self {
        RenderAttrib::Color(ColorAttrib::Flat(color))
    }

    /// The kind of this attribute.
    pub fn kind(&self) -> AttribKind {
        match self {
            RenderAttrib::AlphaTest(_) => AttribKind::AlphaTest,
            RenderAttrib::Transparency(_) => AttribKind::Transparency,
            RenderAttrib::DepthWrite(_) => AttribKind::DepthWrite,
            RenderAttrib::ColorScale(_) => AttribKind::ColorScale,
            RenderAttrib::Color(_) => AttribKind::Color,
            RenderAttrib::CullBin(_) => AttribKind::CullBin,
            RenderAttrib::Texture(_) => AttribKind::Texture,
            RenderAttrib::Light(_) => AttribKind::Light,
            RenderAttrib::Fog(_) => AttribKind::Fog,
        }
    }

    /// Combines `over` on top of `base`, both of the same kind.
    ///
    /// Color scales multiply; every other kind is replaced by `over`, whose
    /// allocation is shared rather than copied.
    pub fn compose(base: &Arc<RenderAttrib>, over: &Arc<RenderAttrib>) -> Arc<RenderAttrib> {
        debug_assert_eq!(base.kind(), over.kind());
        match (base.as_ref(), over.as_ref()) {
            (RenderAttrib::ColorScale(a), RenderAttrib::ColorScale(b)) => {
                Arc::new(RenderAttrib::ColorScale(*a * *b))
            }
            _ => Arc::clone(over),
        }
    }
}

impl PartialEq for RenderAttrib {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RenderAttrib {}

impl PartialOrd for RenderAttrib {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RenderAttrib {
    fn cmp(&self, other: &Self) -> Ordering {
        use RenderAttrib as A;
        match (self, other) {
            (A::AlphaTest(a), A::AlphaTest(b)) => a.total_cmp(b),
            (A::Transparency(a), A::Transparency(b)) => a.cmp(b),
            (A::DepthWrite(a), A::DepthWrite(b)) => a.cmp(b),
            (A::ColorScale(a), A::ColorScale(b)) => a.total_cmp(b),
            (A::Color(a), A::Color(b)) => a.total_cmp(b),
            (A::CullBin(a), A::CullBin(b)) => a.cmp(b),
            (A::Texture(a), A::Texture(b)) => a.cmp(b),
            (A::Light(a), A::Light(b)) => a.cmp(b),
            (A::Fog(a), A::Fog(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl Hash for RenderAttrib {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            RenderAttrib::AlphaTest(a) => {
                a.func.hash(state);
                a.reference.to_bits().hash(state);
            }
            RenderAttrib::Transparency(mode) => mode.hash(state),
            RenderAttrib::DepthWrite(mode) => mode.hash(state),
            RenderAttrib::ColorScale(scale) => scale.to_bits().hash(state),
            RenderAttrib::Color(color) => {
                color.rank().hash(state);
                if let ColorAttrib::Flat(c) = color {
                    c.to_bits().hash(state);
                }
            }
            RenderAttrib::CullBin(bin) => bin.hash(state),
            RenderAttrib::Texture(texture) => texture.hash(state),
            RenderAttrib::Light(light) => light.hash(state),
            RenderAttrib::Fog(fog) => fog.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_slots_match_all_table() {
        for (i, kind) in AttribKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_compare_func_semantics() {
        assert!(CompareFunc::Greater.compare(0.1, 0.0));
        assert!(!CompareFunc::Greater.compare(0.0, 0.0));
        assert!(CompareFunc::GreaterEqual.compare(0.5, 0.5));
        assert!(!CompareFunc::Less.compare(0.5, 0.5));
        assert!(CompareFunc::None.compare(0.0, 1.0));
        assert!(!CompareFunc::Never.compare(1.0, 0.0));
    }

    #[test]
    fn test_transparent_bin_preference() {
        assert!(TransparencyMode::Alpha.prefers_transparent_bin());
        assert!(TransparencyMode::Dual.prefers_transparent_bin());
        assert!(TransparencyMode::MultisampleMask.prefers_transparent_bin());
        assert!(!TransparencyMode::Binary.prefers_transparent_bin());
        assert!(!TransparencyMode::None.prefers_transparent_bin());
    }

    #[test]
    fn test_compose_replaces_and_shares() {
        let base = Arc::new(RenderAttrib::DepthWrite(DepthWriteMode::On));
        let over = Arc::new(RenderAttrib::DepthWrite(DepthWriteMode::Off));
        let out = RenderAttrib::compose(&base, &over);
        assert!(Arc::ptr_eq(&out, &over));
    }

    #[test]
    fn test_compose_multiplies_color_scale() {
        let half = LinearRgba::new(0.5, 0.5, 0.5, 1.0);
        let base = Arc::new(RenderAttrib::ColorScale(half));
        let over = Arc::new(RenderAttrib::ColorScale(half));
        let out = RenderAttrib::compose(&base, &over);
        assert_eq!(
            *out,
            RenderAttrib::ColorScale(LinearRgba::new(0.25, 0.25, 0.25, 1.0))
        );
    }

    #[test]
    fn test_content_equality_and_ordering() {
        let a = RenderAttrib::alpha_test(CompareFunc::Greater, 0.0);
        let b = RenderAttrib::alpha_test(CompareFunc::Greater, 0.0);
        let c = RenderAttrib::alpha_test(CompareFunc::GreaterEqual, 0.5);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
        // Attributes of different kinds order by kind.
        assert!(a < RenderAttrib::Transparency(TransparencyMode::None));
    }

    #[test]
    fn test_light_attrib_normalizes() {
        let l = LightAttrib::new([LightId(3), LightId(1), LightId(3)]);
        assert_eq!(l.on_lights(), &[LightId(1), LightId(3)]);
        assert!(LightAttrib::all_off().is_off());
    }
}
