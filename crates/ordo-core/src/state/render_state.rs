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

//! Defines `RenderState`, the immutable, interned bundle of render attributes.

use super::attrib::{
    AlphaTestAttrib, AttribKind, ColorAttrib, CullBinAttrib, DepthWriteMode, FogAttrib,
    LightAttrib, RenderAttrib, TextureAttrib, TransparencyMode,
};
use super::intern::registry;
use crate::cull::BinAssignment;
use crate::math::LinearRgba;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// The highest override priority. An attribute at this priority cannot be
/// overridden by composition.
pub const MAX_PRIORITY: i32 = 1_000_000_000;

/// A unique identifier for an interned state instance. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u64);

/// An attribute together with its override priority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttribEntry {
    /// The shared attribute payload.
    pub attrib: Arc<RenderAttrib>,
    /// The override priority of the attribute inside its state.
    pub priority: i32,
}

/// One slot per [`AttribKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct AttribTable([Option<AttribEntry>; AttribKind::COUNT]);

impl AttribTable {
    fn empty() -> Self {
        Self(std::array::from_fn(|_| None))
    }

    fn set(&mut self, attrib: Arc<RenderAttrib>, priority: i32) {
        let slot = attrib.kind().index();
        self.0[slot] = Some(AttribEntry { attrib, priority });
    }
}

/// An immutable set of render attributes, at most one per [`AttribKind`].
///
/// States are always handled as `Arc<RenderState>` and are interned: two
/// states built from the same attributes and priorities are the same
/// allocation. Every operation returns a new (or previously interned) state
/// and never modifies its receiver.
///
/// # Examples
///
/// ```
/// use ordo_core::state::{RenderAttrib, RenderState, TransparencyMode};
///
/// let a = RenderState::make([RenderAttrib::Transparency(TransparencyMode::Alpha)]);
/// let b = RenderState::make([RenderAttrib::Transparency(TransparencyMode::Alpha)]);
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// assert_eq!(&*a.bin_assignment().name, "transparent");
/// ```
pub struct RenderState {
    id: StateId,
    table: AttribTable,
    content_hash: u64,
    bin: OnceLock<BinAssignment>,
}

impl RenderState {
    pub(crate) fn from_table(id: StateId, table: AttribTable, content_hash: u64) -> Self {
        Self {
            id,
            table,
            content_hash,
            bin: OnceLock::new(),
        }
    }

    pub(crate) fn table(&self) -> &AttribTable {
        &self.table
    }

    /// Returns the state with no attributes.
    pub fn empty() -> Arc<RenderState> {
        static EMPTY: OnceLock<Arc<RenderState>> = OnceLock::new();
        Arc::clone(EMPTY.get_or_init(|| registry().intern(AttribTable::empty())))
    }

    /// Builds a state from `attribs`, each at priority 0.
    ///
    /// If two attributes share a kind, the later one wins.
    pub fn make(attribs: impl IntoIterator<Item = RenderAttrib>) -> Arc<RenderState> {
        Self::make_with_priority(attribs, 0)
    }

    /// Builds a state from `attribs`, each at the given override priority.
    pub fn make_with_priority(
        attribs: impl IntoIterator<Item = RenderAttrib>,
        priority: i32,
    ) -> Arc<RenderState> {
        let mut table = AttribTable::empty();
        for attrib in attribs {
            table.set(Arc::new(attrib), priority);
        }
        registry().intern(table)
    }

    /// Composes `other` as an override on top of `self`.
    ///
    /// For each kind present in both states, `self`'s attribute survives only
    /// if its priority is strictly greater than `other`'s; otherwise the
    /// attributes are combined (see [`RenderAttrib::compose`]) at `other`'s
    /// priority. Results are memoised per operand pair.
    pub fn compose(self: &Arc<Self>, other: &Arc<RenderState>) -> Arc<RenderState> {
        if other.is_empty() {
            return Arc::clone(self);
        }
        if self.is_empty() {
            return Arc::clone(other);
        }

        let registry = registry();
        if let Some(cached) = registry.cached_composition(self.id, other.id) {
            return cached;
        }

        let table = AttribTable(std::array::from_fn(|slot| {
            match (&self.table.0[slot], &other.table.0[slot]) {
                (None, None) => None,
                (Some(a), None) => Some(a.clone()),
                (None, Some(b)) => Some(b.clone()),
                (Some(a), Some(b)) if a.priority > b.priority => Some(a.clone()),
                (Some(a), Some(b)) => Some(AttribEntry {
                    attrib: RenderAttrib::compose(&a.attrib, &b.attrib),
                    priority: b.priority,
                }),
            }
        }));

        let result = registry.intern(table);
        registry.store_composition(self.id, other.id, &result);
        result
    }

    /// Returns a state with `attrib` added at priority 0.
    pub fn add_attrib(self: &Arc<Self>, attrib: RenderAttrib) -> Arc<RenderState> {
        self.add_attrib_with_priority(attrib, 0)
    }

    /// Returns a state with `attrib` added at `priority`.
    ///
    /// An existing attribute of the same kind is replaced unless its priority
    /// is higher than `priority`. Other attributes are shared, not copied.
    pub fn add_attrib_with_priority(
        self: &Arc<Self>,
        attrib: RenderAttrib,
        priority: i32,
    ) -> Arc<RenderState> {
        if let Some(existing) = self.entry(attrib.kind()) {
            if existing.priority > priority {
                return Arc::clone(self);
            }
        }
        let mut table = self.table.clone();
        table.set(Arc::new(attrib), priority);
        registry().intern(table)
    }

    /// Returns a state without any attribute of `kind`.
    pub fn remove_attrib(self: &Arc<Self>, kind: AttribKind) -> Arc<RenderState> {
        if !self.has(kind) {
            return Arc::clone(self);
        }
        let mut table = self.table.clone();
        table.0[kind.index()] = None;
        registry().intern(table)
    }

    /// Returns a state without any attribute of the listed kinds.
    pub fn remove_attribs(self: &Arc<Self>, kinds: &[AttribKind]) -> Arc<RenderState> {
        if !kinds.iter().any(|kind| self.has(*kind)) {
            return Arc::clone(self);
        }
        let mut table = self.table.clone();
        for kind in kinds {
            table.0[kind.index()] = None;
        }
        registry().intern(table)
    }

    // --- Inspection ---

    /// The unique id of this interned instance.
    #[inline]
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Returns `true` if the state has no attributes.
    pub fn is_empty(&self) -> bool {
        self.table.0.iter().all(Option::is_none)
    }

    /// The number of attributes in the state.
    pub fn len(&self) -> usize {
        self.table.0.iter().flatten().count()
    }

    /// Iterates over the attributes in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &AttribEntry> {
        self.table.0.iter().flatten()
    }

    /// Returns `true` if the state carries an attribute of `kind`.
    #[inline]
    pub fn has(&self, kind: AttribKind) -> bool {
        self.table.0[kind.index()].is_some()
    }

    /// Returns the entry (attribute and priority) for `kind`.
    #[inline]
    pub fn entry(&self, kind: AttribKind) -> Option<&AttribEntry> {
        self.table.0[kind.index()].as_ref()
    }

    /// Returns the attribute for `kind`.
    #[inline]
    pub fn get(&self, kind: AttribKind) -> Option<&RenderAttrib> {
        self.entry(kind).map(|entry| entry.attrib.as_ref())
    }

    /// Returns the override priority of the attribute of `kind`, if present.
    pub fn priority(&self, kind: AttribKind) -> Option<i32> {
        self.entry(kind).map(|entry| entry.priority)
    }

    /// The transparency mode, if the state sets one.
    pub fn transparency(&self) -> Option<TransparencyMode> {
        match self.get(AttribKind::Transparency) {
            Some(RenderAttrib::Transparency(mode)) => Some(*mode),
            _ => None,
        }
    }

    /// The alpha test, if the state sets one.
    pub fn alpha_test(&self) -> Option<&AlphaTestAttrib> {
        match self.get(AttribKind::AlphaTest) {
            Some(RenderAttrib::AlphaTest(test)) => Some(test),
            _ => None,
        }
    }

    /// The depth write mode, if the state sets one.
    pub fn depth_write(&self) -> Option<DepthWriteMode> {
        match self.get(AttribKind::DepthWrite) {
            Some(RenderAttrib::DepthWrite(mode)) => Some(*mode),
            _ => None,
        }
    }

    /// The color scale, if the state sets one.
    pub fn color_scale(&self) -> Option<LinearRgba> {
        match self.get(AttribKind::ColorScale) {
            Some(RenderAttrib::ColorScale(scale)) => Some(*scale),
            _ => None,
        }
    }

    /// The color attribute, if the state sets one.
    pub fn color(&self) -> Option<&ColorAttrib> {
        match self.get(AttribKind::Color) {
            Some(RenderAttrib::Color(color)) => Some(color),
            _ => None,
        }
    }

    /// The explicit bin attribute, if the state sets one.
    pub fn cull_bin(&self) -> Option<&CullBinAttrib> {
        match self.get(AttribKind::CullBin) {
            Some(RenderAttrib::CullBin(bin)) => Some(bin),
            _ => None,
        }
    }

    /// The texture attribute, if the state sets one.
    pub fn texture(&self) -> Option<&TextureAttrib> {
        match self.get(AttribKind::Texture) {
            Some(RenderAttrib::Texture(texture)) => Some(texture),
            _ => None,
        }
    }

    /// The light attribute, if the state sets one.
    pub fn light(&self) -> Option<&LightAttrib> {
        match self.get(AttribKind::Light) {
            Some(RenderAttrib::Light(light)) => Some(light),
            _ => None,
        }
    }

    /// The fog attribute, if the state sets one.
    pub fn fog(&self) -> Option<&FogAttrib> {
        match self.get(AttribKind::Fog) {
            Some(RenderAttrib::Fog(fog)) => Some(fog),
            _ => None,
        }
    }

    /// Returns `true` unless the state explicitly disables depth writes.
    pub fn writes_depth(&self) -> bool {
        self.depth_write() != Some(DepthWriteMode::Off)
    }

    /// Returns `true` if the state names a bin explicitly (non-empty name).
    pub fn has_explicit_bin(&self) -> bool {
        self.cull_bin().is_some_and(|bin| !bin.name.is_empty())
    }

    /// The bin this state is drawn in, computed on first use and cached.
    pub fn bin_assignment(&self) -> &BinAssignment {
        self.bin.get_or_init(|| BinAssignment::for_state(self))
    }

    /// The number of distinct states currently alive in the intern table.
    pub fn live_count() -> usize {
        registry().live_states()
    }
}

impl PartialEq for RenderState {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            || (self.content_hash == other.content_hash && self.table == other.table)
    }
}

impl Eq for RenderState {}

impl Hash for RenderState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_hash.hash(state);
    }
}

impl PartialOrd for RenderState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RenderState {
    /// Orders states by content; state-sorted bins rely on this.
    fn cmp(&self, other: &Self) -> Ordering {
        if self.id == other.id {
            return Ordering::Equal;
        }
        self.table.cmp(&other.table)
    }
}

impl fmt::Debug for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderState")
            .field("id", &self.id.0)
            .field(
                "attribs",
                &self
                    .iter()
                    .map(|entry| (&*entry.attrib, entry.priority))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cull::{OPAQUE_BIN_NAME, TRANSPARENT_BIN_NAME};
    use crate::state::attrib::CompareFunc;
    use approx::assert_relative_eq;

    fn scale(v: f32) -> RenderAttrib {
        RenderAttrib::ColorScale(LinearRgba::new(v, v, v, 1.0))
    }

    #[test]
    fn test_interning_yields_same_handle() {
        let a = RenderState::make([
            RenderAttrib::DepthWrite(DepthWriteMode::Off),
            RenderAttrib::Transparency(TransparencyMode::Alpha),
        ]);
        let b = RenderState::make([
            RenderAttrib::Transparency(TransparencyMode::Alpha),
            RenderAttrib::DepthWrite(DepthWriteMode::Off),
        ]);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_priority_is_part_of_identity() {
        let low = RenderState::make([RenderAttrib::DepthWrite(DepthWriteMode::Off)]);
        let high = RenderState::make_with_priority([RenderAttrib::DepthWrite(DepthWriteMode::Off)], 5);
        assert_ne!(low, high);
        assert_eq!(high.priority(AttribKind::DepthWrite), Some(5));
    }

    #[test]
    fn test_compose_with_empty_returns_operand() {
        let s = RenderState::make([scale(0.5)]);
        let empty = RenderState::empty();
        assert!(Arc::ptr_eq(&s.compose(&empty), &s));
        assert!(Arc::ptr_eq(&empty.compose(&s), &s));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_compose_override_is_idempotent() {
        let a = RenderState::make([RenderAttrib::Transparency(TransparencyMode::None)]);
        let b = RenderState::make([RenderAttrib::Transparency(TransparencyMode::Alpha)]);
        let once = a.compose(&b);
        let twice = once.compose(&b);
        assert!(Arc::ptr_eq(&once, &twice));
        assert_eq!(once.transparency(), Some(TransparencyMode::Alpha));
    }

    #[test]
    fn test_color_scale_accumulates() {
        let a = RenderState::make([scale(0.5)]);
        let b = RenderState::make([scale(0.5)]);
        let once = a.compose(&b);
        let twice = once.compose(&b);
        assert_relative_eq!(once.color_scale().unwrap().r, 0.25);
        assert_relative_eq!(twice.color_scale().unwrap().r, 0.125);
        assert_ne!(once, twice);
    }

    #[test]
    fn test_higher_priority_base_survives() {
        let base = RenderState::make_with_priority([RenderAttrib::DepthWrite(DepthWriteMode::Off)], 10);
        let over = RenderState::make_with_priority([RenderAttrib::DepthWrite(DepthWriteMode::On)], 3);
        let out = base.compose(&over);
        assert_eq!(out.depth_write(), Some(DepthWriteMode::Off));
        assert_eq!(out.priority(AttribKind::DepthWrite), Some(10));
    }

    #[test]
    fn test_equal_priority_override_wins() {
        let base = RenderState::make_with_priority([RenderAttrib::DepthWrite(DepthWriteMode::Off)], 3);
        let over = RenderState::make_with_priority([RenderAttrib::DepthWrite(DepthWriteMode::On)], 3);
        assert_eq!(base.compose(&over).depth_write(), Some(DepthWriteMode::On));
    }

    #[test]
    fn test_compose_is_memoised() {
        let a = RenderState::make([RenderAttrib::alpha_test(CompareFunc::Greater, 0.25)]);
        let b = RenderState::make([RenderAttrib::DepthWrite(DepthWriteMode::Off)]);
        let first = a.compose(&b);
        let second = a.compose(&b);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_add_attrib_shares_unchanged_payloads() {
        let base = RenderState::make([
            RenderAttrib::Texture(TextureAttrib::new([crate::state::TextureId(7)])),
            RenderAttrib::DepthWrite(DepthWriteMode::On),
        ]);
        let changed = base.add_attrib(RenderAttrib::DepthWrite(DepthWriteMode::Off));
        let before = &base.entry(AttribKind::Texture).unwrap().attrib;
        let after = &changed.entry(AttribKind::Texture).unwrap().attrib;
        assert!(Arc::ptr_eq(before, after));
        assert_eq!(changed.depth_write(), Some(DepthWriteMode::Off));
    }

    #[test]
    fn test_add_attrib_respects_existing_priority() {
        let base = RenderState::make_with_priority([RenderAttrib::DepthWrite(DepthWriteMode::Off)], MAX_PRIORITY);
        let same = base.add_attrib(RenderAttrib::DepthWrite(DepthWriteMode::On));
        assert!(Arc::ptr_eq(&base, &same));
    }

    #[test]
    fn test_remove_attrib() {
        let base = RenderState::make([
            RenderAttrib::DepthWrite(DepthWriteMode::Off),
            scale(0.5),
        ]);
        let removed = base.remove_attrib(AttribKind::ColorScale);
        assert_eq!(removed.len(), 1);
        assert!(!removed.has(AttribKind::ColorScale));
        assert!(Arc::ptr_eq(&removed.remove_attrib(AttribKind::Fog), &removed));
    }

    #[test]
    fn test_bin_assignment_derivation() {
        let opaque = RenderState::make([RenderAttrib::Transparency(TransparencyMode::Binary)]);
        assert_eq!(&*opaque.bin_assignment().name, OPAQUE_BIN_NAME);

        let blended = RenderState::make([RenderAttrib::Transparency(TransparencyMode::Multisample)]);
        assert_eq!(&*blended.bin_assignment().name, TRANSPARENT_BIN_NAME);

        let explicit = blended.add_attrib(RenderAttrib::cull_bin("fixed", 7));
        assert_eq!(&*explicit.bin_assignment().name, "fixed");
        assert_eq!(explicit.bin_assignment().draw_order, 7);

        let empty_name = blended.add_attrib(RenderAttrib::cull_bin("", 3));
        assert_eq!(&*empty_name.bin_assignment().name, TRANSPARENT_BIN_NAME);
        assert!(!empty_name.has_explicit_bin());
    }

    #[test]
    fn test_ordering_is_content_based() {
        let a = RenderState::make([RenderAttrib::alpha_test(CompareFunc::Greater, 0.0)]);
        let b = RenderState::make([RenderAttrib::alpha_test(CompareFunc::GreaterEqual, 0.5)]);
        assert_eq!(a.cmp(&b), Ordering::Less);
        assert_eq!(b.cmp(&a), Ordering::Greater);
        assert_eq!(a.cmp(&a), Ordering::Equal);
    }
}
