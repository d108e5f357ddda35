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

//! A single rendering pass and the per-state munger memo it carries across frames.

use super::CullableObject;
use ahash::AHashMap;
use ordo_core::cull::{BinIndex, BinType};
use ordo_core::geom::GeomMunger;
use ordo_core::math::LinearRgba;
use ordo_core::renderer::{FrameContext, GraphicsStateGuardian, RenderError, SceneSetup};
use ordo_core::state::{RenderState, StateId};
use ordo_telemetry::BinCollector;
use std::sync::{Arc, Mutex, PoisonError};

/// The cache is flushed when it grows past this many states.
const MAX_CACHED_MUNGERS: usize = 4096;

/// Remembers the munger the backend produced for each render state.
///
/// A bin and its successor from [`CullBin::make_next`] share the same cache,
/// so a state seen on one frame is not re-negotiated with the backend on the
/// next.
#[derive(Debug, Default)]
pub struct BinCache {
    mungers: Mutex<AHashMap<StateId, Arc<GeomMunger>>>,
}

impl BinCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the munger for `state`, asking `gsg` on a miss.
    pub fn get_munger(&self, state: &RenderState, gsg: &dyn GraphicsStateGuardian) -> Arc<GeomMunger> {
        let mut mungers = self.mungers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(munger) = mungers.get(&state.id()) {
            return Arc::clone(munger);
        }
        if mungers.len() >= MAX_CACHED_MUNGERS {
            log::debug!("Munger cache full ({} entries), flushing", mungers.len());
            mungers.clear();
        }
        let munger = Arc::new(gsg.make_geom_munger(state));
        mungers.insert(state.id(), Arc::clone(&munger));
        munger
    }

    /// The number of cached mungers.
    pub fn len(&self) -> usize {
        self.mungers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every cached munger.
    pub fn clear(&self) {
        self.mungers.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// The objects of one bin for one frame, sorted and drawn as a group.
#[derive(Debug)]
pub struct CullBin {
    name: Arc<str>,
    index: BinIndex,
    bin_type: BinType,
    flash_color: Option<LinearRgba>,
    gsg: Arc<dyn GraphicsStateGuardian>,
    collector: Option<BinCollector>,
    cache: Arc<BinCache>,
    objects: Vec<CullableObject>,
}

impl CullBin {
    /// Creates an empty bin with a fresh cache.
    pub fn new(
        name: Arc<str>,
        index: BinIndex,
        bin_type: BinType,
        gsg: Arc<dyn GraphicsStateGuardian>,
    ) -> Self {
        Self {
            name,
            index,
            bin_type,
            flash_color: None,
            gsg,
            collector: None,
            cache: Arc::new(BinCache::new()),
            objects: Vec::new(),
        }
    }

    /// Sets the color objects are flashed with while debugging this bin.
    pub fn with_flash_color(mut self, color: Option<LinearRgba>) -> Self {
        self.flash_color = color;
        self
    }

    /// Attaches the performance collector of this bin.
    pub fn with_collector(mut self, collector: Option<BinCollector>) -> Self {
        self.collector = collector;
        self
    }

    /// The registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registered index.
    pub fn index(&self) -> BinIndex {
        self.index
    }

    /// The sorting strategy.
    pub fn bin_type(&self) -> BinType {
        self.bin_type
    }

    /// The debug flash color, if any.
    pub fn flash_color(&self) -> Option<LinearRgba> {
        self.flash_color
    }

    /// Replaces the debug flash color of a live bin.
    pub fn set_flash_color(&mut self, color: Option<LinearRgba>) {
        if self.flash_color != color {
            log::debug!("Bin '{}' flash color is now {color:?}", self.name);
            self.flash_color = color;
        }
    }

    /// The munger cache shared with successor bins.
    pub fn cache(&self) -> &Arc<BinCache> {
        &self.cache
    }

    /// The objects in their current order.
    pub fn objects(&self) -> &[CullableObject] {
        &self.objects
    }

    /// The number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the bin holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Takes ownership of `object`, returning its admission slot.
    ///
    /// Slots are valid until [`CullBin::finish_cull`] reorders the bin.
    pub fn add_object(&mut self, object: CullableObject) -> usize {
        self.objects.push(object);
        if let Some(collector) = &self.collector {
            collector.record_admitted();
        }
        self.objects.len() - 1
    }

    /// Sorts the objects for drawing.
    ///
    /// Every sort is stable, so ties not broken by geometry id keep
    /// admission order.
    pub fn finish_cull(&mut self, scene: &SceneSetup, frame: &FrameContext) {
        match self.bin_type {
            BinType::Unsorted => {}
            BinType::StateSorted => self
                .objects
                .sort_by(|a, b| a.state.cmp(&b.state).then(a.geom.id().cmp(&b.geom.id()))),
            BinType::BackToFront => self.sort_by_depth(scene, true),
            BinType::FrontToBack => self.sort_by_depth(scene, false),
            BinType::Fixed => self
                .objects
                .sort_by_key(|object| object.state.bin_assignment().draw_order),
        }
        log::trace!(
            "Bin '{}' finished cull with {} objects (frame {})",
            self.name,
            self.objects.len(),
            frame.frame_number
        );
    }

    fn sort_by_depth(&mut self, scene: &SceneSetup, farthest_first: bool) {
        let mut keyed: Vec<(f32, CullableObject)> = self
            .objects
            .drain(..)
            .map(|object| (object.view_depth(scene), object))
            .collect();
        keyed.sort_by(|(da, a), (db, b)| {
            let depth = if farthest_first {
                db.total_cmp(da)
            } else {
                da.total_cmp(db)
            };
            depth.then(a.geom.id().cmp(&b.geom.id()))
        });
        self.objects = keyed.into_iter().map(|(_, object)| object).collect();
    }

    /// Submits every object to the guardian in the current order.
    ///
    /// The first backend failure aborts the bin and is returned.
    pub fn draw(&self, frame: &FrameContext) -> Result<(), RenderError> {
        if self.objects.is_empty() {
            return Ok(());
        }
        let _timer = self.collector.as_ref().map(BinCollector::draw_timer);
        for object in &self.objects {
            self.gsg.set_state_and_transform(&object.state, &object.transform);
            if let Err(e) = self.gsg.draw_geom(&object.geom, frame) {
                log::error!("Drawing bin '{}' failed: {e}", self.name);
                return Err(e);
            }
        }
        if let Some(collector) = &self.collector {
            collector.record_drawn(self.objects.len());
        }
        log::trace!(
            "Drew {} objects from bin '{}' (frame {})",
            self.objects.len(),
            self.name,
            frame.frame_number
        );
        Ok(())
    }

    /// Returns an empty bin for the next frame, sharing configuration and cache.
    pub fn make_next(&self) -> CullBin {
        CullBin {
            name: Arc::clone(&self.name),
            index: self.index,
            bin_type: self.bin_type,
            flash_color: self.flash_color,
            gsg: Arc::clone(&self.gsg),
            collector: self.collector.clone(),
            cache: Arc::clone(&self.cache),
            objects: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cull_lane::test_support::{object_at, RecordingGsg};
    use ordo_core::state::RenderAttrib;

    fn bin(bin_type: BinType, gsg: &Arc<RecordingGsg>) -> CullBin {
        let gsg: Arc<dyn GraphicsStateGuardian> = gsg.clone();
        CullBin::new(Arc::from("test"), BinIndex(0), bin_type, gsg)
    }

    fn ids(bin: &CullBin) -> Vec<u64> {
        bin.objects().iter().map(|o| o.geom.id().0).collect()
    }

    #[test]
    fn test_back_to_front_sorts_farthest_first() {
        let gsg = Arc::new(RecordingGsg::default());
        let mut bin = bin(BinType::BackToFront, &gsg);
        bin.add_object(object_at(1, -2.0, RenderState::empty()));
        bin.add_object(object_at(2, -8.0, RenderState::empty()));
        bin.add_object(object_at(3, -5.0, RenderState::empty()));
        bin.add_object(object_at(0, -5.0, RenderState::empty()));
        bin.finish_cull(&SceneSetup::default(), &FrameContext::new(0));
        assert_eq!(ids(&bin), vec![2, 0, 3, 1]);
    }

    #[test]
    fn test_front_to_back_sorts_nearest_first() {
        let gsg = Arc::new(RecordingGsg::default());
        let mut bin = bin(BinType::FrontToBack, &gsg);
        bin.add_object(object_at(1, -8.0, RenderState::empty()));
        bin.add_object(object_at(2, -2.0, RenderState::empty()));
        bin.finish_cull(&SceneSetup::default(), &FrameContext::new(0));
        assert_eq!(ids(&bin), vec![2, 1]);
    }

    #[test]
    fn test_fixed_sorts_by_draw_order_then_admission() {
        let gsg = Arc::new(RecordingGsg::default());
        let mut bin = bin(BinType::Fixed, &gsg);
        let order = |n| RenderState::make([RenderAttrib::cull_bin("fixed", n)]);
        bin.add_object(object_at(1, 0.0, order(5)));
        bin.add_object(object_at(2, 0.0, order(1)));
        bin.add_object(object_at(3, 0.0, order(5)));
        bin.add_object(object_at(0, 0.0, order(1)));
        bin.finish_cull(&SceneSetup::default(), &FrameContext::new(0));
        assert_eq!(ids(&bin), vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_state_sorted_groups_equal_states() {
        let gsg = Arc::new(RecordingGsg::default());
        let mut bin = bin(BinType::StateSorted, &gsg);
        let a = RenderState::make([RenderAttrib::cull_bin("opaque", 1)]);
        let b = RenderState::make([RenderAttrib::cull_bin("opaque", 2)]);
        bin.add_object(object_at(4, 0.0, a.clone()));
        bin.add_object(object_at(3, 0.0, b.clone()));
        bin.add_object(object_at(2, 0.0, a.clone()));
        bin.add_object(object_at(1, 0.0, b.clone()));
        bin.finish_cull(&SceneSetup::default(), &FrameContext::new(0));
        let states: Vec<_> = bin.objects().iter().map(|o| o.state.id()).collect();
        assert_eq!(states[0], states[1]);
        assert_eq!(states[2], states[3]);
        assert_ne!(states[1], states[2]);
        assert!(bin.objects()[0].geom.id() < bin.objects()[1].geom.id());
    }

    #[test]
    fn test_unsorted_keeps_admission_order() {
        let gsg = Arc::new(RecordingGsg::default());
        let mut bin = bin(BinType::Unsorted, &gsg);
        for id in [3, 1, 2] {
            bin.add_object(object_at(id, id as f32, RenderState::empty()));
        }
        bin.finish_cull(&SceneSetup::default(), &FrameContext::new(0));
        assert_eq!(ids(&bin), vec![3, 1, 2]);
    }

    #[test]
    fn test_draw_submits_state_then_geom() {
        let gsg = Arc::new(RecordingGsg::default());
        let mut bin = bin(BinType::Unsorted, &gsg);
        bin.add_object(object_at(7, 0.0, RenderState::empty()));
        bin.draw(&FrameContext::new(0)).unwrap();
        assert_eq!(gsg.drawn(), vec![7]);
        assert_eq!(gsg.state_changes(), 1);
    }

    #[test]
    fn test_empty_bin_draw_is_a_no_op() {
        let gsg = Arc::new(RecordingGsg::default());
        bin(BinType::Unsorted, &gsg).draw(&FrameContext::new(0)).unwrap();
        assert_eq!(gsg.state_changes(), 0);
    }

    #[test]
    fn test_draw_failure_propagates() {
        let gsg = Arc::new(RecordingGsg::failing());
        let mut bin = bin(BinType::Unsorted, &gsg);
        bin.add_object(object_at(1, 0.0, RenderState::empty()));
        assert!(bin.draw(&FrameContext::new(0)).is_err());
    }

    #[test]
    fn test_make_next_shares_cache_and_empties() {
        let gsg = Arc::new(RecordingGsg::default());
        let mut bin = bin(BinType::BackToFront, &gsg).with_flash_color(Some(LinearRgba::RED));
        bin.add_object(object_at(1, 0.0, RenderState::empty()));
        let next = bin.make_next();
        assert!(next.is_empty());
        assert!(Arc::ptr_eq(next.cache(), bin.cache()));
        assert_eq!(next.bin_type(), BinType::BackToFront);
        assert_eq!(next.flash_color(), Some(LinearRgba::RED));
    }

    #[test]
    fn test_cache_asks_backend_once_per_state() {
        let gsg = RecordingGsg::default();
        let cache = BinCache::new();
        let state = RenderState::make([RenderAttrib::cull_bin("x", 3)]);
        let first = cache.get_munger(&state, &gsg);
        let second = cache.get_munger(&state, &gsg);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(gsg.mungers_made(), 1);
        assert_eq!(cache.len(), 1);
    }
}
