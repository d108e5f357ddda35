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

//! The per-frame product of the cull traversal.
//!
//! Objects handed to [`CullResult::add_object`] are rewritten for their
//! transparency mode, assigned to a bin and adapted for the backend. At the
//! end of cull every bin is sorted, and [`CullResult::draw`] submits the bins
//! in the manager's draw order. [`CullResult::make_next`] hands the bins'
//! caches over to the next frame.

use super::transparency::{
    alpha_state, binary_state, dual_opaque_state, dual_transparent_state, flash_recolor,
    is_flash_frame,
};
use super::{CullBin, CullBinManager, CullableObject};
use ordo_core::cull::{flash, BinEvent, BinIndex, CullConfig};
use ordo_core::math::LinearRgba;
use ordo_core::renderer::{FrameContext, GraphicsStateGuardian, RenderError, SceneSetup};
use ordo_core::state::{RenderState, TransparencyMode};
use ordo_core::FrameClock;
use ordo_telemetry::{CullCollectors, DropReason};
use smallvec::SmallVec;
use std::sync::Arc;

/// Where an admitted object landed.
///
/// The slot stays valid until the bin is sorted by
/// [`CullResult::finish_cull`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionHandle {
    /// The bin the object was added to.
    pub bin: BinIndex,
    /// The position of the object in the bin.
    pub slot: usize,
}

/// The copies of one object that were admitted: none if it was dropped, two
/// if it was split for dual-pass transparency.
pub type Admission = SmallVec<[AdmissionHandle; 2]>;

/// The binned objects of one frame.
#[derive(Debug)]
pub struct CullResult {
    gsg: Arc<dyn GraphicsStateGuardian>,
    manager: Arc<CullBinManager>,
    config: Arc<CullConfig>,
    clock: Arc<dyn FrameClock>,
    collectors: CullCollectors,
    bins: Vec<Option<CullBin>>,
    events: flume::Receiver<BinEvent>,
}

impl CullResult {
    /// Creates an empty result drawing through `gsg`.
    pub fn new(
        gsg: Arc<dyn GraphicsStateGuardian>,
        manager: Arc<CullBinManager>,
        config: Arc<CullConfig>,
        clock: Arc<dyn FrameClock>,
        collectors: CullCollectors,
    ) -> Self {
        let events = manager.subscribe();
        Self {
            gsg,
            manager,
            config,
            clock,
            collectors,
            bins: Vec::new(),
            events,
        }
    }

    /// Returns an empty result for the next frame.
    ///
    /// Bins whose type still matches the manager are carried over empty,
    /// keeping their munger caches; the others are recreated on demand.
    pub fn make_next(&self) -> CullResult {
        let mut next = CullResult::new(
            Arc::clone(&self.gsg),
            Arc::clone(&self.manager),
            Arc::clone(&self.config),
            Arc::clone(&self.clock),
            self.collectors.clone(),
        );
        next.bins = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.as_ref()
                    .filter(|bin| self.manager.bin_type(BinIndex(i)) == Some(bin.bin_type()))
                    .map(CullBin::make_next)
            })
            .collect();
        next
    }

    /// Adds one object to the frame.
    ///
    /// The object may be rewritten, split in two or dropped; the returned
    /// admission lists the copies that made it into a bin.
    pub fn add_object(&mut self, mut object: CullableObject, frame: &FrameContext) -> Admission {
        self.process_bin_events();
        let mut admission = Admission::new();

        match object.state.transparency() {
            Some(TransparencyMode::Alpha) => {
                object.state = object.state.compose(&alpha_state());
                self.check_flash_transparency(&mut object, flash::ALPHA);
            }
            Some(TransparencyMode::Binary) => {
                object.state = object.state.compose(&binary_state());
                self.check_flash_transparency(&mut object, flash::BINARY);
            }
            Some(TransparencyMode::Multisample | TransparencyMode::MultisampleMask) => {
                if !self.gsg.supports_multisample() {
                    object.state = object.state.compose(&binary_state());
                }
                self.check_flash_transparency(&mut object, flash::MULTISAMPLE);
            }
            Some(TransparencyMode::Dual) => {
                self.check_flash_transparency(&mut object, flash::DUAL);
                // With dual-pass off the object is blended in one pass, like
                // plain alpha.
                if self.config.m_dual {
                    if !object.state.has_explicit_bin() {
                        self.split_dual(object, frame, &mut admission);
                        return admission;
                    }
                    object.state = object.state.compose(&alpha_state());
                }
            }
            Some(TransparencyMode::None) | None => {}
        }

        self.admit(object, frame, &mut admission);
        admission
    }

    fn split_dual(&mut self, mut object: CullableObject, frame: &FrameContext, admission: &mut Admission) {
        let flashing = self.config.m_dual_flash && is_flash_frame(self.clock.as_ref());
        self.collectors.record_dual_split();

        if self.config.m_dual_transparent {
            let mut transparent = object.clone();
            transparent.state = transparent
                .state
                .compose(&dual_transparent_state(object.has_decals, flashing));
            self.admit(transparent, frame, admission);
        }

        object.state = object.state.compose(&dual_opaque_state(flashing));
        if !self.config.m_dual_opaque {
            self.collectors.record_drop(DropReason::DualOpaqueDisabled);
            return;
        }
        self.admit(object, frame, admission);
    }

    fn check_flash_transparency(&self, object: &mut CullableObject, color: LinearRgba) {
        if self.config.show_transparency && is_flash_frame(self.clock.as_ref()) {
            object.state = flash_recolor(&object.state, color);
        }
    }

    fn admit(&mut self, mut object: CullableObject, frame: &FrameContext, admission: &mut Admission) {
        let (index, bin) = bin_slot(
            &mut self.bins,
            &self.manager,
            &self.gsg,
            &self.collectors,
            &object.state,
        );

        let flash_color = self.manager.bin_flash_color(index);
        bin.set_flash_color(flash_color);
        if let Some(color) = flash_color {
            if is_flash_frame(self.clock.as_ref()) {
                object.state = flash_recolor(&object.state, color);
            }
        }

        let munger = bin.cache().get_munger(&object.state, self.gsg.as_ref());
        let force = !self.config.allow_incomplete_render;
        if let Err(reason) = object.munge_geom(&munger, force) {
            log::trace!(
                "Dropping geometry {:?} (frame {}): {reason:?}",
                object.geom.id(),
                frame.frame_number
            );
            self.collectors.record_drop(reason);
            return;
        }

        let slot = bin.add_object(object);
        admission.push(AdmissionHandle { bin: index, slot });
    }

    /// Sorts every bin. Bins the manager deactivated are discarded.
    pub fn finish_cull(&mut self, scene: &SceneSetup, frame: &FrameContext) {
        self.process_bin_events();
        for (i, slot) in self.bins.iter_mut().enumerate() {
            let Some(bin) = slot else { continue };
            if self.manager.bin_active(BinIndex(i)) == Some(true) {
                bin.finish_cull(scene, frame);
            } else {
                log::debug!("Discarding inactive bin '{}'", bin.name());
                *slot = None;
            }
        }
        log::debug!(
            "Cull finished for frame {}: {} objects in {} bins",
            frame.frame_number,
            self.num_objects(),
            self.bins.iter().flatten().count()
        );
    }

    /// Draws every bin in the manager's draw order.
    pub fn draw(&mut self, frame: &FrameContext) -> Result<(), RenderError> {
        self.process_bin_events();
        for index in self.manager.draw_order() {
            if let Some(Some(bin)) = self.bins.get(index.0) {
                bin.draw(frame)?;
            }
        }
        Ok(())
    }

    /// Forgets the cached bin for `index`. The slot is rebuilt on demand if
    /// the manager still knows the bin.
    pub fn bin_removed(&mut self, index: BinIndex) {
        if let Some(slot) = self.bins.get_mut(index.0) {
            *slot = None;
        }
    }

    /// Applies pending manager events. Returns the number handled.
    pub fn process_bin_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            log::debug!("Cull result received {event:?}");
            self.bin_removed(event.index());
            handled += 1;
        }
        handled
    }

    /// The bin cached for `index`, if any.
    pub fn bin(&self, index: BinIndex) -> Option<&CullBin> {
        self.bins.get(index.0).and_then(Option::as_ref)
    }

    /// The bin cached for `name`, if any.
    pub fn bin_named(&self, name: &str) -> Option<&CullBin> {
        self.bin(self.manager.find_bin(name)?)
    }

    /// The total number of binned objects.
    pub fn num_objects(&self) -> usize {
        self.bins.iter().flatten().map(CullBin::len).sum()
    }

    /// The guardian the result draws through.
    pub fn gsg(&self) -> &Arc<dyn GraphicsStateGuardian> {
        &self.gsg
    }

    /// The bin manager.
    pub fn manager(&self) -> &Arc<CullBinManager> {
        &self.manager
    }

    /// The collectors shared by the result's bins.
    pub fn collectors(&self) -> &CullCollectors {
        &self.collectors
    }
}

/// Resolves the bin for `state` and returns it, creating it if this result
/// has not used it yet.
///
/// A bin removed by another thread between resolution and creation is
/// resolved again; the retired index never comes back.
fn bin_slot<'a>(
    bins: &'a mut Vec<Option<CullBin>>,
    manager: &CullBinManager,
    gsg: &Arc<dyn GraphicsStateGuardian>,
    collectors: &CullCollectors,
    state: &RenderState,
) -> (BinIndex, &'a mut CullBin) {
    let mut index = manager.resolve_bin(state);
    loop {
        if bins.len() <= index.0 {
            bins.resize_with(index.0 + 1, || None);
        }
        if bins[index.0].is_some() {
            break;
        }
        match manager.make_new_bin(index, gsg, collectors) {
            Some(bin) => {
                bins[index.0] = Some(bin);
                break;
            }
            None => {
                let retry = manager.resolve_bin(state);
                if retry == index {
                    panic!("bin {index:?} was resolved but is not registered");
                }
                log::debug!("Bin {index:?} was removed while resolving, using {retry:?}");
                index = retry;
            }
        }
    }
    match bins[index.0].as_mut() {
        Some(bin) => (index, bin),
        None => unreachable!("bin slot {index:?} was filled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cull_lane::test_support::{object_at, RecordingGsg};
    use crate::cull_lane::transparency::DUAL_OPAQUE_LEVEL;
    use ordo_core::cull::BinType;
    use ordo_core::state::{
        AlphaTestAttrib, ColorAttrib, CompareFunc, DepthWriteMode, RenderAttrib, RenderState,
    };
    use ordo_core::ManualClock;
    use ordo_telemetry::MetricsRegistry;

    struct Fixture {
        gsg: Arc<RecordingGsg>,
        manager: Arc<CullBinManager>,
        clock: Arc<ManualClock>,
    }

    impl Fixture {
        fn new(gsg: RecordingGsg) -> Self {
            Self {
                gsg: Arc::new(gsg),
                manager: Arc::new(CullBinManager::with_default_bins()),
                clock: Arc::new(ManualClock::new(0.5)),
            }
        }

        fn result(&self, config: CullConfig) -> CullResult {
            let collectors = CullCollectors::new(Arc::new(MetricsRegistry::new())).unwrap();
            CullResult::new(
                self.gsg.clone(),
                self.manager.clone(),
                Arc::new(config),
                self.clock.clone(),
                collectors,
            )
        }
    }

    fn with(mode: TransparencyMode) -> Arc<RenderState> {
        RenderState::make([RenderAttrib::Transparency(mode)])
    }

    fn alpha_test_of(result: &CullResult, bin: &str) -> AlphaTestAttrib {
        *result.bin_named(bin).unwrap().objects()[0]
            .state
            .alpha_test()
            .unwrap()
    }

    fn color_scale_of(result: &CullResult, bin: &str) -> Option<LinearRgba> {
        result.bin_named(bin).unwrap().objects()[0].state.color_scale()
    }

    #[test]
    fn test_alpha_goes_to_transparent_with_alpha_test() {
        let fx = Fixture::new(RecordingGsg::default());
        let mut result = fx.result(CullConfig::default());
        let admission = result.add_object(object_at(1, -1.0, with(TransparencyMode::Alpha)), &FrameContext::new(0));
        assert_eq!(admission.len(), 1);
        let bin = result.bin(admission[0].bin).unwrap();
        assert_eq!(bin.name(), "transparent");
        assert!(bin.objects()[0].state.alpha_test().is_some());
    }

    #[test]
    fn test_multisample_without_support_matches_binary() {
        let fx = Fixture::new(RecordingGsg::default());
        let mut result = fx.result(CullConfig::default());
        let frame = FrameContext::new(0);
        let a = result.add_object(object_at(1, 0.0, with(TransparencyMode::Multisample)), &frame);
        let b = result.add_object(object_at(2, 0.0, with(TransparencyMode::Binary)), &frame);
        let state_of = |h: &AdmissionHandle| {
            Arc::clone(&result.bin(h.bin).unwrap().objects()[h.slot].state)
        };
        assert!(Arc::ptr_eq(&state_of(&a[0]), &state_of(&b[0])));
        assert_eq!(a[0].bin, b[0].bin);
    }

    #[test]
    fn test_multisample_with_support_is_unchanged() {
        let fx = Fixture::new(RecordingGsg::multisample());
        let mut result = fx.result(CullConfig::default());
        let state = with(TransparencyMode::Multisample);
        let a = result.add_object(object_at(1, 0.0, state.clone()), &FrameContext::new(0));
        let admitted = &result.bin(a[0].bin).unwrap().objects()[a[0].slot];
        assert!(Arc::ptr_eq(&admitted.state, &state));
        assert_eq!(result.bin(a[0].bin).unwrap().name(), "transparent");
    }

    #[test]
    fn test_dual_split_produces_two_copies() {
        let fx = Fixture::new(RecordingGsg::default());
        let mut result = fx.result(CullConfig::default());
        let admission = result.add_object(object_at(1, 0.0, with(TransparencyMode::Dual)), &FrameContext::new(0));
        assert_eq!(admission.len(), 2);
        assert_eq!(result.num_objects(), 2);

        let transparent = result.bin_named("transparent").unwrap();
        let opaque = result.bin_named("opaque").unwrap();
        assert_eq!(transparent.objects()[0].state.depth_write(), Some(DepthWriteMode::Off));
        assert_eq!(opaque.objects()[0].state.depth_write(), None);
        assert_eq!(result.collectors().dual_splits(), 1);
    }

    #[test]
    fn test_dual_with_explicit_bin_is_not_split() {
        let fx = Fixture::new(RecordingGsg::default());
        let mut result = fx.result(CullConfig::default());
        let state = RenderState::make([
            RenderAttrib::Transparency(TransparencyMode::Dual),
            RenderAttrib::cull_bin("fixed", 3),
        ]);
        let admission = result.add_object(object_at(1, 0.0, state), &FrameContext::new(0));
        assert_eq!(admission.len(), 1);
        let bin = result.bin_named("fixed").unwrap();
        assert!(bin.objects()[0].state.alpha_test().is_some());
        assert_eq!(result.collectors().dual_splits(), 0);
    }

    #[test]
    fn test_dual_disabled_admits_unchanged() {
        let fx = Fixture::new(RecordingGsg::default());
        let config = CullConfig {
            m_dual: false,
            ..CullConfig::default()
        };
        let mut result = fx.result(config);
        let state = with(TransparencyMode::Dual);
        let admission = result.add_object(object_at(1, 0.0, state.clone()), &FrameContext::new(0));
        assert_eq!(admission.len(), 1);
        let bin = result.bin(admission[0].bin).unwrap();
        assert_eq!(bin.name(), "transparent");
        assert!(Arc::ptr_eq(&bin.objects()[0].state, &state));
    }

    #[test]
    fn test_dual_opaque_disabled_keeps_only_transparent_copy() {
        let fx = Fixture::new(RecordingGsg::default());
        let config = CullConfig {
            m_dual_opaque: false,
            ..CullConfig::default()
        };
        let mut result = fx.result(config);
        let admission = result.add_object(object_at(1, 0.0, with(TransparencyMode::Dual)), &FrameContext::new(0));
        assert_eq!(admission.len(), 1);
        assert_eq!(result.bin(admission[0].bin).unwrap().name(), "transparent");
        assert_eq!(result.collectors().dropped(DropReason::DualOpaqueDisabled), 1);
    }

    #[test]
    fn test_non_resident_dropped_only_when_incomplete_allowed() {
        let fx = Fixture::new(RecordingGsg::default());
        let frame = FrameContext::new(0);
        let lazy = || {
            let object = object_at(9, 0.0, RenderState::empty());
            object.geom.set_resident(false);
            object
        };

        let mut forced = fx.result(CullConfig::default());
        assert_eq!(forced.add_object(lazy(), &frame).len(), 1);

        let mut incomplete = fx.result(CullConfig {
            allow_incomplete_render: true,
            ..CullConfig::default()
        });
        assert!(incomplete.add_object(lazy(), &frame).is_empty());
        assert_eq!(incomplete.collectors().dropped(DropReason::NotResident), 1);
    }

    #[test]
    fn test_show_transparency_flashes_on_even_cycles() {
        let fx = Fixture::new(RecordingGsg::default());
        let config = CullConfig {
            show_transparency: true,
            ..CullConfig::default()
        };
        let mut result = fx.result(config);
        let frame = FrameContext::new(0);

        let on = result.add_object(object_at(1, 0.0, with(TransparencyMode::Alpha)), &frame);
        fx.clock.set(1.5);
        let off = result.add_object(object_at(2, 0.0, with(TransparencyMode::Alpha)), &frame);

        let bin = result.bin(on[0].bin).unwrap();
        assert_eq!(
            bin.objects()[on[0].slot].state.color(),
            Some(&ColorAttrib::Flat(flash::ALPHA))
        );
        assert_eq!(bin.objects()[off[0].slot].state.color(), None);
    }

    #[test]
    fn test_bin_flash_color_recolors_every_object() {
        let fx = Fixture::new(RecordingGsg::default());
        let opaque = fx.manager.find_bin("opaque").unwrap();
        fx.manager.set_bin_flash_color(opaque, Some(LinearRgba::BLUE));
        let mut result = fx.result(CullConfig::default());
        let admission = result.add_object(object_at(1, 0.0, RenderState::empty()), &FrameContext::new(0));
        let object = &result.bin(opaque).unwrap().objects()[admission[0].slot];
        assert_eq!(object.state.color(), Some(&ColorAttrib::Flat(LinearRgba::BLUE)));
    }

    #[test]
    fn test_removed_bin_is_never_touched_again() {
        let fx = Fixture::new(RecordingGsg::default());
        let mut result = fx.result(CullConfig::default());
        let frame = FrameContext::new(0);
        let hud = fx.manager.add_bin("hud", BinType::Unsorted, 60);
        let hud_state = RenderState::make([RenderAttrib::cull_bin("hud", 0)]);

        result.add_object(object_at(1, 0.0, hud_state.clone()), &frame);
        assert!(result.bin(hud).is_some());

        fx.manager.remove_bin(hud);
        let admission = result.add_object(object_at(2, 0.0, hud_state), &frame);
        assert!(result.bin(hud).is_none());
        assert_ne!(admission[0].bin, hud);

        result.finish_cull(&SceneSetup::default(), &frame);
        result.draw(&frame).unwrap();
        assert!(result.bin(hud).is_none());
        assert_eq!(fx.gsg.drawn(), vec![2]);
    }

    #[test]
    fn test_inactive_bins_are_discarded_at_finish() {
        let fx = Fixture::new(RecordingGsg::default());
        let mut result = fx.result(CullConfig::default());
        let frame = FrameContext::new(0);
        let admission = result.add_object(object_at(1, 0.0, RenderState::empty()), &frame);
        fx.manager.set_bin_active(admission[0].bin, false);
        result.finish_cull(&SceneSetup::default(), &frame);
        assert!(result.bin(admission[0].bin).is_none());
    }

    #[test]
    fn test_make_next_drops_retyped_bins() {
        let fx = Fixture::new(RecordingGsg::default());
        let mut result = fx.result(CullConfig::default());
        let frame = FrameContext::new(0);
        let opaque = result.add_object(object_at(1, 0.0, RenderState::empty()), &frame)[0].bin;
        let transparent = result.add_object(object_at(2, 0.0, with(TransparencyMode::Alpha)), &frame)[0].bin;

        fx.manager.set_bin_type(transparent, BinType::FrontToBack);
        let next = result.make_next();
        assert!(next.bin(transparent).is_none());
        let carried = next.bin(opaque).unwrap();
        assert!(carried.is_empty());
        assert!(Arc::ptr_eq(carried.cache(), result.bin(opaque).unwrap().cache()));
    }

    #[test]
    fn test_dual_split_with_decals_keeps_opaque_fragments_out_of_transparent_pass() {
        let fx = Fixture::new(RecordingGsg::default());
        let mut result = fx.result(CullConfig::default());
        let object = object_at(1, 0.0, with(TransparencyMode::Dual)).with_decals(true);
        assert_eq!(result.add_object(object, &FrameContext::new(0)).len(), 2);

        let transparent = alpha_test_of(&result, "transparent");
        let opaque = alpha_test_of(&result, "opaque");
        assert_eq!(transparent.func, CompareFunc::Less);
        assert_eq!(transparent.reference, DUAL_OPAQUE_LEVEL);
        assert_eq!(opaque.func, CompareFunc::GreaterEqual);
        assert_eq!(opaque.reference, DUAL_OPAQUE_LEVEL);

        // Every alpha is drawn by exactly one of the two passes.
        for alpha in [0.0, 0.5, DUAL_OPAQUE_LEVEL, 1.0] {
            assert_ne!(transparent.passes(alpha), opaque.passes(alpha));
        }
        assert!(opaque.passes(DUAL_OPAQUE_LEVEL));
    }

    #[test]
    fn test_dual_flash_tints_both_copies_on_even_cycles() {
        let fx = Fixture::new(RecordingGsg::default());
        let config = CullConfig {
            m_dual_flash: true,
            ..CullConfig::default()
        };
        let frame = FrameContext::new(0);

        let mut flashing = fx.result(config.clone());
        flashing.add_object(object_at(1, 0.0, with(TransparencyMode::Dual)), &frame);
        assert_eq!(
            color_scale_of(&flashing, "transparent"),
            Some(LinearRgba::new(0.8, 0.2, 0.2, 1.0))
        );
        assert_eq!(
            color_scale_of(&flashing, "opaque"),
            Some(LinearRgba::new(0.2, 0.2, 0.8, 1.0))
        );
        let transparent = alpha_test_of(&flashing, "transparent");
        assert_eq!(transparent.func, CompareFunc::Less);
        assert_eq!(transparent.reference, 1.0);

        fx.clock.set(1.5);
        let mut steady = fx.result(config);
        steady.add_object(object_at(2, 0.0, with(TransparencyMode::Dual)), &frame);
        assert_eq!(color_scale_of(&steady, "transparent"), None);
        assert_eq!(color_scale_of(&steady, "opaque"), None);
        assert_eq!(alpha_test_of(&steady, "transparent").func, CompareFunc::Greater);
    }

    #[test]
    fn test_dual_transparent_disabled_keeps_only_opaque_copy() {
        let fx = Fixture::new(RecordingGsg::default());
        let config = CullConfig {
            m_dual_transparent: false,
            ..CullConfig::default()
        };
        let mut result = fx.result(config);
        let admission = result.add_object(object_at(1, 0.0, with(TransparencyMode::Dual)), &FrameContext::new(0));

        assert_eq!(admission.len(), 1);
        assert_eq!(result.bin(admission[0].bin).unwrap().name(), "opaque");
        assert!(result.bin_named("transparent").is_none());
        let opaque = alpha_test_of(&result, "opaque");
        assert_eq!(opaque.func, CompareFunc::GreaterEqual);
        assert_eq!(opaque.reference, DUAL_OPAQUE_LEVEL);
        assert_eq!(result.collectors().dual_splits(), 1);
    }

    #[test]
    fn test_make_next_does_not_accumulate_subscribers() {
        let fx = Fixture::new(RecordingGsg::default());
        let mut result = fx.result(CullConfig::default());
        let frame = FrameContext::new(0);
        for _ in 0..1000 {
            result.add_object(object_at(1, 0.0, RenderState::empty()), &frame);
            result = result.make_next();
        }
        assert!(fx.manager.subscriber_count() <= 2);
    }

    #[test]
    fn test_bin_flash_color_change_reaches_next_frame() {
        let fx = Fixture::new(RecordingGsg::default());
        let opaque = fx.manager.find_bin("opaque").unwrap();
        let mut result = fx.result(CullConfig::default());
        let frame = FrameContext::new(0);
        let color_after_admit = |result: &mut CullResult| {
            let admission = result.add_object(object_at(1, 0.0, RenderState::empty()), &frame);
            result.bin(opaque).unwrap().objects()[admission[0].slot]
                .state
                .color()
                .copied()
        };

        assert_eq!(color_after_admit(&mut result), None);

        fx.manager.set_bin_flash_color(opaque, Some(LinearRgba::BLUE));
        let mut next = result.make_next();
        assert_eq!(
            color_after_admit(&mut next),
            Some(ColorAttrib::Flat(LinearRgba::BLUE))
        );
        assert_eq!(next.bin(opaque).unwrap().flash_color(), Some(LinearRgba::BLUE));

        fx.manager.set_bin_flash_color(opaque, None);
        let mut last = next.make_next();
        assert_eq!(color_after_admit(&mut last), None);
    }

    #[test]
    fn test_bins_removed_concurrently_are_resolved_again() {
        let fx = Fixture::new(RecordingGsg::default());
        let manager = Arc::clone(&fx.manager);
        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..200 {
                    if let Some(index) = manager.find_bin("transparent") {
                        manager.remove_bin(index);
                    }
                    std::thread::yield_now();
                }
            });
            let frame = FrameContext::new(0);
            for i in 0..200 {
                let mut result = fx.result(CullConfig::default());
                let admission = result.add_object(object_at(i, 0.0, with(TransparencyMode::Alpha)), &frame);
                assert_eq!(admission.len(), 1);
            }
        });
        assert!(fx.manager.find_bin("transparent").is_some());
    }
}
