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

//! The registry of bins: names, types, draw order and per-bin settings.
//!
//! A `CullBinManager` is shared (behind an `Arc`) by every [`CullResult`]
//! rendering through it. Changes that invalidate bins a result already holds
//! are broadcast as [`BinEvent`]s.
//!
//! [`CullResult`]: super::CullResult

use super::CullBin;
use ahash::{AHashMap, AHashSet};
use ordo_core::cull::{
    BinEvent, BinIndex, BinType, CullConfig, DEFAULT_BIN_NAME, DEFAULT_BIN_TABLE,
};
use ordo_core::event::Broadcaster;
use ordo_core::math::LinearRgba;
use ordo_core::renderer::GraphicsStateGuardian;
use ordo_core::state::RenderState;
use ordo_telemetry::CullCollectors;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
struct BinDefinition {
    name: Arc<str>,
    bin_type: BinType,
    sort: i32,
    active: bool,
    flash_color: Option<LinearRgba>,
}

#[derive(Debug, Default)]
struct BinTable {
    bins: Vec<Option<BinDefinition>>,
    by_name: AHashMap<Arc<str>, BinIndex>,
    draw_order: Vec<BinIndex>,
}

impl BinTable {
    fn get(&self, index: BinIndex) -> Option<&BinDefinition> {
        self.bins.get(index.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, index: BinIndex) -> Option<&mut BinDefinition> {
        self.bins.get_mut(index.0).and_then(Option::as_mut)
    }

    fn insert(&mut self, name: &str, bin_type: BinType, sort: i32) -> BinIndex {
        let index = BinIndex(self.bins.len());
        let name: Arc<str> = Arc::from(name);
        self.bins.push(Some(BinDefinition {
            name: Arc::clone(&name),
            bin_type,
            sort,
            active: true,
            flash_color: None,
        }));
        log::info!("Registered cull bin '{name}' as {index:?} ({bin_type:?}, sort {sort})");
        self.by_name.insert(name, index);
        self.resort();
        index
    }

    fn resort(&mut self) {
        let mut order: Vec<(i32, BinIndex)> = self
            .bins
            .iter()
            .enumerate()
            .filter_map(|(i, bin)| bin.as_ref().map(|bin| (bin.sort, BinIndex(i))))
            .collect();
        order.sort_unstable();
        self.draw_order = order.into_iter().map(|(_, index)| index).collect();
    }
}

/// Owns the definitions of all bins and the order they are drawn in.
///
/// Indices are stable: a removed bin's index is never handed out again.
#[derive(Debug, Default)]
pub struct CullBinManager {
    table: RwLock<BinTable>,
    warned: Mutex<AHashSet<Arc<str>>>,
    events: Broadcaster<BinEvent>,
}

impl CullBinManager {
    /// Creates a manager with no bins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager holding the standard bin table.
    pub fn with_default_bins() -> Self {
        let manager = Self::new();
        for (name, bin_type, sort) in DEFAULT_BIN_TABLE {
            manager.add_bin(name, bin_type, sort);
        }
        manager
    }

    /// Creates a manager from the bin table of `config`.
    ///
    /// An empty table in the configuration yields the standard bins.
    pub fn from_config(config: &CullConfig) -> Self {
        let manager = Self::new();
        for bin in config.effective_bins() {
            let index = manager.add_bin(&bin.name, bin.bin_type, bin.sort);
            manager.set_bin_active(index, bin.active);
            manager.set_bin_flash_color(index, bin.flash_color);
        }
        manager
    }

    fn read(&self) -> RwLockReadGuard<'_, BinTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BinTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a bin, or reconfigures the bin already using `name`.
    pub fn add_bin(&self, name: &str, bin_type: BinType, sort: i32) -> BinIndex {
        let mut table = self.write();
        let Some(&index) = table.by_name.get(name) else {
            return table.insert(name, bin_type, sort);
        };
        let mut retyped = false;
        if let Some(bin) = table.get_mut(index) {
            retyped = bin.bin_type != bin_type;
            bin.bin_type = bin_type;
            bin.sort = sort;
        }
        table.resort();
        drop(table);
        if retyped {
            self.events.publish(BinEvent::Retyped(index));
        }
        index
    }

    /// Returns the index of `name`, registering it as an unsorted bin with
    /// sort 0 on first use.
    pub fn get_bin_index(&self, name: &str) -> BinIndex {
        if let Some(index) = self.find_bin(name) {
            return index;
        }
        let mut table = self.write();
        match table.by_name.get(name) {
            Some(&index) => index,
            None => table.insert(name, BinType::Unsorted, 0),
        }
    }

    /// Looks up a bin by name.
    pub fn find_bin(&self, name: &str) -> Option<BinIndex> {
        self.read().by_name.get(name).copied()
    }

    /// Resolves the bin `state` draws in.
    ///
    /// The standard bins are created on demand with their usual type and
    /// sort. A name nobody registered falls back to the `"default"` bin.
    pub fn resolve_bin(&self, state: &RenderState) -> BinIndex {
        let assignment = state.bin_assignment();
        if let Some(index) = self.find_bin(&assignment.name) {
            return index;
        }
        if !assignment.explicit {
            return self.standard_bin(&assignment.name);
        }
        let first = self
            .warned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Arc::clone(&assignment.name));
        if first {
            log::warn!(
                "Unknown cull bin '{}', using '{DEFAULT_BIN_NAME}'",
                assignment.name
            );
        } else {
            log::trace!("Unknown cull bin '{}'", assignment.name);
        }
        self.standard_bin(DEFAULT_BIN_NAME)
    }

    fn standard_bin(&self, name: &str) -> BinIndex {
        let mut table = self.write();
        if let Some(&index) = table.by_name.get(name) {
            return index;
        }
        let (bin_type, sort) = DEFAULT_BIN_TABLE
            .iter()
            .find(|(standard, _, _)| *standard == name)
            .map_or((BinType::Unsorted, 0), |&(_, bin_type, sort)| (bin_type, sort));
        table.insert(name, bin_type, sort)
    }

    /// Creates an empty bin for `index` from its current definition.
    ///
    /// Returns `None` if `index` is not a registered bin.
    pub fn make_new_bin(
        &self,
        index: BinIndex,
        gsg: &Arc<dyn GraphicsStateGuardian>,
        collectors: &CullCollectors,
    ) -> Option<CullBin> {
        let bin = self.read().get(index)?.clone();
        let collector = match collectors.bin_collector(&bin.name) {
            Ok(collector) => Some(collector),
            Err(e) => {
                log::warn!("No performance collector for bin '{}': {e}", bin.name);
                None
            }
        };
        Some(
            CullBin::new(bin.name, index, bin.bin_type, Arc::clone(gsg))
                .with_flash_color(bin.flash_color)
                .with_collector(collector),
        )
    }

    /// The number of registered bins.
    pub fn get_num_bins(&self) -> usize {
        self.read().draw_order.len()
    }

    /// The `n`th bin in draw order.
    pub fn get_bin(&self, n: usize) -> Option<BinIndex> {
        self.read().draw_order.get(n).copied()
    }

    /// All registered bins, in draw order: by sort, then by index.
    pub fn draw_order(&self) -> Vec<BinIndex> {
        self.read().draw_order.clone()
    }

    /// Removes a bin. Its index is retired and subscribers are notified.
    ///
    /// Returns `false` if no such bin was registered.
    pub fn remove_bin(&self, index: BinIndex) -> bool {
        let mut table = self.write();
        let Some(bin) = table.bins.get_mut(index.0).and_then(Option::take) else {
            return false;
        };
        table.by_name.remove(&bin.name);
        table.resort();
        drop(table);
        log::info!("Removed cull bin '{}' ({index:?})", bin.name);
        self.events.publish(BinEvent::Removed(index));
        true
    }

    /// The name of a bin.
    pub fn bin_name(&self, index: BinIndex) -> Option<Arc<str>> {
        self.read().get(index).map(|bin| Arc::clone(&bin.name))
    }

    /// The type of a bin.
    pub fn bin_type(&self, index: BinIndex) -> Option<BinType> {
        self.read().get(index).map(|bin| bin.bin_type)
    }

    /// Changes the type of a bin. Bins already created with the old type are
    /// invalidated.
    pub fn set_bin_type(&self, index: BinIndex, bin_type: BinType) -> bool {
        let changed = match self.write().get_mut(index) {
            Some(bin) => std::mem::replace(&mut bin.bin_type, bin_type) != bin_type,
            None => return false,
        };
        if changed {
            self.events.publish(BinEvent::Retyped(index));
        }
        true
    }

    /// The draw-order rank of a bin.
    pub fn bin_sort(&self, index: BinIndex) -> Option<i32> {
        self.read().get(index).map(|bin| bin.sort)
    }

    /// Changes the draw-order rank of a bin.
    pub fn set_bin_sort(&self, index: BinIndex, sort: i32) -> bool {
        let mut table = self.write();
        let Some(bin) = table.get_mut(index) else {
            return false;
        };
        bin.sort = sort;
        table.resort();
        true
    }

    /// Whether a bin is drawn.
    pub fn bin_active(&self, index: BinIndex) -> Option<bool> {
        self.read().get(index).map(|bin| bin.active)
    }

    /// Enables or disables a bin. Objects already binned into an inactive bin
    /// are discarded at the end of cull.
    pub fn set_bin_active(&self, index: BinIndex, active: bool) -> bool {
        self.write()
            .get_mut(index)
            .map(|bin| bin.active = active)
            .is_some()
    }

    /// The debug flash color of a bin.
    pub fn bin_flash_color(&self, index: BinIndex) -> Option<LinearRgba> {
        self.read().get(index).and_then(|bin| bin.flash_color)
    }

    /// Sets (or clears) the debug flash color of a bin. Results pick it up the
    /// next time they admit an object to the bin.
    pub fn set_bin_flash_color(&self, index: BinIndex, color: Option<LinearRgba>) -> bool {
        self.write()
            .get_mut(index)
            .map(|bin| bin.flash_color = color)
            .is_some()
    }

    /// Subscribes to bin removal and retyping events.
    pub fn subscribe(&self) -> flume::Receiver<BinEvent> {
        self.events.subscribe()
    }

    /// The number of event subscribers still registered.
    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}
