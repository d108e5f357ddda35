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

//! The process-wide table of live render states and the composition cache.
//!
//! States are hash-consed: building a state with the same attribute table as
//! a live one returns the live handle. Both tables hold weak references only,
//! so a state disappears once the last `Arc` outside the tables is dropped;
//! dead entries are swept lazily.

use super::render_state::{AttribTable, RenderState, StateId};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

/// Table sizes below this are never swept.
const MIN_SWEEP_THRESHOLD: usize = 1024;

static REGISTRY: OnceLock<StateRegistry> = OnceLock::new();

/// Returns the process-wide state registry.
pub(crate) fn registry() -> &'static StateRegistry {
    REGISTRY.get_or_init(StateRegistry::new)
}

struct SweptMap<K, V> {
    map: HashMap<K, V>,
    sweep_at: usize,
}

impl<K, V> SweptMap<K, V> {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
            sweep_at: MIN_SWEEP_THRESHOLD,
        }
    }

    /// Runs `keep` over every entry once the map has doubled since the last sweep.
    fn maybe_sweep(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        if self.map.len() < self.sweep_at {
            return;
        }
        self.map.retain(keep);
        self.sweep_at = (self.map.len() * 2).max(MIN_SWEEP_THRESHOLD);
    }
}

/// Interned states bucketed by content hash, plus memoised compositions.
pub(crate) struct StateRegistry {
    states: Mutex<SweptMap<u64, Vec<Weak<RenderState>>>>,
    compositions: Mutex<SweptMap<(StateId, StateId), Weak<RenderState>>>,
    next_id: AtomicU64,
}

impl StateRegistry {
    fn new() -> Self {
        Self {
            states: Mutex::new(SweptMap::new()),
            compositions: Mutex::new(SweptMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the live state with the given attribute table, creating it if needed.
    pub(crate) fn intern(&self, table: AttribTable) -> Arc<RenderState> {
        let content_hash = hash_table(&table);
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);

        let bucket = states.map.entry(content_hash).or_default();
        bucket.retain(|weak| weak.strong_count() > 0);
        if let Some(existing) = bucket
            .iter()
            .filter_map(Weak::upgrade)
            .find(|state| state.table() == &table)
        {
            return existing;
        }

        let id = StateId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let state = Arc::new(RenderState::from_table(id, table, content_hash));
        bucket.push(Arc::downgrade(&state));

        states.maybe_sweep(|_, bucket| {
            bucket.retain(|weak| weak.strong_count() > 0);
            !bucket.is_empty()
        });
        state
    }

    /// Looks up a memoised composition of `a` then `b`.
    pub(crate) fn cached_composition(&self, a: StateId, b: StateId) -> Option<Arc<RenderState>> {
        let compositions = self
            .compositions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        compositions.map.get(&(a, b)).and_then(Weak::upgrade)
    }

    /// Memoises the composition of `a` then `b`.
    pub(crate) fn store_composition(&self, a: StateId, b: StateId, result: &Arc<RenderState>) {
        let mut compositions = self
            .compositions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        compositions.map.insert((a, b), Arc::downgrade(result));
        compositions.maybe_sweep(|_, weak| weak.strong_count() > 0);
    }

    /// The number of states currently alive in the intern table.
    pub(crate) fn live_states(&self) -> usize {
        let states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states
            .map
            .values()
            .flat_map(|bucket| bucket.iter())
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

fn hash_table(table: &AttribTable) -> u64 {
    let mut hasher = DefaultHasher::new();
    table.hash(&mut hasher);
    hasher.finish()
}
