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

//! Shared vocabulary of the cull pipeline: bin identities, bin types, bin
//! events and the cull configuration.
//!
//! The bins themselves and the registry that owns them live in the lanes
//! crate; everything here is plain data that other crates exchange.

pub mod config;

pub use self::config::{BinConfig, CullConfig};

use crate::math::LinearRgba;
use crate::state::RenderState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The bin for objects without transparency.
pub const OPAQUE_BIN_NAME: &str = "opaque";
/// The bin for blended objects.
pub const TRANSPARENT_BIN_NAME: &str = "transparent";
/// The fallback bin for unknown bin names.
pub const DEFAULT_BIN_NAME: &str = "default";

/// The standard bin table: name, type and draw-order rank.
pub const DEFAULT_BIN_TABLE: [(&str, BinType, i32); 6] = [
    ("background", BinType::Fixed, 10),
    (OPAQUE_BIN_NAME, BinType::StateSorted, 20),
    (TRANSPARENT_BIN_NAME, BinType::BackToFront, 30),
    ("fixed", BinType::Fixed, 40),
    ("unsorted", BinType::Unsorted, 50),
    (DEFAULT_BIN_NAME, BinType::Unsorted, 45),
];

/// The stable index of a registered bin. Indices of removed bins are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinIndex(pub usize);

/// The sorting strategy of a bin.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinType {
    /// Objects are drawn in admission order.
    #[default]
    Unsorted,
    /// Objects are grouped by render state to minimise state changes.
    StateSorted,
    /// Objects are drawn farthest first.
    BackToFront,
    /// Objects are drawn nearest first.
    FrontToBack,
    /// Objects are drawn by the draw order of their bin attribute.
    Fixed,
}

/// The bin a render state resolves to, derived from its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinAssignment {
    /// The name of the bin.
    pub name: Arc<str>,
    /// The draw order inside `Fixed` bins.
    pub draw_order: i32,
    /// `true` if the name came from an explicit bin attribute.
    pub explicit: bool,
}

impl BinAssignment {
    /// Derives the assignment for `state`.
    ///
    /// An explicit, non-empty bin attribute wins. Otherwise blended
    /// transparency modes go to the transparent bin and everything else to
    /// the opaque bin.
    pub fn for_state(state: &RenderState) -> Self {
        if let Some(bin) = state.cull_bin().filter(|bin| !bin.name.is_empty()) {
            return Self {
                name: Arc::clone(&bin.name),
                draw_order: bin.draw_order,
                explicit: true,
            };
        }
        let transparent = state
            .transparency()
            .is_some_and(|mode| mode.prefers_transparent_bin());
        let draw_order = state.cull_bin().map_or(0, |bin| bin.draw_order);
        Self {
            name: Arc::from(if transparent {
                TRANSPARENT_BIN_NAME
            } else {
                OPAQUE_BIN_NAME
            }),
            draw_order,
            explicit: false,
        }
    }
}

/// A change to the bin registry that invalidates cached bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinEvent {
    /// The bin was removed; its index will never be reused.
    Removed(BinIndex),
    /// The bin changed type; cached bins of the old type are stale.
    Retyped(BinIndex),
}

impl BinEvent {
    /// The index the event refers to.
    pub fn index(&self) -> BinIndex {
        match self {
            BinEvent::Removed(index) | BinEvent::Retyped(index) => *index,
        }
    }
}

/// Flash colors used when `show_transparency` is on.
pub mod flash {
    use super::LinearRgba;

    /// Objects rewritten for alpha blending.
    pub const ALPHA: LinearRgba = LinearRgba::new(0.92, 0.96, 0.10, 1.0);
    /// Objects rewritten for binary (alpha-tested) transparency.
    pub const BINARY: LinearRgba = LinearRgba::new(0.21, 0.67, 0.24, 1.0);
    /// Objects using multisample transparency.
    pub const MULTISAMPLE: LinearRgba = LinearRgba::new(0.78, 0.05, 0.81, 1.0);
    /// Objects using dual-pass transparency.
    pub const DUAL: LinearRgba = LinearRgba::new(0.92, 0.01, 0.01, 1.0);
    /// Flashes per second.
    pub const RATE: f64 = 1.0;
}
