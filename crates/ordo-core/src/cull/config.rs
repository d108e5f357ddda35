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

//! Configuration of the cull pipeline.

use super::{BinType, DEFAULT_BIN_TABLE};
use crate::math::LinearRgba;
use serde::{Deserialize, Serialize};

/// Runtime switches of the cull pipeline and its bin table.
///
/// Every field has a default, so a configuration file only needs to list
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullConfig {
    /// When `true`, objects whose geometry is not resident are skipped this
    /// frame instead of being drawn anyway.
    pub allow_incomplete_render: bool,
    /// Recolor objects by transparency mode, flashing once per second.
    pub show_transparency: bool,
    /// Enable the dual-pass split for `Dual` transparency.
    pub m_dual: bool,
    /// Draw the opaque half of a dual-pass split.
    pub m_dual_opaque: bool,
    /// Draw the transparent half of a dual-pass split.
    pub m_dual_transparent: bool,
    /// Tint the halves of a dual-pass split on alternate flash cycles.
    pub m_dual_flash: bool,
    /// The bin table. Empty means the standard table.
    pub bins: Vec<BinConfig>,
    /// The graphics pipe to create when none is named explicitly.
    pub default_pipe: Option<String>,
    /// Multisamples requested for new guardians.
    pub multisamples: u32,
}

impl Default for CullConfig {
    fn default() -> Self {
        Self {
            allow_incomplete_render: false,
            show_transparency: false,
            m_dual: true,
            m_dual_opaque: true,
            m_dual_transparent: true,
            m_dual_flash: false,
            bins: Vec::new(),
            default_pipe: None,
            multisamples: 0,
        }
    }
}

impl CullConfig {
    /// The bin table in effect: the configured one, or the standard table.
    pub fn effective_bins(&self) -> Vec<BinConfig> {
        if !self.bins.is_empty() {
            return self.bins.clone();
        }
        DEFAULT_BIN_TABLE
            .iter()
            .map(|(name, bin_type, sort)| BinConfig::new(name, *bin_type, *sort))
            .collect()
    }
}

/// One entry of the bin table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinConfig {
    /// The bin name.
    pub name: String,
    /// The sorting strategy.
    pub bin_type: BinType,
    /// The draw-order rank; lower draws first.
    pub sort: i32,
    /// Inactive bins keep their objects out of the frame.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Debug flash color applied to every object in the bin.
    #[serde(default)]
    pub flash_color: Option<LinearRgba>,
}

fn default_active() -> bool {
    true
}

impl BinConfig {
    /// An active bin entry without flash color.
    pub fn new(name: &str, bin_type: BinType, sort: i32) -> Self {
        Self {
            name: name.to_owned(),
            bin_type,
            sort,
            active: true,
            flash_color: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CullConfig::default();
        assert!(config.m_dual);
        assert!(config.m_dual_opaque);
        assert!(config.m_dual_transparent);
        assert!(!config.m_dual_flash);
        assert!(!config.allow_incomplete_render);
        assert!(!config.show_transparency);
    }

    #[test]
    fn test_empty_table_means_standard_bins() {
        let bins = CullConfig::default().effective_bins();
        assert_eq!(bins.len(), 6);
        let opaque = bins.iter().find(|b| b.name == "opaque").unwrap();
        assert_eq!(opaque.bin_type, BinType::StateSorted);
        assert_eq!(opaque.sort, 20);
        let default = bins.iter().find(|b| b.name == "default").unwrap();
        assert_eq!(default.sort, 45);
    }

    #[test]
    fn test_configured_table_replaces_standard_bins() {
        let config = CullConfig {
            bins: vec![BinConfig::new("only", BinType::Fixed, 1)],
            ..Default::default()
        };
        assert_eq!(config.effective_bins(), vec![BinConfig::new("only", BinType::Fixed, 1)]);
    }
}
