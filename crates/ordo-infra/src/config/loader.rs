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

//! Reads `CullConfig` from RON text.
//!
//! Every field is optional; missing ones take their defaults:
//!
//! ```ron
//! (
//!     show_transparency: true,
//!     default_pipe: Some("software"),
//!     bins: [
//!         (name: "hud", bin_type: Fixed, sort: 60, flash_color: Some((r: 1.0, g: 0.0, b: 0.0, a: 1.0))),
//!     ],
//! )
//! ```

use ordo_core::cull::CullConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// An error raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The text is not valid configuration.
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The configuration could not be written out.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Loads and saves [`CullConfig`] in RON.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parses configuration from a RON string.
    pub fn load_str(text: &str) -> Result<CullConfig, ConfigError> {
        let config: CullConfig = ron::from_str(text)?;
        log::debug!(
            "Loaded cull config with {} bin entries",
            config.bins.len()
        );
        Ok(config)
    }

    /// Reads and parses a RON file.
    pub fn load_path(path: impl AsRef<Path>) -> Result<CullConfig, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Reading cull config from {}", path.display());
        Self::load_str(&text)
    }

    /// Reads `path` if it exists, falling back to the default configuration.
    pub fn load_path_or_default(path: impl AsRef<Path>) -> Result<CullConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(CullConfig::default());
        }
        Self::load_path(path)
    }

    /// Renders `config` as pretty-printed RON.
    pub fn render(config: &CullConfig) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            config,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}
