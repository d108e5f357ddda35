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

//! Selection of a graphics pipe by name.

use super::software::{SoftwarePipe, PIPE_NAME};
use ordo_core::cull::CullConfig;
use ordo_core::renderer::{GraphicsPipe, PipeError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Builds a pipe on demand.
pub type PipeConstructor = Box<dyn Fn() -> Arc<dyn GraphicsPipe> + Send + Sync>;

/// A registry of available pipes, with one designated as the default.
pub struct PipeSelection {
    constructors: BTreeMap<String, PipeConstructor>,
    default_pipe: Option<String>,
}

impl fmt::Debug for PipeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeSelection")
            .field("pipes", &self.constructors.keys().collect::<Vec<_>>())
            .field("default_pipe", &self.default_pipe)
            .finish()
    }
}

impl Default for PipeSelection {
    fn default() -> Self {
        let mut selection = Self::new();
        selection.register(PIPE_NAME, || Arc::new(SoftwarePipe::new()));
        selection
    }
}

impl PipeSelection {
    /// Creates a registry with no pipes. See [`PipeSelection::default`] for
    /// one holding the built-in pipes.
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
            default_pipe: None,
        }
    }

    /// Registers (or replaces) the constructor for `name`. The first pipe
    /// registered becomes the default.
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn() -> Arc<dyn GraphicsPipe> + Send + Sync + 'static,
    {
        log::debug!("Registered graphics pipe '{name}'");
        self.constructors
            .insert(name.to_owned(), Box::new(constructor));
        if self.default_pipe.is_none() {
            self.default_pipe = Some(name.to_owned());
        }
    }

    /// The registered pipe names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// The name of the default pipe.
    pub fn default_name(&self) -> Option<&str> {
        self.default_pipe.as_deref()
    }

    /// Designates the default pipe.
    pub fn set_default(&mut self, name: &str) -> Result<(), PipeError> {
        if !self.constructors.contains_key(name) {
            return Err(PipeError::UnknownPipe(name.to_owned()));
        }
        self.default_pipe = Some(name.to_owned());
        Ok(())
    }

    /// Applies the `default_pipe` setting of `config`, if any.
    pub fn apply_config(&mut self, config: &CullConfig) -> Result<(), PipeError> {
        match &config.default_pipe {
            Some(name) => self.set_default(name),
            None => Ok(()),
        }
    }

    /// Creates the pipe registered as `name`.
    pub fn make_pipe(&self, name: &str) -> Result<Arc<dyn GraphicsPipe>, PipeError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| PipeError::UnknownPipe(name.to_owned()))?;
        let pipe = constructor();
        if !pipe.is_valid() {
            log::error!("Graphics pipe '{name}' is not available on this system");
            return Err(PipeError::InvalidPipe(name.to_owned()));
        }
        log::info!("Created graphics pipe '{name}' ({})", pipe.interface_name());
        Ok(pipe)
    }

    /// Creates the default pipe.
    pub fn make_default_pipe(&self) -> Result<Arc<dyn GraphicsPipe>, PipeError> {
        let name = self
            .default_pipe
            .as_deref()
            .ok_or_else(|| PipeError::UnknownPipe("<none registered>".to_owned()))?;
        self.make_pipe(name)
    }
}
