//! In-process implementation loader.
//!
//! Modules are registered up front under their specifier; `load` hands back
//! a clone of the registered module.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use plexus_core::{ImplementationLoader, LoadedModule, PlexusError};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    modules: HashMap<String, LoadedModule>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, specifier: impl Into<String>, module: LoadedModule) -> &mut Self {
        self.modules.insert(specifier.into(), module);
        self
    }

    pub fn with_module(mut self, specifier: impl Into<String>, module: LoadedModule) -> Self {
        self.register(specifier, module);
        self
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.modules.contains_key(specifier)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[async_trait]
impl ImplementationLoader for StaticLoader {
    async fn load(&self, specifier: &str) -> Result<LoadedModule> {
        debug!(specifier, "Loading static module");
        self.modules
            .get(specifier)
            .cloned()
            .ok_or_else(|| PlexusError::ModuleNotFound(specifier.to_string()).into())
    }
}
