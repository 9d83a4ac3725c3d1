use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{LoadedModule, ResolvedExtension, Service};

/// Produces a service from its resolved dependencies, in declaration order.
pub type Factory = Box<dyn FnOnce(&[Service]) -> anyhow::Result<Service> + Send>;

/// Locates and loads the module behind an extension's `implementation` specifier.
#[async_trait]
pub trait ImplementationLoader: Send + Sync {
    async fn load(&self, specifier: &str) -> anyhow::Result<LoadedModule>;
}

/// Named-factory registration target.
pub trait Container {
    /// Register `factory` under `name`; it receives the services named in
    /// `depends` once they exist.
    fn factory(&mut self, name: &str, depends: Vec<String>, factory: Factory) -> Result<()>;

    fn contains(&self, name: &str) -> bool;
}

/// Category-specific registration that replaces the generic path.
///
/// Invoked once per extension of the category, in sorted order.
pub trait CustomRegistrar: Send {
    fn register(
        &mut self,
        container: &mut dyn Container,
        extension: &Arc<ResolvedExtension>,
        index: usize,
    ) -> Result<()>;
}

impl<F> CustomRegistrar for F
where
    F: FnMut(&mut dyn Container, &Arc<ResolvedExtension>, usize) -> Result<()> + Send,
{
    fn register(
        &mut self,
        container: &mut dyn Container,
        extension: &Arc<ResolvedExtension>,
        index: usize,
    ) -> Result<()> {
        self(container, extension, index)
    }
}
