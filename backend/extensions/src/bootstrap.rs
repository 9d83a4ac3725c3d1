//! Bootstrap sequence: sort → resolve all → register → build.
//!
//! Runs once at application start. Everything is created and owned here, and
//! the returned [`Bootstrapped`] value is read-only.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use plexus_core::{CustomRegistrar, ExtensionDefinition, ImplementationLoader, Result};
use tracing::{debug, info};

use crate::container::{ServiceContainer, Services};
use crate::priority::PriorityResolver;
use crate::registrar::{
    CategoryRegistry, DEFAULT_COLLECTION_SUFFIX, ExtensionList, ExtensionRegistrar,
};
use crate::resolver::ExtensionResolver;
use crate::sorter::ExtensionSorter;

pub struct Bootstrap {
    sorter: ExtensionSorter,
    resolver: ExtensionResolver,
    suffix: String,
    custom: Vec<(String, Box<dyn CustomRegistrar>)>,
}

impl Bootstrap {
    pub fn new(loader: Arc<dyn ImplementationLoader>) -> Self {
        Self {
            sorter: ExtensionSorter::default(),
            resolver: ExtensionResolver::new(loader),
            suffix: DEFAULT_COLLECTION_SUFFIX.to_string(),
            custom: Vec::new(),
        }
    }

    pub fn with_priorities(mut self, priorities: PriorityResolver) -> Self {
        self.sorter = ExtensionSorter::new(priorities);
        self
    }

    pub fn with_collection_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_custom_registrar(
        mut self,
        category: impl Into<String>,
        registrar: impl CustomRegistrar + 'static,
    ) -> Self {
        self.custom.push((category.into(), Box::new(registrar)));
        self
    }

    /// Run the whole pipeline over `categories`, in the given category order.
    pub async fn run<I>(self, categories: I) -> Result<Bootstrapped>
    where
        I: IntoIterator<Item = (String, Vec<ExtensionDefinition>)>,
    {
        let sorted: Vec<(String, Vec<ExtensionDefinition>)> = categories
            .into_iter()
            .map(|(category, mut definitions)| {
                for (index, definition) in definitions.iter_mut().enumerate() {
                    definition.index.get_or_insert(index);
                }
                let sorted = self.sorter.sort(&definitions);
                (category, sorted)
            })
            .collect();
        let total: usize = sorted.iter().map(|(_, defs)| defs.len()).sum();
        debug!(categories = sorted.len(), extensions = total, "Sorted extensions");

        let resolver = &self.resolver;
        let resolved = join_all(sorted.into_iter().map(|(category, definitions)| async move {
            let extensions = resolver
                .resolve_all(definitions)
                .await
                .into_iter()
                .map(Arc::new)
                .collect::<Vec<_>>();
            (category, extensions)
        }))
        .await;
        let loaded = resolved
            .iter()
            .flat_map(|(_, extensions)| extensions.iter())
            .filter(|e| e.is_loaded())
            .count();

        let mut registrar =
            ExtensionRegistrar::new(ServiceContainer::new()).with_collection_suffix(self.suffix.clone());
        for (category, custom) in self.custom {
            registrar.add_custom_registrar(category, custom);
        }
        registrar.register_extensions(resolved)?;
        registrar.register_missing_collections()?;

        let (container, registry) = registrar.into_parts();
        let services = container.build()?;
        info!(
            extensions = total,
            loaded,
            services = services.len(),
            "Extension bootstrap complete"
        );

        Ok(Bootstrapped {
            services,
            registry,
            suffix: self.suffix,
        })
    }
}

/// Result of a completed bootstrap.
pub struct Bootstrapped {
    pub services: Services,
    pub registry: CategoryRegistry,
    suffix: String,
}

impl Bootstrapped {
    pub fn collection_name(&self, category: &str) -> String {
        format!("{category}{}", self.suffix)
    }

    /// All extensions of `category`, in priority order.
    pub fn collection(&self, category: &str) -> Result<Arc<ExtensionList>> {
        self.services.collection(&self.collection_name(category))
    }

    /// Registered categories with their service names.
    pub fn categories(&self) -> BTreeMap<&str, &[String]> {
        self.registry
            .categories()
            .into_iter()
            .map(|category| (category, self.registry.names(category)))
            .collect()
    }
}
