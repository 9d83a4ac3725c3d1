//! Extension registrar: turns resolved extensions into named services.
//!
//! Every extension of a category is registered as `category[key]` (or
//! `category[index]` when it has no key or its name is taken), and the
//! category as a whole as `category[]`, whose value is the ordered list of
//! its extensions. Names never collide; a taken name falls back to
//! `category[#index]`.
//! A category is registered at most once; later attempts are ignored.
use std::any::Any;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use plexus_core::{
    Construction, Container, CustomRegistrar, Factory, Implementation, PlexusError,
    ResolvedExtension, Result, Service,
};
use tracing::{debug, info, warn};

/// Suffix naming the "all extensions of a category" service.
pub const DEFAULT_COLLECTION_SUFFIX: &str = "[]";

// ---------------------------------------------------------------------------
// Registered values
// ---------------------------------------------------------------------------

/// The value an individually registered extension resolves to.
#[derive(Clone)]
pub struct Extension {
    pub name: String,
    pub resolved: Arc<ResolvedExtension>,
    /// The constructed or shared implementation; `None` for metadata-only extensions.
    pub instance: Option<Service>,
}

impl Extension {
    pub fn key(&self) -> Option<&str> {
        self.resolved.key()
    }

    pub fn instance_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.instance.clone()?.downcast::<T>().ok()
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("fields", &self.resolved.fields)
            .field("has_instance", &self.instance.is_some())
            .finish()
    }
}

/// Ordered list of every extension in a category.
#[derive(Debug, Clone, Default)]
pub struct ExtensionList(pub Vec<Arc<Extension>>);

impl ExtensionList {
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Extension>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().filter_map(|e| e.key()).collect()
    }
}

// ---------------------------------------------------------------------------
// Category registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CategoryRecord {
    pub registered: bool,
    /// Service names registered for the category, in order.
    pub names: Vec<String>,
}

/// Which categories have been registered, and under which names.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    categories: HashMap<String, CategoryRecord>,
}

impl CategoryRegistry {
    pub fn is_registered(&self, category: &str) -> bool {
        self.categories
            .get(category)
            .is_some_and(|record| record.registered)
    }

    pub fn names(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(|record| record.names.as_slice())
            .unwrap_or_default()
    }

    /// Registered category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .categories
            .iter()
            .filter(|(_, record)| record.registered)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    fn mark(&mut self, category: &str, names: Vec<String>) {
        self.categories.insert(
            category.to_string(),
            CategoryRecord {
                registered: true,
                names,
            },
        );
    }
}

// ---------------------------------------------------------------------------
// Registrar
// ---------------------------------------------------------------------------

pub struct ExtensionRegistrar<C: Container> {
    container: C,
    registry: CategoryRegistry,
    custom: HashMap<String, Box<dyn CustomRegistrar>>,
    suffix: String,
    /// Every dependency named by a registered extension.
    depended: BTreeSet<String>,
}

impl<C: Container> ExtensionRegistrar<C> {
    pub fn new(container: C) -> Self {
        Self {
            container,
            registry: CategoryRegistry::default(),
            custom: HashMap::new(),
            suffix: DEFAULT_COLLECTION_SUFFIX.to_string(),
            depended: BTreeSet::new(),
        }
    }

    pub fn with_collection_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Hand registration of `category` over to `registrar`.
    pub fn with_custom_registrar(
        mut self,
        category: impl Into<String>,
        registrar: impl CustomRegistrar + 'static,
    ) -> Self {
        self.add_custom_registrar(category, Box::new(registrar));
        self
    }

    pub fn add_custom_registrar(&mut self, category: impl Into<String>, registrar: Box<dyn CustomRegistrar>) {
        self.custom.insert(category.into(), registrar);
    }

    pub fn collection_name(&self, category: &str) -> String {
        format!("{category}{}", self.suffix)
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn into_parts(self) -> (C, CategoryRegistry) {
        (self.container, self.registry)
    }

    /// Register each category's already sorted and resolved extensions.
    ///
    /// Returns the container so callers can keep registering into it.
    pub fn register_extensions<I>(&mut self, categories: I) -> Result<&mut C>
    where
        I: IntoIterator<Item = (String, Vec<Arc<ResolvedExtension>>)>,
    {
        for (category, extensions) in categories {
            if self.registry.is_registered(&category) {
                warn!(category = %category, "Category already registered; ignoring repeated registration");
                continue;
            }

            let names = if self.custom.contains_key(&category) {
                self.register_custom(&category, &extensions)?
            } else {
                self.register_generic(&category, &extensions)?
            };

            info!(category = %category, extensions = extensions.len(), "Registered extension category");
            self.registry.mark(&category, names);
            for extension in &extensions {
                self.depended.extend(extension.depends().iter().cloned());
            }
        }
        Ok(&mut self.container)
    }

    fn register_custom(&mut self, category: &str, extensions: &[Arc<ResolvedExtension>]) -> Result<Vec<String>> {
        let Some(registrar) = self.custom.get_mut(category) else {
            return Ok(Vec::new());
        };
        debug!(category, "Using custom registrar");
        for (index, extension) in extensions.iter().enumerate() {
            registrar
                .register(&mut self.container, extension, index)
                .map_err(|e| PlexusError::CustomRegistrarFailed {
                    category: category.to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(Vec::new())
    }

    fn register_generic(&mut self, category: &str, extensions: &[Arc<ResolvedExtension>]) -> Result<Vec<String>> {
        let collection = self.collection_name(category);
        if self.container.contains(&collection) {
            return Err(PlexusError::DuplicateService(collection));
        }

        // Every name is settled before the first factory is registered, so a
        // category is either registered completely or not at all.
        let mut taken = HashSet::from([collection.clone()]);
        let mut names = Vec::with_capacity(extensions.len());
        for (index, extension) in extensions.iter().enumerate() {
            let name = self.service_name(category, index, extension, &taken);
            taken.insert(name.clone());
            names.push(name);
        }

        for (name, extension) in names.iter().zip(extensions) {
            self.container.factory(
                name,
                extension.depends().to_vec(),
                extension_factory(name.clone(), Arc::clone(extension)),
            )?;
        }
        self.container
            .factory(&collection, names.clone(), collection_factory())?;
        debug!(category, collection = %collection, members = names.len(), "Registered collection");
        Ok(names)
    }

    /// `category[key]`, else `category[index]`, else `category[#index]` with a
    /// numeric suffix until the name is free.
    fn service_name(
        &self,
        category: &str,
        index: usize,
        extension: &ResolvedExtension,
        taken: &HashSet<String>,
    ) -> String {
        let free = |name: &String| !taken.contains(name) && !self.container.contains(name);

        let by_index = format!("{category}[{index}]");
        if let Some(key) = extension.key() {
            let by_key = format!("{category}[{key}]");
            if free(&by_key) {
                return by_key;
            }
            if free(&by_index) {
                warn!(category, key, index, name = %by_index, "Extension name already taken; registering by index");
                return by_index;
            }
        } else if free(&by_index) {
            return by_index;
        }

        let mut name = format!("{category}[#{index}]");
        let mut attempt = 1;
        while !free(&name) {
            name = format!("{category}[#{index}-{attempt}]");
            attempt += 1;
        }
        warn!(
            category,
            key = extension.key().unwrap_or_default(),
            index,
            name = %name,
            "Extension name already taken; registering under a fallback name"
        );
        name
    }

    /// Register an empty collection for every `X[]` dependency whose category
    /// was never registered, so its dependants can still be built.
    pub fn register_missing_collections(&mut self) -> Result<usize> {
        let missing: Vec<String> = self
            .depended
            .iter()
            .filter_map(|dependency| dependency.strip_suffix(self.suffix.as_str()))
            .filter(|category| !category.is_empty() && !self.registry.is_registered(category))
            .map(str::to_string)
            .collect();

        let mut count = 0;
        for category in missing {
            let collection = self.collection_name(&category);
            if !self.container.contains(&collection) {
                debug!(category = %category, "Registering empty collection for undeclared category");
                self.container.factory(&collection, Vec::new(), collection_factory())?;
                count += 1;
            }
            self.registry.mark(&category, Vec::new());
        }
        Ok(count)
    }
}

fn extension_factory(name: String, resolved: Arc<ResolvedExtension>) -> Factory {
    Box::new(move |dependencies: &[Service]| {
        let instance = match &resolved.implementation {
            Some(Implementation::Constructor(construct)) => Some((**construct)(&Construction {
                name: &name,
                fields: &resolved.fields,
                dependencies,
            })?),
            Some(Implementation::Instance(value)) => Some(Arc::clone(value)),
            None => None,
        };
        Ok(Arc::new(Extension {
            name,
            resolved,
            instance,
        }) as Service)
    })
}

fn collection_factory() -> Factory {
    Box::new(|members: &[Service]| {
        let extensions = members
            .iter()
            .map(|member| {
                Arc::clone(member)
                    .downcast::<Extension>()
                    .map_err(|_| anyhow!("collection member is not an extension"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Arc::new(ExtensionList(extensions)) as Service)
    })
}
