//! `plexus-extensions`: priority ordering, implementation resolution and
//! registration of declarative extensions.

pub mod bootstrap;
pub mod bundle;
pub mod container;
pub mod loader;
pub mod priority;
pub mod registrar;
pub mod resolver;
pub mod sorter;

#[cfg(test)]
mod testing;

pub use bootstrap::{Bootstrap, Bootstrapped};
pub use bundle::{Bundle, BundleCatalog, BundleManifest, BUNDLE_MANIFEST};
pub use container::{ServiceContainer, Services};
pub use loader::StaticLoader;
pub use priority::{PriorityResolver, DEFAULT_PRIORITY, PRIORITY_LEVELS};
pub use registrar::{
    CategoryRecord, CategoryRegistry, Extension, ExtensionList, ExtensionRegistrar,
    DEFAULT_COLLECTION_SUFFIX,
};
pub use resolver::ExtensionResolver;
pub use sorter::ExtensionSorter;
