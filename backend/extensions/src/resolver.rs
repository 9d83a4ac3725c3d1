//! Implementation resolution with graceful degradation.
//!
//! An extension whose module fails to load is still registered, carrying only
//! its declared metadata. A broken plug-in never stops the rest of the
//! bootstrap.

use std::sync::Arc;

use futures::future::join_all;
use plexus_core::{ExtensionDefinition, ImplementationLoader, ResolvedExtension};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct ExtensionResolver {
    loader: Arc<dyn ImplementationLoader>,
}

impl ExtensionResolver {
    pub fn new(loader: Arc<dyn ImplementationLoader>) -> Self {
        Self { loader }
    }

    /// Resolve one extension. Never fails.
    pub async fn resolve(&self, extension: ExtensionDefinition) -> ResolvedExtension {
        let Some(specifier) = extension.implementation.clone() else {
            debug!(extension = %extension.log_name(), "No implementation declared");
            return ResolvedExtension::metadata_only(extension);
        };

        match self.loader.load(&specifier).await {
            Ok(module) => {
                info!(
                    extension = %extension.log_name(),
                    specifier = %specifier,
                    kind = module.implementation.kind(),
                    "Loaded extension implementation"
                );
                ResolvedExtension::with_module(extension, &module)
            }
            Err(e) => {
                warn!(
                    extension = %extension.log_name(),
                    category = %extension.category,
                    specifier = %specifier,
                    error = %e,
                    "Could not load implementation; continuing with metadata only"
                );
                ResolvedExtension::metadata_only(extension)
            }
        }
    }

    /// Resolve a list concurrently, preserving its order.
    pub async fn resolve_all(&self, extensions: Vec<ExtensionDefinition>) -> Vec<ResolvedExtension> {
        join_all(extensions.into_iter().map(|extension| self.resolve(extension))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticLoader;
    use crate::testing::CapturedLogs;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use plexus_core::{Implementation, LoadedModule};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts calls and fails every load.
    #[derive(Default)]
    struct FailingLoader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImplementationLoader for FailingLoader {
        async fn load(&self, specifier: &str) -> Result<LoadedModule> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("cannot open {specifier}"))
        }
    }

    /// Sleeps for the number of milliseconds named by the specifier.
    struct SlowLoader;

    #[async_trait]
    impl ImplementationLoader for SlowLoader {
        async fn load(&self, specifier: &str) -> Result<LoadedModule> {
            let millis: u64 = specifier.parse()?;
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok(LoadedModule::new(Implementation::instance(millis)))
        }
    }

    #[tokio::test]
    async fn no_implementation_skips_loader() {
        let loader = Arc::new(FailingLoader::default());
        let resolver = ExtensionResolver::new(loader.clone());
        let def = ExtensionDefinition::new("things")
            .with_key("a")
            .with_field("label", json!("A"));

        let resolved = resolver.resolve(def.clone()).await;
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolved.fields, def.fields());
        assert_eq!(resolved.definition, def);
        assert!(!resolved.is_loaded());
    }

    #[tokio::test]
    async fn load_failure_degrades_to_metadata() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let loader = Arc::new(FailingLoader::default());
        let resolver = ExtensionResolver::new(loader.clone());
        let def = ExtensionDefinition::new("things")
            .with_key("broken")
            .with_implementation("broken/module");

        let resolved = resolver.resolve(def.clone()).await;
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert!(!resolved.is_loaded());
        assert_eq!(resolved.fields, def.fields());

        assert_eq!(logs.count("WARN"), 1);
        let text = logs.contents();
        assert!(text.contains("things extension 'broken'"));
        assert!(text.contains("cannot open broken/module"));
    }

    #[tokio::test]
    async fn successful_load_merges_with_definition_winning() {
        let loader = StaticLoader::new().with_module(
            "things/a",
            LoadedModule::new(Implementation::instance("impl"))
                .with_field("label", json!("from module"))
                .with_field("icon", json!("gear")),
        );
        let resolver = ExtensionResolver::new(Arc::new(loader));
        let def = ExtensionDefinition::new("things")
            .with_key("a")
            .with_implementation("things/a")
            .with_field("label", json!("from definition"));

        let resolved = resolver.resolve(def).await;
        assert!(resolved.is_loaded());
        assert_eq!(resolved.field("label"), Some(&json!("from definition")));
        assert_eq!(resolved.field("icon"), Some(&json!("gear")));
        assert_eq!(resolved.field("key"), Some(&json!("a")));
    }

    #[tokio::test]
    async fn shared_module_keeps_independent_metadata() {
        let loader = StaticLoader::new().with_module(
            "shared",
            LoadedModule::new(Implementation::instance(1u8)).with_field("label", json!("module")),
        );
        let resolver = ExtensionResolver::new(Arc::new(loader));
        let first = resolver
            .resolve(ExtensionDefinition::new("things").with_key("one").with_implementation("shared"))
            .await;
        let second = resolver
            .resolve(
                ExtensionDefinition::new("things")
                    .with_key("two")
                    .with_implementation("shared")
                    .with_field("label", json!("mine")),
            )
            .await;
        assert_eq!(first.field("label"), Some(&json!("module")));
        assert_eq!(second.field("label"), Some(&json!("mine")));
    }

    #[tokio::test(start_paused = true)]
    async fn resolve_all_runs_concurrently_and_keeps_order() {
        let resolver = ExtensionResolver::new(Arc::new(SlowLoader));
        let defs = vec![
            ExtensionDefinition::new("things").with_key("first").with_implementation("300"),
            ExtensionDefinition::new("things").with_key("second").with_implementation("300"),
            ExtensionDefinition::new("things").with_key("plain"),
        ];

        let started = tokio::time::Instant::now();
        let resolved = resolver.resolve_all(defs).await;
        assert!(started.elapsed() < Duration::from_millis(600));

        let keys: Vec<_> = resolved.iter().filter_map(|r| r.key()).collect();
        assert_eq!(keys, ["first", "second", "plain"]);
        assert!(resolved[0].is_loaded());
        assert!(resolved[1].is_loaded());
        assert!(!resolved[2].is_loaded());
    }
}
