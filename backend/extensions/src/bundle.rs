//! Bundle catalog: discovers bundles and collects their declared extensions.
//!
//! A bundle is a directory holding a `bundle.json` manifest:
//!
//! ```json
//! { "name": "plot", "extensions": { "views": [ { "key": "plot", "priority": "high" } ] } }
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use plexus_core::ExtensionDefinition;

/// Manifest file expected in every bundle directory.
pub const BUNDLE_MANIFEST: &str = "bundle.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Category → raw extension declarations.
    #[serde(default)]
    pub extensions: Map<String, Value>,
}

impl BundleManifest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Bundle manifest missing 'name'");
        }
        Ok(())
    }

    /// Parse declarations, stamping each with `bundle_path`.
    ///
    /// Categories whose value is not a list are skipped with a warning.
    pub fn definitions(&self, bundle_path: &str) -> Vec<(String, Vec<ExtensionDefinition>)> {
        let mut out = Vec::new();
        for (category, declared) in &self.extensions {
            let Value::Array(items) = declared else {
                warn!(bundle = %self.name, category = %category, "Extension category is not a list; skipping");
                continue;
            };
            let definitions = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    let mut definition = ExtensionDefinition::from_value(category, index, item.clone());
                    definition.bundle = Some(bundle_path.to_string());
                    definition
                })
                .collect();
            out.push((category.clone(), definitions));
        }
        out
    }
}

pub struct Bundle {
    pub manifest: BundleManifest,
    pub path: PathBuf,
    pub enabled: bool,
}

impl Bundle {
    pub fn path_string(&self) -> String {
        self.path.display().to_string()
    }
}

/// Bundles in discovery order.
#[derive(Default)]
pub struct BundleCatalog {
    bundles: Vec<Bundle>,
    bundles_dir: PathBuf,
}

impl BundleCatalog {
    pub fn new(bundles_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundles: Vec::new(),
            bundles_dir: bundles_dir.into(),
        }
    }

    pub fn bundles_dir(&self) -> &Path {
        &self.bundles_dir
    }

    /// Load every bundle directory under the bundles dir, in name order.
    ///
    /// Directories without a readable, valid manifest are skipped with a warning.
    pub fn discover(&mut self) -> Result<usize> {
        let dir = &self.bundles_dir;
        if !dir.exists() {
            return Ok(0);
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("read bundles dir {:?}", dir))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        paths.sort();

        let mut count = 0;
        for bundle_path in paths {
            match load_manifest(&bundle_path) {
                Ok(manifest) => {
                    if self.get(&manifest.name).is_some() {
                        warn!("[Bundles] Duplicate bundle name '{}' at {:?}; skipping", manifest.name, bundle_path);
                        continue;
                    }
                    info!("[Bundles] Loaded: {} ({:?})", manifest.name, bundle_path);
                    self.bundles.push(Bundle {
                        manifest,
                        path: bundle_path,
                        enabled: true,
                    });
                    count += 1;
                }
                Err(e) => {
                    warn!("[Bundles] Failed to load {:?}: {:#}", bundle_path, e);
                }
            }
        }
        Ok(count)
    }

    /// Add an already parsed bundle, e.g. one compiled into the host.
    pub fn add(&mut self, manifest: BundleManifest, path: impl Into<PathBuf>) -> Result<()> {
        manifest.validate()?;
        if self.get(&manifest.name).is_some() {
            bail!("Bundle '{}' is already in the catalog", manifest.name);
        }
        self.bundles.push(Bundle {
            manifest,
            path: path.into(),
            enabled: true,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.manifest.name == name)
    }

    pub fn list(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn enable(&mut self, name: &str) -> bool {
        self.set_enabled(name, true)
    }

    pub fn disable(&mut self, name: &str) -> bool {
        self.set_enabled(name, false)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.bundles.iter_mut().find(|b| b.manifest.name == name) {
            Some(bundle) => {
                bundle.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Declared extensions of every enabled bundle, grouped by category.
    /// Within a category, bundles contribute in catalog order.
    pub fn extensions_by_category(&self) -> BTreeMap<String, Vec<ExtensionDefinition>> {
        let mut categories: BTreeMap<String, Vec<ExtensionDefinition>> = BTreeMap::new();
        for bundle in self.bundles.iter().filter(|b| b.enabled) {
            for (category, definitions) in bundle.manifest.definitions(&bundle.path_string()) {
                categories.entry(category).or_default().extend(definitions);
            }
        }
        categories
    }
}

fn load_manifest(path: &Path) -> Result<BundleManifest> {
    let manifest_path = path.join(BUNDLE_MANIFEST);
    let raw = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("read manifest at {:?}", manifest_path))?;
    let manifest: BundleManifest = serde_json::from_str(&raw).context("parse bundle manifest")?;
    manifest.validate()?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_bundle(root: &Path, dir: &str, manifest: Value) {
        let path = root.join(dir);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join(BUNDLE_MANIFEST), manifest.to_string()).unwrap();
    }

    #[test]
    fn discovers_bundles_in_name_order_and_skips_broken_ones() {
        let tmp = tempfile::tempdir().unwrap();
        write_bundle(
            tmp.path(),
            "b-plot",
            json!({ "name": "plot", "extensions": { "views": [ { "key": "plot" } ] } }),
        );
        write_bundle(
            tmp.path(),
            "a-core",
            json!({ "name": "core", "extensions": { "views": [ { "key": "grid" } ], "actions": [ { "key": "remove" } ] } }),
        );
        write_bundle(tmp.path(), "c-nameless", json!({ "name": "" }));
        std::fs::create_dir_all(tmp.path().join("d-empty")).unwrap();
        std::fs::write(tmp.path().join("not-a-dir.json"), "{}").unwrap();

        let mut catalog = BundleCatalog::new(tmp.path());
        assert_eq!(catalog.discover().unwrap(), 2);

        let names: Vec<_> = catalog.list().iter().map(|b| b.manifest.name.as_str()).collect();
        assert_eq!(names, ["core", "plot"]);

        let categories = catalog.extensions_by_category();
        let views: Vec<_> = categories["views"].iter().filter_map(|d| d.key.as_deref()).collect();
        assert_eq!(views, ["grid", "plot"]);
        assert_eq!(categories["actions"].len(), 1);
        assert_eq!(
            categories["actions"][0].bundle.as_deref(),
            Some(tmp.path().join("a-core").display().to_string().as_str())
        );
    }

    #[test]
    fn missing_dir_discovers_nothing() {
        let mut catalog = BundleCatalog::new("/definitely/not/here");
        assert_eq!(catalog.discover().unwrap(), 0);
        assert!(catalog.extensions_by_category().is_empty());
    }

    #[test]
    fn disabled_bundles_contribute_nothing() {
        let mut catalog = BundleCatalog::default();
        let manifest: BundleManifest = serde_json::from_value(json!({
            "name": "extras",
            "extensions": { "actions": [ { "key": "export" } ] }
        }))
        .unwrap();
        catalog.add(manifest, "builtin/extras").unwrap();

        assert!(catalog.disable("extras"));
        assert!(catalog.extensions_by_category().is_empty());
        assert!(catalog.enable("extras"));
        assert_eq!(catalog.extensions_by_category()["actions"].len(), 1);
        assert!(!catalog.disable("unknown"));
    }

    #[test]
    fn non_list_categories_are_skipped() {
        let manifest: BundleManifest = serde_json::from_value(json!({
            "name": "odd",
            "extensions": { "views": { "key": "plot" }, "actions": [ "bare", { "key": "ok" } ] }
        }))
        .unwrap();
        let defs = manifest.definitions("bundles/odd");
        assert_eq!(defs.len(), 1);
        let (category, actions) = &defs[0];
        assert_eq!(category, "actions");
        assert_eq!(actions.len(), 2);
        assert!(actions[0].key.is_none());
        assert_eq!(actions[1].key.as_deref(), Some("ok"));
        assert!(actions.iter().all(|d| d.bundle.as_deref() == Some("bundles/odd")));
    }

    #[test]
    fn duplicate_names_are_rejected_on_add() {
        let mut catalog = BundleCatalog::default();
        let manifest = BundleManifest {
            name: "core".into(),
            description: None,
            version: None,
            extensions: Map::new(),
        };
        catalog.add(manifest.clone(), "a").unwrap();
        assert!(catalog.add(manifest, "b").is_err());
    }
}
