//! Runtime settings derived from the loaded config.

use std::path::{Path, PathBuf};

use anyhow::Result;
use plexus_config::{defaults, PlexusConfig};
use plexus_extensions::{BundleCatalog, PriorityResolver};
use plexus_logging::LogOptions;
use tracing::warn;

/// Logging options from config, with the command line level taking precedence.
pub fn log_options(config: &PlexusConfig, level_override: Option<&str>) -> LogOptions {
    let logging = config.logging.clone().unwrap_or_default();
    LogOptions {
        level: level_override
            .map(str::to_string)
            .or(logging.level)
            .unwrap_or_else(|| defaults::DEFAULT_LOG_LEVEL.to_string()),
        json: logging.json.unwrap_or(false),
        dir: logging.dir.map(PathBuf::from),
    }
}

/// Built-in priority levels overlaid with the configured ones.
pub fn priority_resolver(config: &PlexusConfig) -> PriorityResolver {
    let priorities = config.priorities.clone().unwrap_or_default();
    PriorityResolver::default()
        .with_levels(priorities.levels)
        .with_default(priorities.default.unwrap_or(defaults::DEFAULT_PRIORITY))
}

pub fn collection_suffix(config: &PlexusConfig) -> String {
    config
        .registry
        .as_ref()
        .and_then(|r| r.collection_suffix.clone())
        .unwrap_or_else(|| defaults::DEFAULT_COLLECTION_SUFFIX.to_string())
}

pub fn bundles_dir(config: &PlexusConfig, dir_override: Option<&Path>) -> PathBuf {
    match dir_override {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from(
            config
                .bundles
                .as_ref()
                .and_then(|b| b.dir.as_deref())
                .unwrap_or(defaults::DEFAULT_BUNDLES_DIR),
        ),
    }
}

/// Discover bundles and apply the configured disabled list.
pub fn bundle_catalog(config: &PlexusConfig, dir_override: Option<&Path>) -> Result<BundleCatalog> {
    let mut catalog = BundleCatalog::new(bundles_dir(config, dir_override));
    catalog.discover()?;
    let disabled = config.bundles.as_ref().map(|b| b.disabled.as_slice()).unwrap_or_default();
    for name in disabled {
        if !catalog.disable(name) {
            warn!(bundle = %name, "Disabled bundle not found");
        }
    }
    Ok(catalog)
}
