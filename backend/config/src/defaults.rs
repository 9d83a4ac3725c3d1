//! Config defaults: fills in values the user left unset.

use crate::schema::{BundlesConfig, LoggingConfig, PlexusConfig, PrioritiesConfig, RegistryConfig};

/// Priority of extensions that declare none.
pub const DEFAULT_PRIORITY: f64 = 0.0;

/// Suffix of category collection services (`actions[]`).
pub const DEFAULT_COLLECTION_SUFFIX: &str = "[]";

/// Bundle directory, relative to the working directory.
pub const DEFAULT_BUNDLES_DIR: &str = "bundles";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: PlexusConfig) -> PlexusConfig {
    let config = apply_priority_defaults(config);
    let config = apply_registry_defaults(config);
    let config = apply_bundle_defaults(config);
    apply_logging_defaults(config)
}

fn apply_priority_defaults(mut config: PlexusConfig) -> PlexusConfig {
    let priorities = config.priorities.get_or_insert_with(PrioritiesConfig::default);
    if priorities.default.is_none() {
        priorities.default = Some(DEFAULT_PRIORITY);
    }
    config
}

fn apply_registry_defaults(mut config: PlexusConfig) -> PlexusConfig {
    let registry = config.registry.get_or_insert_with(RegistryConfig::default);
    if registry.collection_suffix.is_none() {
        registry.collection_suffix = Some(DEFAULT_COLLECTION_SUFFIX.to_string());
    }
    config
}

fn apply_bundle_defaults(mut config: PlexusConfig) -> PlexusConfig {
    let bundles = config.bundles.get_or_insert_with(BundlesConfig::default);
    if bundles.dir.is_none() {
        bundles.dir = Some(DEFAULT_BUNDLES_DIR.to_string());
    }
    config
}

fn apply_logging_defaults(mut config: PlexusConfig) -> PlexusConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.json.is_none() {
        logging.json = Some(false);
    }
    config
}
