//! Plexus runtime configuration schema, typed for serde YAML/JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexusConfig {
    /// Symbolic priority levels and the default priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priorities: Option<PrioritiesConfig>,

    /// Service naming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryConfig>,

    /// Bundle discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundles: Option<BundlesConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritiesConfig {
    /// Extra or overriding symbolic levels, layered on the built-in table.
    #[serde(default)]
    pub levels: BTreeMap<String, f64>,
    /// Priority of extensions that declare none.
    pub default: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Suffix appended to a category name for its collection service.
    pub collection_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlesConfig {
    /// Directory scanned for bundle directories.
    pub dir: Option<String>,
    /// Bundle names to leave out of the bootstrap.
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `plexus_extensions=debug`.
    pub level: Option<String>,
    /// Emit JSON lines on the console instead of text.
    pub json: Option<bool>,
    /// Directory for daily-rolling log files; no file output when unset.
    pub dir: Option<String>,
}
