//! Config file loading.

use crate::schema::PlexusConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "plexus.yaml";

/// Resolve the Plexus config directory.
/// Priority: `PLEXUS_CONFIG_DIR` env > `~/.plexus/` > `./.plexus`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PLEXUS_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".plexus"),
        None => PathBuf::from(".plexus"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<PlexusConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(PlexusConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: PlexusConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(&tmp.path().join("absent.yaml")).await.unwrap();
        assert_eq!(config, PlexusConfig::default());
    }

    #[tokio::test]
    async fn reads_yaml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = config_file_path(tmp.path());
        std::fs::write(&path, "registry:\n  collectionSuffix: \"/all\"\n").unwrap();
        let config = load_config(&path).await.unwrap();
        assert_eq!(config.registry.unwrap().collection_suffix.as_deref(), Some("/all"));
    }

    #[tokio::test]
    async fn malformed_yaml_names_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.yaml");
        std::fs::write(&path, "priorities: [unclosed").unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }
}
