//! CLI Check-Config Command
//!
//! Loads the config file, resolves env references and reports every
//! validation problem instead of stopping at the first.

use std::path::Path;

use anyhow::{bail, Result};
use plexus_config::{apply_all_defaults, resolve_env_vars, validate, PlexusConfig, ValidationReport};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

pub fn run(path: &Path, raw: &PlexusConfig) -> Result<()> {
    if path.exists() {
        note_info(&format!("Checking {}", path.display()));
    } else {
        note_info(&format!("{} does not exist; checking defaults", path.display()));
    }

    let report = check(raw)?;
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }
    if !report.is_valid() {
        bail!("{} config error(s)", report.errors.len());
    }
    note_success("Config is valid");
    Ok(())
}

/// Env substitution and defaults, then validation. A missing env var is an
/// error rather than a report entry.
pub fn check(raw: &PlexusConfig) -> Result<ValidationReport> {
    let value = resolve_env_vars(&serde_json::to_value(raw)?)?;
    let config: PlexusConfig = serde_json::from_value(value)?;
    Ok(validate(&apply_all_defaults(config)))
}
