//! Config validation: schema checks with user-friendly messages.

use crate::schema::PlexusConfig;
use std::collections::HashSet;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &PlexusConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_priorities(config, &mut report);
    validate_registry(config, &mut report);
    validate_bundles(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_priorities(config: &PlexusConfig, report: &mut ValidationReport) {
    let Some(priorities) = &config.priorities else { return };
    for (name, value) in &priorities.levels {
        let path = format!("priorities.levels.{name}");
        if name.trim().is_empty() {
            report.error("priorities.levels", "Priority level name cannot be empty");
        }
        if !value.is_finite() {
            report.error(path, format!("Priority must be a finite number, got {value}"));
        }
    }
    if let Some(default) = priorities.default {
        if !default.is_finite() {
            report.error("priorities.default", format!("Default priority must be finite, got {default}"));
        }
    }
}

fn validate_registry(config: &PlexusConfig, report: &mut ValidationReport) {
    let Some(registry) = &config.registry else { return };
    if let Some(suffix) = &registry.collection_suffix {
        if suffix.is_empty() {
            report.error(
                "registry.collectionSuffix",
                "Collection suffix cannot be empty; collections would collide with category names",
            );
        } else if suffix.chars().any(char::is_whitespace) {
            report.warn("registry.collectionSuffix", "Collection suffix contains whitespace");
        }
    }
}

fn validate_bundles(config: &PlexusConfig, report: &mut ValidationReport) {
    let Some(bundles) = &config.bundles else { return };
    if bundles.dir.as_deref().is_some_and(|d| d.trim().is_empty()) {
        report.error("bundles.dir", "Bundle directory cannot be empty");
    }
    let mut seen = HashSet::new();
    for name in &bundles.disabled {
        if !seen.insert(name.as_str()) {
            report.warn("bundles.disabled", format!("Bundle '{name}' is listed more than once"));
        }
    }
}

fn validate_logging(config: &PlexusConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        // Directives with targets (`crate=debug`) are left to the filter parser.
        if !level.contains('=') && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.warn("logging.level", format!("Unknown log level '{level}'"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BundlesConfig, LoggingConfig, PrioritiesConfig, RegistryConfig};

    #[test]
    fn default_config_is_valid() {
        let report = validate(&crate::apply_all_defaults(PlexusConfig::default()));
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn non_finite_priorities_are_errors() {
        let config = PlexusConfig {
            priorities: Some(PrioritiesConfig {
                levels: [("never".to_string(), f64::NEG_INFINITY)].into_iter().collect(),
                default: Some(f64::NAN),
            }),
            ..Default::default()
        };
        let report = validate(&config);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["priorities.levels.never", "priorities.default"]);
    }

    #[test]
    fn empty_suffix_is_an_error() {
        let config = PlexusConfig {
            registry: Some(RegistryConfig {
                collection_suffix: Some(String::new()),
            }),
            ..Default::default()
        };
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn duplicates_and_unknown_levels_warn() {
        let config = PlexusConfig {
            bundles: Some(BundlesConfig {
                dir: Some("bundles".into()),
                disabled: vec!["legacy".into(), "legacy".into()],
            }),
            logging: Some(LoggingConfig {
                level: Some("chatty".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn target_directives_are_accepted() {
        let config = PlexusConfig {
            logging: Some(LoggingConfig {
                level: Some("plexus_extensions=debug,info".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(validate(&config).warnings.is_empty());
    }
}
