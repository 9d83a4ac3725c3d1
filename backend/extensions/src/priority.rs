//! Priority resolution: maps a declared priority to a finite number.

use std::collections::HashMap;

use plexus_core::{ExtensionDefinition, PrioritySpec};
use tracing::warn;

/// Priority used when an extension declares none, or declares one we can't read.
pub const DEFAULT_PRIORITY: f64 = 0.0;

/// Built-in symbolic priority levels.
pub const PRIORITY_LEVELS: &[(&str, f64)] = &[
    ("mandatory", 1_000_000.0),
    ("high", 1000.0),
    ("default", 0.0),
    ("low", -1000.0),
    ("fallback", -1_000_000.0),
];

/// Turns priority specifiers into numbers using a symbol table.
#[derive(Debug, Clone)]
pub struct PriorityResolver {
    levels: HashMap<String, f64>,
    default: f64,
}

impl Default for PriorityResolver {
    fn default() -> Self {
        Self {
            levels: PRIORITY_LEVELS
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
            default: DEFAULT_PRIORITY,
        }
    }
}

impl PriorityResolver {
    /// Resolver with exactly the given symbol table.
    pub fn new(levels: impl IntoIterator<Item = (String, f64)>, default: f64) -> Self {
        Self {
            levels: HashMap::new(),
            default: DEFAULT_PRIORITY,
        }
        .with_default(default)
        .with_levels(levels)
    }

    /// Add or override symbolic levels. Non-finite values are skipped.
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = (String, f64)>) -> Self {
        for (name, value) in levels {
            if value.is_finite() {
                self.levels.insert(name, value);
            } else {
                warn!(level = %name, value, "Ignoring non-finite priority level");
            }
        }
        self
    }

    pub fn with_default(mut self, default: f64) -> Self {
        if default.is_finite() {
            self.default = default;
        } else {
            warn!(default, "Ignoring non-finite default priority");
        }
        self
    }

    pub fn default_priority(&self) -> f64 {
        self.default
    }

    pub fn level(&self, name: &str) -> Option<f64> {
        self.levels.get(name).copied()
    }

    /// Numeric priority of `extension`. Always finite.
    pub fn resolve(&self, extension: &ExtensionDefinition) -> f64 {
        match &extension.priority {
            None => self.default,
            Some(PrioritySpec::Number(n)) if n.is_finite() => *n,
            Some(PrioritySpec::Symbol(symbol)) => match self.levels.get(symbol) {
                Some(value) => *value,
                None => self.unrecognized(extension),
            },
            Some(_) => self.unrecognized(extension),
        }
    }

    fn unrecognized(&self, extension: &ExtensionDefinition) -> f64 {
        let priority = extension
            .priority
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        warn!(
            priority = %priority,
            extension = %extension.log_name(),
            bundle = extension.bundle.as_deref().unwrap_or("<unknown>"),
            default = self.default,
            "Unrecognized priority; using default"
        );
        self.default
    }
}
