use thiserror::Error;

/// Top-level error type for the Plexus extension pipeline.
#[derive(Debug, Error)]
pub enum PlexusError {
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    #[error("service already registered: {0}")]
    DuplicateService(String),

    #[error("service '{service}' depends on unknown service '{dependency}'")]
    UnknownDependency { service: String, dependency: String },

    #[error("dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("factory for '{service}' failed: {message}")]
    FactoryFailed { service: String, message: String },

    #[error("service '{service}' is not a {expected}")]
    TypeMismatch {
        service: String,
        expected: &'static str,
    },

    #[error("service not registered: {0}")]
    ServiceNotFound(String),

    #[error("custom registrar for '{category}' failed: {message}")]
    CustomRegistrarFailed { category: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = PlexusError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = PlexusError::DependencyCycle(vec!["a[x]".into(), "b[y]".into(), "a[x]".into()]);
        assert_eq!(err.to_string(), "dependency cycle: a[x] -> b[y] -> a[x]");
    }

    #[test]
    fn anyhow_errors_convert() {
        let err: PlexusError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
