//! Errors raised while reading or elaborating route configuration.

use thiserror::Error;

/// A configuration error is fatal: it is raised at route setup, before any
/// request is served.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unsupported backend kind: {0}")]
    UnsupportedBackend(String),

    #[error("mapping values are not supported for clause '{0}'")]
    MappingNotAllowed(String),

    #[error("unknown post-insert transform: {0}")]
    UnknownPostTransform(String),

    #[error("invalid response header '{0}'")]
    InvalidHeader(String),

    #[error("could not read routes file: {0}")]
    ReadRoutesFile(std::io::Error),

    #[error("could not parse routes file: {0}")]
    ParseRoutesFile(#[from] serde_yaml::Error),

    #[error("could not serialize route configuration: {0}")]
    SerializeConfig(#[from] serde_json::Error),
}
