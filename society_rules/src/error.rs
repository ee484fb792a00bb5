//! Configuration and content errors.

use thiserror::Error;

/// Errors raised while loading or validating content against the registry.
///
/// Every variant is a startup failure. None of them are expected once a
/// session is running.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Content references a key the registry does not know.
    #[error("{owner} references unknown default '{key}'")]
    UnknownKey { owner: String, key: String },

    /// Two records share an identifier that must be unique.
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    /// A record carries a value outside its allowed range.
    #[error("{owner}: {reason}")]
    InvalidValue { owner: String, reason: String },

    /// The TOML source could not be parsed.
    #[error("failed to parse content: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result alias for content loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
