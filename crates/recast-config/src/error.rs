use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A layer failed to load or the layers failed to merge.
    #[error("failed to load configuration: {source}")]
    Load {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },

    /// In-memory TOML text does not decode into [`Config`](crate::Config).
    #[error("failed to decode configuration: {source}")]
    Decode {
        /// Underlying decode failure.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A setting holds a value outside its domain.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Offending value as text.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns the setting an [`InvalidValue`](Self::InvalidValue) error names.
    #[must_use]
    pub const fn key(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { key, .. } => Some(key.as_str()),
            Self::Load { .. } | Self::Decode { .. } => None,
        }
    }

    /// Returns the loader error behind a [`Load`](Self::Load) failure.
    #[must_use]
    pub const fn loader_error(&self) -> Option<&Arc<OrthoError>> {
        match self {
            Self::Load { source } => Some(source),
            Self::Decode { .. } | Self::InvalidValue { .. } => None,
        }
    }
}

impl From<Arc<OrthoError>> for ConfigError {
    fn from(source: Arc<OrthoError>) -> Self {
        Self::Load { source }
    }
}
