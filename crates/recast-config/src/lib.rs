//! Configuration for hosts of the Recast rewrite engine.
//!
//! [`Config`] derives [`OrthoConfig`](ortho_config::OrthoConfig), so its
//! layers follow the usual precedence, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file named by `--config-path` or `RECAST_CONFIG_PATH`
//! 3. `RECAST_*` environment variables
//! 4. command-line flags such as `--max-passes`
//!
//! [`Config::resolve_from_iter`] loads every layer and validates the result.
//! Malformed files surface as a single aggregated loader error rather than
//! stopping at the first bad layer.

mod defaults;
mod error;
mod logging;

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use recast_core::EngineConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, default_log_filter, default_log_filter_string,
    default_log_format, default_max_passes,
};
pub use error::ConfigError;
pub use logging::{LogFormat, LogFormatParseError};

/// Environment variable overriding [`Config::max_passes`].
pub const ENV_MAX_PASSES: &str = "RECAST_MAX_PASSES";
/// Environment variable overriding [`Config::worker_threads`].
pub const ENV_WORKER_THREADS: &str = "RECAST_WORKER_THREADS";
/// Environment variable overriding [`Config::log_filter`].
pub const ENV_LOG_FILTER: &str = "RECAST_LOG_FILTER";
/// Environment variable overriding [`Config::log_format`].
pub const ENV_LOG_FORMAT: &str = "RECAST_LOG_FORMAT";
/// Environment variable naming the configuration file.
pub const ENV_CONFIG_PATH: &str = "RECAST_CONFIG_PATH";

/// Resolved engine and host settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(prefix = "RECAST")]
pub struct Config {
    /// Pass budget per compilation unit.
    #[ortho_config(default = default_max_passes())]
    max_passes: u32,
    /// Size of the dedicated batch worker pool.
    worker_threads: Option<usize>,
    /// Log filter expression in `EnvFilter` syntax.
    #[ortho_config(default = default_log_filter_string())]
    log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
            worker_threads: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads every layer from the process environment and arguments, then
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a layer fails to load or merge and
    /// [`ConfigError::InvalidValue`] when the merged settings are out of
    /// their domain.
    pub fn resolve() -> Result<Self, ConfigError> {
        Self::resolve_from_iter(std::env::args_os())
    }

    /// Loads every layer using `args` as the command line, then validates
    /// the result. The first argument is the program name.
    ///
    /// # Errors
    ///
    /// See [`Config::resolve`].
    pub fn resolve_from_iter<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let config = Self::load_from_iter(args).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Decodes configuration from TOML text. Missing keys keep their
    /// defaults. Used by embedders that hold settings in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] for malformed TOML or values of the
    /// wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Decode {
            source: Box::new(source),
        })
    }

    /// Checks that every setting is within its domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero pass budget, a zero
    /// worker count or a blank log filter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_passes == 0 {
            return Err(ConfigError::invalid_value(
                "max_passes",
                "0",
                "at least one pass is required",
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(ConfigError::invalid_value(
                "worker_threads",
                "0",
                "a worker pool needs at least one thread",
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "log_filter",
                self.log_filter.as_str(),
                "filter expression is empty",
            ));
        }
        Ok(())
    }

    /// Pass budget per compilation unit.
    #[must_use]
    pub const fn max_passes(&self) -> u32 {
        self.max_passes
    }

    /// Size of the dedicated batch worker pool, if any.
    #[must_use]
    pub const fn worker_threads(&self) -> Option<usize> {
        self.worker_threads
    }

    /// Log filter expression in `EnvFilter` syntax.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Engine limits derived from this configuration.
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.max_passes, self.worker_threads)
    }
}
