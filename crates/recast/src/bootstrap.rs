//! Host start-up: configuration, telemetry, then the engine.

use std::sync::Arc;

use recast_config::{Config, ConfigError};
use recast_syntax::TypeOracle;
use thiserror::Error;
use tracing::info;

use crate::engine::Engine;
use crate::rule::RuleSet;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

const BOOTSTRAP_TARGET: &str = "recast::bootstrap";

/// Source of the host configuration, replaceable in tests.
pub trait ConfigLoader: Send + Sync {
    /// Loads and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a layer fails to load or a setting is
    /// out of its domain.
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Loader that reads the process arguments and environment through
/// [`Config::resolve`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::resolve()
    }
}

/// Errors surfaced while starting a host.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// A configured engine together with the settings it was built from.
pub struct Host {
    config: Config,
    telemetry: TelemetryHandle,
    engine: Engine,
}

impl Host {
    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Telemetry handle, mostly useful in tests.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// The engine, limited by the configuration.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Releases the engine.
    #[must_use]
    pub fn into_engine(self) -> Engine {
        self.engine
    }
}

/// Starts a host from the process arguments and environment.
///
/// # Errors
///
/// See [`bootstrap_with`].
pub fn bootstrap(rules: RuleSet, oracle: Arc<dyn TypeOracle>) -> Result<Host, BootstrapError> {
    bootstrap_with(&SystemConfigLoader, rules, oracle)
}

/// Loads configuration through `loader`, installs telemetry and builds an
/// engine over `rules`.
///
/// # Errors
///
/// Returns [`BootstrapError::Configuration`] when the loader fails and
/// [`BootstrapError::Telemetry`] when the subscriber cannot be installed.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    rules: RuleSet,
    oracle: Arc<dyn TypeOracle>,
) -> Result<Host, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    let engine = Engine::new(rules, oracle).with_config(config.engine_config());
    info!(
        target: BOOTSTRAP_TARGET,
        rules = engine.rules().len(),
        max_passes = config.max_passes(),
        worker_threads = ?config.worker_threads(),
        "engine ready"
    );
    Ok(Host {
        config,
        telemetry,
        engine,
    })
}

#[cfg(test)]
mod tests {
    use recast_syntax::TypeTable;

    use super::*;
    use crate::SourceUnit;
    use crate::tests::support::Rename;

    struct FixedLoader(&'static str);

    impl ConfigLoader for FixedLoader {
        fn load(&self) -> Result<Config, ConfigError> {
            let config = Config::from_toml_str(self.0)?;
            config.validate()?;
            Ok(config)
        }
    }

    fn jdk() -> Arc<dyn TypeOracle> {
        Arc::new(TypeTable::with_jdk())
    }

    #[test]
    fn engine_limits_follow_the_configuration() {
        let loader = FixedLoader("max_passes = 3\nworker_threads = 2\nlog_format = \"compact\"\n");
        let host = bootstrap_with(&loader, RuleSet::new().with(Rename::new("a", "x")), jdk())
            .expect("host starts");

        assert_eq!(host.config().max_passes(), 3);
        assert_eq!(host.engine().config().max_passes(), 3);
        assert_eq!(host.engine().config().worker_threads(), Some(2));

        let report = host
            .into_engine()
            .run(&SourceUnit::new("A.java", "class A { int a; }"));
        assert_eq!(
            report.outcome().expect("unit converges").source(),
            "class A { int x; }"
        );
    }

    #[test]
    fn configuration_failures_stop_the_start_up() {
        let loader = FixedLoader("max_passes = 0\n");
        let err = bootstrap_with(&loader, RuleSet::new(), jdk())
            .err()
            .expect("start-up should fail");
        match err {
            BootstrapError::Configuration { source } => {
                assert_eq!(source.key(), Some("max_passes"));
            }
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }
}
