//! Batch entry point: parse, drive, print.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use recast_core::{Diagnostic, EngineConfig};
use recast_syntax::{TypeOracle, parse};
use serde::{Deserialize, Serialize};
use tracing::{debug_span, error, warn};

use crate::driver::Driver;
use crate::error::UnitError;
use crate::report::{Rewritten, UnitReport};
use crate::rule::RuleSet;

const ENGINE_TARGET: &str = "recast::engine";

/// One compilation unit submitted to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    path: Utf8PathBuf,
    source: String,
}

impl SourceUnit {
    /// Creates a unit from its path and text.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Path used in reports and logs.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Applies a rule set to compilation units.
///
/// Units are independent: the engine shares only the read-only rule set and
/// type oracle between them, so [`Engine::run_batch`] processes them in
/// parallel. Every unit yields a [`UnitReport`]; a unit that fails to parse
/// or converge never affects the others.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use recast::{Engine, RuleSet, SourceUnit};
/// use recast_syntax::TypeTable;
///
/// let engine = Engine::new(RuleSet::new(), Arc::new(TypeTable::with_jdk()));
/// let report = engine.run(&SourceUnit::new("A.java", "class A {}\n"));
/// let rewritten = report.outcome().expect("unit parses");
/// assert_eq!(rewritten.source(), "class A {}\n");
/// ```
#[derive(Clone)]
pub struct Engine {
    rules: RuleSet,
    oracle: Arc<dyn TypeOracle>,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the default [`EngineConfig`].
    #[must_use]
    pub fn new(rules: RuleSet, oracle: Arc<dyn TypeOracle>) -> Self {
        Self {
            rules,
            oracle,
            config: EngineConfig::default(),
        }
    }

    /// Replaces the engine limits.
    #[must_use]
    pub const fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the pass budget, for example for one batch.
    #[must_use]
    pub const fn with_max_passes(mut self, max_passes: u32) -> Self {
        self.config = self.config.with_max_passes(max_passes);
        self
    }

    /// Active limits.
    #[must_use]
    pub const fn config(&self) -> EngineConfig {
        self.config
    }

    /// Active rules.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Rewrites one unit.
    ///
    /// A terminal failure is also appended to the report's diagnostics so
    /// hosts can print a single ordered list.
    #[must_use]
    pub fn run(&self, unit: &SourceUnit) -> UnitReport {
        let _span = debug_span!(target: ENGINE_TARGET, "unit", path = %unit.path).entered();
        let mut diagnostics = Vec::new();
        let outcome = self.rewrite(unit, &mut diagnostics);
        if let Err(err) = &outcome {
            diagnostics.push(err.to_diagnostic(None));
        }
        UnitReport::new(unit.path.clone(), outcome, diagnostics)
    }

    /// Rewrites every unit, returning reports in input order.
    ///
    /// Uses a dedicated pool when [`EngineConfig::worker_threads`] is set and
    /// the global rayon pool otherwise.
    #[must_use]
    pub fn run_batch(&self, units: &[SourceUnit]) -> Vec<UnitReport> {
        let Some(threads) = self.config.worker_threads() else {
            return self.run_parallel(units);
        };
        match ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("recast-worker-{index}"))
            .build()
        {
            Ok(pool) => pool.install(|| self.run_parallel(units)),
            Err(err) => {
                warn!(
                    target: ENGINE_TARGET,
                    threads,
                    error = %err,
                    "failed to build worker pool; using the global pool"
                );
                self.run_parallel(units)
            }
        }
    }

    fn run_parallel(&self, units: &[SourceUnit]) -> Vec<UnitReport> {
        units.par_iter().map(|unit| self.run(unit)).collect()
    }

    fn rewrite(
        &self,
        unit: &SourceUnit,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Rewritten, UnitError> {
        let tree = parse(&unit.source).map_err(|err| {
            let failure = UnitError::from_syntax(&err);
            error!(
                target: ENGINE_TARGET,
                path = %unit.path,
                error = %failure,
                "unit excluded from rewriting"
            );
            failure
        })?;
        let driver = Driver::new(&self.rules, self.oracle.as_ref(), self.config.max_passes());
        let (fixed_point, edits, passes) = driver.run(&tree, diagnostics)?.into_parts();
        Ok(Rewritten::new(fixed_point.print(), edits, passes))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("rules", &self.rules)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
