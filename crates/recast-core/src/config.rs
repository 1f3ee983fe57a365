//! Engine configuration for pass budgets and batch parallelism.

/// Default number of passes a compilation unit may take to converge.
pub const DEFAULT_MAX_PASSES: u32 = 10;

/// Engine configuration controlling convergence limits and worker sizing.
///
/// # Defaults
///
/// - `max_passes`: 10
/// - `worker_threads`: `None` (use the shared global pool)
///
/// # Example
///
/// ```
/// use recast_core::EngineConfig;
///
/// let config = EngineConfig::default().with_max_passes(3);
/// assert_eq!(config.max_passes(), 3);
/// assert!(config.worker_threads().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum passes per compilation unit, including the confirming pass.
    max_passes: u32,
    /// Size of the dedicated batch worker pool, if any.
    worker_threads: Option<usize>,
}

impl EngineConfig {
    /// Creates a new engine configuration with explicit values.
    ///
    /// A zero pass budget is raised to one so the driver always scans at
    /// least once.
    #[must_use]
    pub const fn new(max_passes: u32, worker_threads: Option<usize>) -> Self {
        Self {
            max_passes: if max_passes == 0 { 1 } else { max_passes },
            worker_threads,
        }
    }

    /// Returns a copy of this configuration with a different pass budget.
    #[must_use]
    pub const fn with_max_passes(self, max_passes: u32) -> Self {
        Self::new(max_passes, self.worker_threads)
    }

    /// Returns a copy of this configuration with a dedicated worker pool size.
    #[must_use]
    pub const fn with_worker_threads(self, worker_threads: Option<usize>) -> Self {
        Self::new(self.max_passes, worker_threads)
    }

    /// Returns the maximum number of passes per compilation unit.
    #[must_use]
    pub const fn max_passes(&self) -> u32 {
        self.max_passes
    }

    /// Returns the dedicated worker pool size, if configured.
    #[must_use]
    pub const fn worker_threads(&self) -> Option<usize> {
        self.worker_threads
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PASSES, None)
    }
}
