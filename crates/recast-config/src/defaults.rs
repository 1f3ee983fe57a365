use recast_core::DEFAULT_MAX_PASSES;

use crate::logging::LogFormat;

/// Default log filter expression used by hosts of the engine.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default pass budget per compilation unit.
#[must_use]
pub const fn default_max_passes() -> u32 {
    DEFAULT_MAX_PASSES
}
