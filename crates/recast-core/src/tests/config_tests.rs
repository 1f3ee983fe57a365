//! Tests for [`EngineConfig`].

use crate::{DEFAULT_MAX_PASSES, EngineConfig};

#[test]
fn default_config_has_expected_values() {
    let config = EngineConfig::default();
    assert_eq!(config.max_passes(), DEFAULT_MAX_PASSES);
    assert_eq!(config.max_passes(), 10);
    assert!(config.worker_threads().is_none());
}

#[test]
fn custom_config_construction() {
    let config = EngineConfig::new(3, Some(4));
    assert_eq!(config.max_passes(), 3);
    assert_eq!(config.worker_threads(), Some(4));
}

#[test]
fn zero_pass_budget_is_raised_to_one() {
    assert_eq!(EngineConfig::new(0, None).max_passes(), 1);
    assert_eq!(EngineConfig::default().with_max_passes(0).max_passes(), 1);
}

#[test]
fn builders_preserve_other_fields() {
    let config = EngineConfig::default()
        .with_worker_threads(Some(2))
        .with_max_passes(7);
    assert_eq!(config, EngineConfig::new(7, Some(2)));
}
