//! Unit tests for `recast_core` types.

mod config_tests;
