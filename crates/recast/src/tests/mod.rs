//! Crate-level tests for the engine facade.

mod engine_tests;
pub(crate) mod support;
