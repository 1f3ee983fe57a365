//! Crate-level tests for the built-in catalogue.

mod catalog_tests;
