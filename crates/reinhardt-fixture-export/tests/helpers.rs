//! Test helpers for reinhardt-fixture-export tests.
//!
//! This module provides prebuilt object graphs shared by the integration
//! tests.

#[path = "helpers/catalog.rs"]
pub mod catalog;
