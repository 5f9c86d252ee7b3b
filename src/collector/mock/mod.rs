//! Mock command runner for testing.
//!
//! This module provides `MockRunner` and pre-built host scenarios for testing
//! the collector without shelling out to real tools.

mod runner;
mod scenarios;

pub use runner::MockRunner;
