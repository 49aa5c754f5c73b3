//! Test infrastructure for UDON parser
//!
//! Provides fixture loading, stochastic test generation, and assertion helpers.
//! Not every test binary uses every helper.
#![allow(dead_code)]

mod generators;
mod harness;
mod loader;

pub use generators::Gen;
pub use harness::{check_well_formed, format_event, run_test, run_with_variations};
pub use loader::{load_fixtures_by_name, ExpectedEvent, TestCase};
