//! Job runner for the u-cutplan guillotine planner.
//!
//! This crate provides:
//! - Job files (TOML or JSON) describing a sheet, an inventory and a mode
//! - A runner that plans jobs and builds JSON-ready reports
//! - Seeded synthetic job generation
//! - Built-in validation scenarios with structural tree checks

mod job;
mod result;
mod runner;
mod scenario;
mod synthetic;

pub use job::{GaSettings, Job, JobMode};
pub use result::{RunReport, SheetReport};
pub use runner::{JobRunner, RunnerConfig};
pub use scenario::{
    builtin_scenarios, check_tree, run_scenario, Scenario, ScenarioResult, SuccessCriteria,
};
pub use synthetic::{SyntheticGenerator, SyntheticJobs, STANDARD_SHEET};
