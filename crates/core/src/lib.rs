//! # U-Cutplan Core
//!
//! Shared building blocks for the u-cutplan guillotine cutting planner.
//!
//! ## Core Components
//!
//! - **Errors**: [`Error`], [`Result`]
//! - **Configuration**: [`Config`], [`Strategy`] - planner tuning knobs
//! - **Progress**: [`ProgressInfo`]
//! - **GA framework**: [`GaRunner`], [`GaProblem`], [`Individual`]
//! - **Summaries**: [`SolveSummary`]
//!
//! ## Configuration
//!
//! ```rust
//! use u_cutplan_core::{Config, Strategy};
//!
//! let config = Config::new()
//!     .with_strategy(Strategy::StrategySearch)
//!     .with_min_break(50.0)
//!     .with_max_sheets(20);
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support
//! - `parallel`: Evaluate GA generations on the rayon thread pool

pub mod error;
pub mod ga;
pub mod result;
pub mod solver;

// Re-exports
pub use error::{Error, Result};
pub use ga::{GaConfig, GaProblem, GaProgress, GaResult, GaRunner, Individual};
pub use result::SolveSummary;
pub use solver::{Config, ProgressInfo, Strategy};
