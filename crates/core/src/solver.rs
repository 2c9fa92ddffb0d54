//! Planner configuration and progress reporting.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Optimization strategy used by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// Deterministic cross-product of orientations and grouping parameters
    /// (fast, reproducible).
    #[default]
    StrategySearch,
    /// Genetic search over rotation and grouping genes across several
    /// simulated sheets (slower, higher utilization).
    Genetic,
}

/// Common configuration for the guillotine planner.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Optimization strategy.
    pub strategy: Strategy,

    /// Minimum distance between two non-coincident parallel cuts (0 = off).
    pub min_break: f64,

    /// Number of upcoming queue pieces inspected when scoring a candidate.
    pub score_lookahead: usize,

    /// Number of upcoming queue pieces inspected by the extend-to-edge check.
    pub residual_lookahead: usize,

    /// Number of fitting pieces scored per void during void filling.
    pub void_candidates: usize,

    /// Whether the strategy search tries grouping variants at all.
    pub grouping: bool,

    /// Tolerances (length units) tried by the fuzzy grouping strategies.
    pub fuzzy_tolerances: Vec<f64>,

    /// Maximum group sizes tried by the bucket grouping strategies
    /// (`None` = bounded only by the sheet).
    pub max_group_sizes: Vec<Option<usize>>,

    /// Upper bound on sheets produced by the multi-sheet allocator.
    pub max_sheets: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            min_break: 0.0,
            score_lookahead: 3,
            residual_lookahead: 5,
            void_candidates: 5,
            grouping: true,
            fuzzy_tolerances: vec![10.0, 30.0],
            max_group_sizes: vec![None, Some(2), Some(4)],
            max_sheets: 100,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the optimization strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the minimum break distance.
    pub fn with_min_break(mut self, min_break: f64) -> Self {
        self.min_break = min_break;
        self
    }

    /// Sets the scoring lookahead window.
    pub fn with_score_lookahead(mut self, window: usize) -> Self {
        self.score_lookahead = window;
        self
    }

    /// Sets the extend-to-edge lookahead window.
    pub fn with_residual_lookahead(mut self, window: usize) -> Self {
        self.residual_lookahead = window;
        self
    }

    /// Sets the number of candidates scored per void.
    pub fn with_void_candidates(mut self, count: usize) -> Self {
        self.void_candidates = count.max(1);
        self
    }

    /// Enables or disables grouping variants in the strategy search.
    pub fn with_grouping(mut self, enabled: bool) -> Self {
        self.grouping = enabled;
        self
    }

    /// Sets the fuzzy grouping tolerances.
    pub fn with_fuzzy_tolerances(mut self, tolerances: Vec<f64>) -> Self {
        self.fuzzy_tolerances = tolerances;
        self
    }

    /// Sets the maximum group sizes tried by bucket grouping.
    pub fn with_max_group_sizes(mut self, sizes: Vec<Option<usize>>) -> Self {
        self.max_group_sizes = sizes;
        self
    }

    /// Sets the multi-sheet iteration cap.
    pub fn with_max_sheets(mut self, max_sheets: usize) -> Self {
        self.max_sheets = max_sheets;
        self
    }

    /// Checks that every value is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.min_break.is_finite() || self.min_break < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_break must be a non-negative number, got {}",
                self.min_break
            )));
        }
        if self.score_lookahead == 0 {
            return Err(Error::InvalidConfig("score_lookahead must be at least 1".into()));
        }
        if self.residual_lookahead == 0 {
            return Err(Error::InvalidConfig("residual_lookahead must be at least 1".into()));
        }
        if self.void_candidates == 0 {
            return Err(Error::InvalidConfig("void_candidates must be at least 1".into()));
        }
        if self.max_sheets == 0 {
            return Err(Error::InvalidConfig("max_sheets must be at least 1".into()));
        }
        if let Some(t) = self
            .fuzzy_tolerances
            .iter()
            .find(|t| !t.is_finite() || **t < 0.0)
        {
            return Err(Error::InvalidConfig(format!(
                "fuzzy tolerance must be a non-negative number, got {}",
                t
            )));
        }
        if self.max_group_sizes.iter().any(|s| matches!(s, Some(n) if *n < 2)) {
            return Err(Error::InvalidConfig(
                "a maximum group size must allow at least 2 pieces".into(),
            ));
        }
        Ok(())
    }
}

/// Progress information during solving.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressInfo {
    /// Current iteration/generation number.
    pub iteration: u32,
    /// Total expected iterations (0 if unknown).
    pub total_iterations: u32,
    /// Current best fitness value.
    pub best_fitness: f64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Current phase/stage description.
    pub phase: String,
    /// Whether the solver is still running.
    pub running: bool,
}

impl ProgressInfo {
    /// Creates a new progress info with default values.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Sets the iteration info.
    pub fn with_iteration(mut self, current: u32, total: u32) -> Self {
        self.iteration = current;
        self.total_iterations = total;
        self
    }

    /// Sets the best fitness.
    pub fn with_fitness(mut self, fitness: f64) -> Self {
        self.best_fitness = fitness;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Sets the phase description.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Marks the solver as finished.
    pub fn finished(mut self) -> Self {
        self.running = false;
        self
    }

    /// Calculates the progress percentage (0.0 to 1.0).
    pub fn progress_percent(&self) -> f64 {
        if self.total_iterations > 0 {
            self.iteration as f64 / self.total_iterations as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.strategy, Strategy::StrategySearch);
        assert_eq!(config.min_break, 0.0);
        assert_eq!(config.score_lookahead, 3);
        assert_eq!(config.residual_lookahead, 5);
        assert_eq!(config.max_sheets, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = Config::new()
            .with_min_break(50.0)
            .with_grouping(false)
            .with_void_candidates(0)
            .with_max_sheets(3);

        assert_eq!(config.min_break, 50.0);
        assert!(!config.grouping);
        assert_eq!(config.void_candidates, 1);
        assert_eq!(config.max_sheets, 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::new().with_min_break(-1.0).validate().is_err());
        assert!(Config::new().with_max_sheets(0).validate().is_err());
        assert!(Config::new()
            .with_fuzzy_tolerances(vec![f64::NAN])
            .validate()
            .is_err());
        assert!(Config::new()
            .with_max_group_sizes(vec![Some(1)])
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_zero_score_window() {
        let config = Config::new().with_score_lookahead(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert!(Config::new().with_score_lookahead(1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_residual_window() {
        let config = Config::new().with_residual_lookahead(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert!(Config::new().with_residual_lookahead(1).validate().is_ok());
    }

    #[test]
    fn test_progress_percent() {
        let info = ProgressInfo::new().with_iteration(5, 20);
        assert!(info.running);
        assert!((info.progress_percent() - 0.25).abs() < 1e-12);
        assert!(!info.finished().running);
    }
}
