//! Solve summary representation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Summary statistics for a planning run.
///
/// Produced by the planner front-ends from their sheet results; it carries no
/// tree data so it is cheap to log and serialize.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveSummary {
    /// Total original pieces requested.
    pub total_requested: usize,
    /// Total original pieces placed.
    pub total_placed: usize,
    /// Number of sheets used.
    pub sheets_used: usize,
    /// Placed area over the usable area of all sheets used (0.0 - 1.0).
    pub utilization: f64,
    /// Computation time in milliseconds.
    pub time_ms: u64,
    /// Strategy used.
    pub strategy: String,
}

impl SolveSummary {
    /// Creates an empty summary for the given strategy.
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            ..Default::default()
        }
    }

    /// Returns the number of pieces left unplaced.
    pub fn unplaced_count(&self) -> usize {
        self.total_requested.saturating_sub(self.total_placed)
    }

    /// Returns true if every requested piece was placed.
    pub fn all_placed(&self) -> bool {
        self.total_placed >= self.total_requested
    }

    /// Returns placed / requested (1.0 for an empty request).
    pub fn placement_ratio(&self) -> f64 {
        if self.total_requested == 0 {
            1.0
        } else {
            self.total_placed as f64 / self.total_requested as f64
        }
    }

    /// Returns utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.utilization * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_new() {
        let summary = SolveSummary::new("search");
        assert_eq!(summary.strategy, "search");
        assert!(summary.all_placed());
        assert_eq!(summary.placement_ratio(), 1.0);
    }

    #[test]
    fn test_summary_counts() {
        let summary = SolveSummary {
            total_requested: 10,
            total_placed: 8,
            sheets_used: 2,
            utilization: 0.75,
            time_ms: 12,
            strategy: "genetic".into(),
        };

        assert_eq!(summary.unplaced_count(), 2);
        assert!(!summary.all_placed());
        assert!((summary.placement_ratio() - 0.8).abs() < 1e-12);
        assert_eq!(summary.utilization_percent(), "75.0%");
    }
}
