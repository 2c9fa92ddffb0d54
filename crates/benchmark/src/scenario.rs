//! Built-in validation scenarios.
//!
//! Each scenario plans a small job and checks the resulting trees against
//! structural rules (disjoint rectangles inside the sheet, area agreement,
//! children within their parent, minimum break, inventory conservation) plus
//! scenario-specific expectations.

use serde::{Deserialize, Serialize};
use u_cutplan_guillotine::{find_violations, CutTree, MinBreak, PieceItem, Sheet};

use crate::job::{Job, JobMode};
use crate::runner::{JobRunner, RunnerConfig};

const EPS: f64 = 1e-6;

/// Expectations checked after the structural rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuccessCriteria {
    /// Exact number of placed pieces.
    #[serde(default)]
    pub placed: Option<usize>,
    /// Exact number of unplaced pieces.
    #[serde(default)]
    pub unplaced: Option<usize>,
    /// Minimum overall utilization.
    #[serde(default)]
    pub min_utilization: Option<f64>,
}

/// A validation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario id.
    pub id: String,
    /// What the scenario checks.
    pub purpose: String,
    /// Job to plan.
    pub job: Job,
    /// Expectations.
    pub criteria: SuccessCriteria,
}

/// Outcome of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario id.
    pub id: String,
    /// True when no check failed.
    pub passed: bool,
    /// Failed checks.
    pub failures: Vec<String>,
    /// Pieces placed.
    pub placed: usize,
    /// Overall utilization.
    pub utilization: f64,
}

/// The built-in scenarios.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "GT-S01".into(),
            purpose: "ten identical panels fit one sheet".into(),
            job: Job::new(
                "ten_panels",
                Sheet::new(2750.0, 1220.0),
                vec![PieceItem::new(10, 600.0, 400.0)],
            )
            .with_mode(JobMode::Search),
            criteria: SuccessCriteria {
                placed: Some(10),
                unplaced: Some(0),
                min_utilization: Some(0.715),
            },
        },
        Scenario {
            id: "GT-S02".into(),
            purpose: "oversized squares are carried over, not dropped".into(),
            job: Job::new(
                "large_squares",
                Sheet::new(1000.0, 1000.0),
                vec![PieceItem::new(3, 600.0, 600.0)],
            )
            .with_mode(JobMode::Search),
            criteria: SuccessCriteria {
                placed: Some(1),
                unplaced: Some(2),
                ..Default::default()
            },
        },
        Scenario {
            id: "GT-S03".into(),
            purpose: "column widths closer than the minimum break are rejected".into(),
            job: Job::new(
                "close_columns",
                Sheet::new(3000.0, 1200.0),
                vec![
                    PieceItem::new(1, 1030.0, 1200.0),
                    PieceItem::new(1, 1000.0, 1200.0),
                ],
            )
            .with_mode(JobMode::Search)
            .with_min_break(50.0),
            criteria: SuccessCriteria {
                placed: Some(2),
                unplaced: Some(0),
                ..Default::default()
            },
        },
        Scenario {
            id: "GT-S04".into(),
            purpose: "multi-sheet allocation places a mixed inventory".into(),
            job: Job::new(
                "mixed_sheets",
                Sheet::new(2750.0, 1830.0),
                vec![
                    PieceItem::new(12, 800.0, 600.0).with_label("side"),
                    PieceItem::new(8, 450.0, 300.0).with_label("shelf"),
                    PieceItem::new(5, 1200.0, 200.0).with_label("rail"),
                ],
            )
            .with_min_break(20.0),
            criteria: SuccessCriteria {
                placed: Some(25),
                unplaced: Some(0),
                ..Default::default()
            },
        },
    ]
}

/// Structural problems of one tree.
pub fn check_tree(tree: &CutTree, min_break: f64) -> Vec<String> {
    let mut failures = Vec::new();
    let rects = tree.leaf_rects();
    for (i, a) in rects.iter().enumerate() {
        if a.x < -EPS
            || a.y < -EPS
            || a.x + a.width > tree.usable_width() + EPS
            || a.y + a.height > tree.usable_height() + EPS
        {
            failures.push(format!("piece {} leaves the sheet", a.node));
        }
        if rects[i + 1..].iter().any(|b| a.overlaps(b)) {
            failures.push(format!("piece {} overlaps another piece", a.node));
        }
    }

    let leaf_area: f64 = rects.iter().map(|r| r.area()).sum();
    if (leaf_area - tree.placed_area()).abs() > EPS * leaf_area.max(1.0) {
        failures.push(format!(
            "placed area {} disagrees with rectangles {}",
            tree.placed_area(),
            leaf_area
        ));
    }

    for node in tree.iter() {
        let Some(&first) = node.children().first() else {
            continue;
        };
        let along_width = tree[first].axis().measures_width();
        let bound = frame_extent(tree, node, along_width);
        if tree.used_along(node.id()) > bound + EPS {
            failures.push(format!("children of {} exceed {}", node.id(), bound));
        }
    }

    for v in find_violations(tree, MinBreak::new(min_break)) {
        failures.push(format!("minimum break: {:?}", v));
    }
    failures
}

fn frame_extent(tree: &CutTree, node: &u_cutplan_guillotine::CutNode, along_width: bool) -> f64 {
    let mut current = Some(node.id());
    while let Some(id) = current {
        let n = &tree[id];
        if n.axis().measures_width() == along_width {
            return n.value();
        }
        current = n.parent();
    }
    if along_width {
        tree.usable_width()
    } else {
        tree.usable_height()
    }
}

/// Runs one scenario.
pub fn run_scenario(scenario: &Scenario) -> ScenarioResult {
    let runner = JobRunner::new(RunnerConfig {
        include_geometry: true,
        show_progress: false,
    });
    let mut failures = Vec::new();

    let report = match runner.run(&scenario.job) {
        Ok(report) => report,
        Err(e) => {
            return ScenarioResult {
                id: scenario.id.clone(),
                passed: false,
                failures: vec![format!("planning failed: {}", e)],
                placed: 0,
                utilization: 0.0,
            }
        }
    };

    let summary = &report.summary;
    for sheet in &report.sheets {
        if let Some(tree) = &sheet.tree {
            for failure in check_tree(tree, scenario.job.min_break) {
                failures.push(format!("sheet {}: {}", sheet.index + 1, failure));
            }
        }
    }

    if summary.total_placed + report.unplaced.len() != summary.total_requested {
        failures.push(format!(
            "{} placed + {} unplaced != {} requested",
            summary.total_placed,
            report.unplaced.len(),
            summary.total_requested
        ));
    }
    if let Some(expected) = scenario.criteria.placed {
        if summary.total_placed != expected {
            failures.push(format!("placed {}, expected {}", summary.total_placed, expected));
        }
    }
    if let Some(expected) = scenario.criteria.unplaced {
        if report.unplaced.len() != expected {
            failures.push(format!("unplaced {}, expected {}", report.unplaced.len(), expected));
        }
    }
    if let Some(min) = scenario.criteria.min_utilization {
        if summary.utilization + EPS < min {
            failures.push(format!(
                "utilization {:.3} below {:.3}",
                summary.utilization, min
            ));
        }
    }

    ScenarioResult {
        id: scenario.id.clone(),
        passed: failures.is_empty(),
        failures,
        placed: summary.total_placed,
        utilization: summary.utilization,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_cutplan_guillotine::CutAxis;

    #[test]
    fn test_builtin_scenarios_pass() {
        for scenario in builtin_scenarios() {
            let result = run_scenario(&scenario);
            assert!(result.passed, "{}: {:?}", result.id, result.failures);
        }
    }

    #[test]
    fn test_check_tree_reports_overrun() {
        let mut tree = CutTree::new(1000.0, 1000.0);
        let x = tree.add_child(tree.root(), CutAxis::X, 600.0, 1);
        tree.add_child(tree.root(), CutAxis::X, 600.0, 1);
        let y = tree.add_child(x, CutAxis::Y, 500.0, 1);
        tree.add_child(y, CutAxis::Z, 600.0, 1);

        let failures = check_tree(&tree, 0.0);
        assert!(failures.iter().any(|f| f.contains("exceed")));
    }

    #[test]
    fn test_scenario_json_roundtrip() {
        let scenarios = builtin_scenarios();
        let json = serde_json::to_string(&scenarios[2]).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "GT-S03");
        assert_eq!(back.job.min_break, 50.0);
        assert_eq!(back.criteria.placed, Some(2));
    }
}
