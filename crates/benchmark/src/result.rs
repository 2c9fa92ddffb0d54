//! Run reports.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use u_cutplan_core::SolveSummary;
use u_cutplan_guillotine::{AllocationStatus, CutTree, PlacedRect};

/// One cut sheet of a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetReport {
    /// Sheet index in cutting order.
    pub index: usize,
    /// What produced the sheet.
    pub method: String,
    /// Pieces on the sheet.
    pub placed: usize,
    /// Placed area over usable area.
    pub utilization: f64,
    /// Index of the first sheet with the same layout.
    pub same_as: Option<usize>,
    /// Piece rectangles, for rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rects: Option<Vec<PlacedRect>>,
    /// Cut tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<CutTree>,
}

impl SheetReport {
    /// Creates a report for one sheet.
    pub fn new(index: usize, method: impl Into<String>, tree: &CutTree) -> Self {
        Self {
            index,
            method: method.into(),
            placed: tree.placed_piece_count(),
            utilization: tree.utilization(),
            same_as: None,
            rects: None,
            tree: None,
        }
    }

    /// Attaches the piece rectangles and the tree.
    pub fn with_geometry(mut self, tree: &CutTree) -> Self {
        self.rects = Some(tree.leaf_rects());
        self.tree = Some(tree.clone());
        self
    }
}

/// Result of running one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Job name.
    pub job: String,
    /// Planning mode.
    pub mode: String,
    /// Totals.
    pub summary: SolveSummary,
    /// Allocation status, for multi-sheet runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AllocationStatus>,
    /// Unplaced pieces as `width x height`.
    pub unplaced: Vec<String>,
    /// Sheets in cutting order.
    pub sheets: Vec<SheetReport>,
    /// Unix time of the run in seconds.
    pub timestamp: u64,
}

impl RunReport {
    /// Creates an empty report.
    pub fn new(job: impl Into<String>, mode: impl Into<String>, summary: SolveSummary) -> Self {
        Self {
            job: job.into(),
            mode: mode.into(),
            summary,
            status: None,
            unplaced: Vec::new(),
            sheets: Vec::new(),
            timestamp: unix_seconds(),
        }
    }

    /// Distinct layouts among the sheets.
    pub fn distinct_layouts(&self) -> usize {
        self.sheets.iter().filter(|s| s.same_as.is_none()).count()
    }

    /// Saves the report as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Prints a summary table to stdout.
    pub fn print_summary(&self) {
        println!("\n{:=<72}", "");
        println!("CUT PLAN: {} ({})", self.job, self.mode);
        println!("{:=<72}", "");
        println!(
            "{:<8} {:<36} {:>8} {:>8} {:>8}",
            "Sheet", "Method", "Pieces", "Util%", "Layout"
        );
        println!("{:-<72}", "");

        for sheet in &self.sheets {
            let layout = sheet
                .same_as
                .map_or("new".to_string(), |i| format!("={}", i + 1));
            println!(
                "{:<8} {:<36} {:>8} {:>8.1} {:>8}",
                sheet.index + 1,
                sheet.method,
                sheet.placed,
                sheet.utilization * 100.0,
                layout
            );
        }

        println!("{:-<72}", "");
        println!(
            "placed {}/{} on {} sheets ({} distinct), utilization {}, {} ms",
            self.summary.total_placed,
            self.summary.total_requested,
            self.summary.sheets_used,
            self.distinct_layouts(),
            self.summary.utilization_percent(),
            self.summary.time_ms
        );
        if let Some(status) = self.status {
            println!("status: {:?}", status);
        }
        if !self.unplaced.is_empty() {
            println!("unplaced: {}", self.unplaced.join(", "));
        }
        println!("{:=<72}\n", "");
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
