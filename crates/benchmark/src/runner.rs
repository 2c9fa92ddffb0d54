//! Job runner.

use std::ops::ControlFlow;

use instant::Instant;
use u_cutplan_guillotine::{CutPlanner, Piece, SheetPlan};

use crate::job::{Job, JobMode};
use crate::result::{RunReport, SheetReport};

/// Runner options.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Attach piece rectangles and trees to the report.
    pub include_geometry: bool,
    /// Print GA progress to stdout.
    pub show_progress: bool,
}

/// Runs jobs through the planner.
#[derive(Debug, Clone, Default)]
pub struct JobRunner {
    config: RunnerConfig,
}

fn describe(piece: &Piece) -> String {
    format!("{}x{}", piece.width(), piece.height())
}

impl JobRunner {
    /// Creates a runner.
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Plans `job` and builds its report.
    pub fn run(&self, job: &Job) -> anyhow::Result<RunReport> {
        let start = Instant::now();
        let planner = CutPlanner::new(job.config()).with_ga_config(job.ga_config());
        log::info!(
            "job {}: {} pieces on {} x {} ({})",
            job.name,
            job.piece_count(),
            job.sheet.width,
            job.sheet.height,
            job.mode
        );

        let report = match job.mode {
            JobMode::Search => {
                let plan = planner.plan_sheet(&job.pieces, &job.sheet)?;
                self.single_sheet_report(job, plan)
            }
            JobMode::Genetic => {
                let show = self.config.show_progress;
                let plan = planner.plan_genetic_with(
                    &job.pieces,
                    &job.sheet,
                    job.seed,
                    |info| {
                        if show {
                            println!(
                                "  generation {:>3}/{}: best fitness {:.4}",
                                info.iteration, info.total_iterations, info.best_fitness
                            );
                        }
                    },
                    |_| ControlFlow::Continue(()),
                )?;
                self.single_sheet_report(job, plan)
            }
            JobMode::Sheets => {
                let plan = planner.plan_sheets(&job.pieces, &job.sheet, job.seed)?;
                let mut report = RunReport::new(&job.name, job.mode.to_string(), plan.summary());
                report.status = Some(plan.status);
                report.unplaced = plan.unplaced.iter().map(describe).collect();

                let mut same_as = vec![None; plan.sheets.len()];
                for group in plan.layout_groups() {
                    if let Some((&first, rest)) = group.indices.split_first() {
                        for &i in rest {
                            same_as[i] = Some(first);
                        }
                    }
                }
                for (i, layout) in plan.sheets.iter().enumerate() {
                    let mut sheet = SheetReport::new(i, &layout.method, &layout.tree);
                    sheet.same_as = same_as[i];
                    if self.config.include_geometry {
                        sheet = sheet.with_geometry(&layout.tree);
                    }
                    report.sheets.push(sheet);
                }
                report
            }
        };

        log::info!(
            "job {} done in {} ms: {}/{} placed",
            job.name,
            start.elapsed().as_millis(),
            report.summary.total_placed,
            report.summary.total_requested
        );
        Ok(report)
    }

    fn single_sheet_report(&self, job: &Job, plan: SheetPlan) -> RunReport {
        let mut report = RunReport::new(&job.name, job.mode.to_string(), plan.summary());
        report.unplaced = plan.unplaced.iter().map(describe).collect();
        let mut sheet = SheetReport::new(0, &plan.method, &plan.tree);
        if self.config.include_geometry {
            sheet = sheet.with_geometry(&plan.tree);
        }
        report.sheets.push(sheet);
        report
    }
}
