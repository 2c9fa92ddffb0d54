//! Guillotine cut planner CLI

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use u_cutplan_benchmark::{
    builtin_scenarios, run_scenario, Job, JobMode, JobRunner, RunnerConfig, SyntheticGenerator,
    SyntheticJobs, STANDARD_SHEET,
};

#[derive(Parser)]
#[command(name = "cutplan-runner")]
#[command(about = "Guillotine cutting-stock planner")]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a job file (.toml or .json)
    Run {
        /// Path to the job file
        job: PathBuf,

        /// Override the job's planning mode
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Override the job's GA seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Override the job's minimum break
        #[arg(long)]
        min_break: Option<f64>,

        /// Output file for the report (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include piece rectangles and cut trees in the report
        #[arg(long)]
        geometry: bool,
    },

    /// Generate a seeded synthetic job
    Synthetic {
        /// Random seed for reproducibility
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Number of inventory entries
        #[arg(short, long, default_value = "20")]
        count: usize,

        /// Kind of inventory
        #[arg(short, long, value_enum, default_value = "mixed")]
        kind: KindArg,

        /// Output file (JSON), or a directory with --all
        #[arg(short, long, default_value = "job.json")]
        output: PathBuf,

        /// Write every preset job into the output directory
        #[arg(long)]
        all: bool,
    },

    /// Run the built-in validation scenarios
    Scenarios {
        /// Run only this scenario
        #[arg(short = 'i', long)]
        scenario_id: Option<String>,

        /// Output file for the results (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Best single sheet by strategy search
    Search,
    /// Every piece over as many sheets as needed
    Sheets,
    /// Best single sheet by genetic search
    Genetic,
}

impl From<ModeArg> for JobMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Search => JobMode::Search,
            ModeArg::Sheets => JobMode::Sheets,
            ModeArg::Genetic => JobMode::Genetic,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    /// Cabinet sides, shelves, rails and fillers
    Mixed,
    /// Few sizes in large quantities
    Repetitive,
    /// Long narrow strips
    Strips,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Run {
            job,
            mode,
            seed,
            min_break,
            output,
            geometry,
        } => {
            let mut job = Job::load(&job)?;
            if let Some(mode) = mode {
                job.mode = mode.into();
            }
            if let Some(seed) = seed {
                job.seed = seed;
            }
            if let Some(min_break) = min_break {
                job.min_break = min_break;
            }

            let runner = JobRunner::new(RunnerConfig {
                include_geometry: geometry,
                show_progress: cli.verbose,
            });
            let report = runner.run(&job)?;
            report.print_summary();

            if let Some(path) = output {
                report.save_json(&path)?;
                println!("Report saved to: {}", path.display());
            }
        }

        Commands::Synthetic {
            seed,
            count,
            kind,
            output,
            all,
        } => {
            if all {
                std::fs::create_dir_all(&output)?;
                println!("Generating synthetic jobs (seed={}) to {}...", seed, output.display());
                let jobs = SyntheticJobs::all(seed);
                for job in &jobs {
                    let path = output.join(format!("{}.json", job.name));
                    job.save_json(&path)?;
                    println!("  {} ... OK ({} entries, {} pieces)", job.name, job.pieces.len(), job.piece_count());
                }
                println!("\nGenerated {} synthetic jobs", jobs.len());
            } else {
                let mut generator = SyntheticGenerator::with_seed(seed);
                let job = match kind {
                    KindArg::Mixed => generator.mixed(count, STANDARD_SHEET),
                    KindArg::Repetitive => generator.repetitive(count, STANDARD_SHEET),
                    KindArg::Strips => generator.strips(count, STANDARD_SHEET),
                };
                job.save_json(&output)?;
                println!(
                    "{} saved to {} ({} entries, {} pieces)",
                    job.name,
                    output.display(),
                    job.pieces.len(),
                    job.piece_count()
                );
            }
        }

        Commands::Scenarios { scenario_id, output } => {
            let scenarios = builtin_scenarios();
            let selected: Vec<_> = match &scenario_id {
                Some(id) => scenarios.iter().filter(|s| &s.id == id).collect(),
                None => scenarios.iter().collect(),
            };
            if selected.is_empty() {
                anyhow::bail!("Unknown scenario ID: {}", scenario_id.unwrap_or_default());
            }

            println!("\nValidation Scenarios");
            println!("{}", "=".repeat(60));
            let mut results = Vec::with_capacity(selected.len());
            for scenario in selected {
                let result = run_scenario(scenario);
                println!(
                    "{:<8} {:<6} placed={:<4} util={:>5.1}%  {}",
                    result.id,
                    if result.passed { "PASS" } else { "FAIL" },
                    result.placed,
                    result.utilization * 100.0,
                    scenario.purpose
                );
                for failure in &result.failures {
                    println!("         - {}", failure);
                }
                results.push(result);
            }

            let failed = results.iter().filter(|r| !r.passed).count();
            println!("\nTotal: {} scenarios, {} failed", results.len(), failed);

            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_string_pretty(&results)?)?;
                println!("Results saved to: {}", path.display());
            }
            if failed > 0 {
                anyhow::bail!("{} scenario(s) failed", failed);
            }
        }
    }

    Ok(())
}
