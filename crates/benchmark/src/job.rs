//! Job files.
//!
//! A job names a sheet, the inventory and how to plan it. Jobs are read from
//! TOML or JSON, chosen by file extension:
//!
//! ```toml
//! name = "kitchen"
//! mode = "sheets"
//! min_break = 50.0
//!
//! [sheet]
//! width = 2750.0
//! height = 1830.0
//! margin = 10.0
//!
//! [[pieces]]
//! quantity = 4
//! width = 720.0
//! height = 560.0
//! label = "side"
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use u_cutplan_core::{Config, Strategy};
use u_cutplan_guillotine::{CuttingGaConfig, PieceItem, Sheet};

/// How a job is planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    /// Best single sheet by strategy search.
    Search,
    /// Every piece, over as many sheets as needed.
    #[default]
    Sheets,
    /// Best single sheet by genetic search.
    Genetic,
}

impl fmt::Display for JobMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobMode::Search => "search",
            JobMode::Sheets => "sheets",
            JobMode::Genetic => "genetic",
        };
        f.write_str(name)
    }
}

/// GA overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GaSettings {
    /// Population size.
    pub population: Option<usize>,
    /// Generation count.
    pub generations: Option<u32>,
    /// Sheets simulated per evaluation.
    pub max_simulated_sheets: Option<usize>,
}

/// A planning job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Job name used in reports.
    #[serde(default = "default_name")]
    pub name: String,
    /// Stock sheet.
    pub sheet: Sheet,
    /// Minimum break between parallel cuts.
    #[serde(default)]
    pub min_break: f64,
    /// Planning mode.
    #[serde(default)]
    pub mode: JobMode,
    /// Use the genetic search per sheet in `sheets` mode.
    #[serde(default)]
    pub genetic_sheets: bool,
    /// GA seed.
    #[serde(default)]
    pub seed: u64,
    /// Sheet cap for `sheets` mode.
    #[serde(default)]
    pub max_sheets: Option<usize>,
    /// GA overrides.
    #[serde(default)]
    pub ga: GaSettings,
    /// Inventory.
    pub pieces: Vec<PieceItem>,
}

fn default_name() -> String {
    "job".to_string()
}

impl Job {
    /// Creates a job in `sheets` mode.
    pub fn new(name: impl Into<String>, sheet: Sheet, pieces: Vec<PieceItem>) -> Self {
        Self {
            name: name.into(),
            sheet,
            min_break: 0.0,
            mode: JobMode::default(),
            genetic_sheets: false,
            seed: 0,
            max_sheets: None,
            ga: GaSettings::default(),
            pieces,
        }
    }

    /// Sets the planning mode.
    pub fn with_mode(mut self, mode: JobMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the minimum break.
    pub fn with_min_break(mut self, min_break: f64) -> Self {
        self.min_break = min_break;
        self
    }

    /// Sets the GA seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reads a job from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read job file {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Self::from_toml(&text),
            Some("json") => Self::from_json(&text),
            _ => bail!("unsupported job file {} (expected .toml or .json)", path.display()),
        }
        .with_context(|| format!("invalid job file {}", path.display()))
    }

    /// Parses a TOML job.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Parses a JSON job.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Writes the job as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Total pieces in the inventory.
    pub fn piece_count(&self) -> usize {
        self.pieces.iter().map(|p| p.quantity as usize).sum()
    }

    /// Planner configuration for this job.
    pub fn config(&self) -> Config {
        let strategy = if self.genetic_sheets {
            Strategy::Genetic
        } else {
            Strategy::StrategySearch
        };
        let mut config = Config::new()
            .with_strategy(strategy)
            .with_min_break(self.min_break);
        if let Some(max) = self.max_sheets {
            config = config.with_max_sheets(max);
        }
        config
    }

    /// GA configuration with this job's overrides applied.
    pub fn ga_config(&self) -> CuttingGaConfig {
        let mut ga = CuttingGaConfig::default();
        if let Some(population) = self.ga.population {
            ga = ga.with_population_size(population);
        }
        if let Some(generations) = self.ga.generations {
            ga = ga.with_generations(generations);
        }
        if let Some(sheets) = self.ga.max_simulated_sheets {
            ga = ga.with_max_simulated_sheets(sheets);
        }
        ga
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_job() {
        let job = Job::from_toml(
            r#"
            name = "kitchen"
            mode = "search"
            min_break = 50.0

            [sheet]
            width = 2750.0
            height = 1830.0

            [[pieces]]
            quantity = 4
            width = 720.0
            height = 560.0
            label = "side"

            [[pieces]]
            quantity = 2
            width = 300.0
            height = 200.0
            "#,
        )
        .unwrap();

        assert_eq!(job.name, "kitchen");
        assert_eq!(job.mode, JobMode::Search);
        assert_eq!(job.sheet.margin, 0.0);
        assert_eq!(job.piece_count(), 6);
        assert_eq!(job.pieces[0].label.as_deref(), Some("side"));
        assert_eq!(job.pieces[1].label, None);
        assert_eq!(job.config().min_break, 50.0);
        assert_eq!(job.config().strategy, Strategy::StrategySearch);
    }

    #[test]
    fn test_json_job_defaults() {
        let job = Job::from_json(
            r#"{
                "sheet": { "width": 1000.0, "height": 500.0, "margin": 5.0 },
                "genetic_sheets": true,
                "ga": { "generations": 3 },
                "pieces": [ { "quantity": 1, "width": 100.0, "height": 100.0 } ]
            }"#,
        )
        .unwrap();

        assert_eq!(job.name, "job");
        assert_eq!(job.mode, JobMode::Sheets);
        assert_eq!(job.sheet.usable_width(), 990.0);
        assert_eq!(job.config().strategy, Strategy::Genetic);
        assert_eq!(job.ga_config().ga.max_generations, 3);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = Job::from_json(
            r#"{ "sheet": { "width": 1.0, "height": 1.0 }, "mode": "fast", "pieces": [] }"#,
        );
        assert!(err.is_err());
    }
}
