/// Configuration module for timeline2csv.
///
/// Holds the input/output paths for one conversion run. Values come from an
/// optional JSON file and are then overridden by command-line arguments.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// ── Default value functions ──────────────────────────────────────────

fn default_input_path() -> PathBuf {
    PathBuf::from("Timeline.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("Timeline.csv")
}

// ── Config struct ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Timeline export to read.
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// CSV file to write. Parent directories are created on demand.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// With no path, returns the defaults. An explicit path must exist and
    /// hold valid JSON; there is no fallback to default paths.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let Some(path) = config_path else {
            return Ok(Self::default());
        };

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let cfg: Config = serde_json::from_str(&data)
            .with_context(|| format!("invalid JSON in config: {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Replace configured paths with any given on the command line.
    #[must_use]
    pub fn with_overrides(mut self, input: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        if let Some(input) = input {
            self.input_path = input;
        }
        if let Some(output) = output {
            self.output_path = output;
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.input_path.as_os_str().is_empty(),
            "input path must not be empty"
        );
        anyhow::ensure!(
            !self.output_path.as_os_str().is_empty(),
            "output path must not be empty"
        );
        anyhow::ensure!(
            self.input_path != self.output_path,
            "output path {} would overwrite the input",
            self.output_path.display()
        );
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
