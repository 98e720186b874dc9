//! Configuration loading from sweep.toml
//!
//! Run settings can be placed in a `sweep.toml` file in the project root. The
//! file is discovered by walking up from the current directory. Command-line
//! flags take precedence over the file, and the file over built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sweepbench_core::{ConfigError, RunBudget};

/// Name of the configuration file looked up during discovery
pub const CONFIG_FILE: &str = "sweep.toml";

/// SweepBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SweepConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Metrics exporter configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunnerConfig {
    /// Wall-clock seconds each timed loop keeps invoking its case
    #[serde(default = "default_case_run_time")]
    pub case_run_time: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            case_run_time: default_case_run_time(),
        }
    }
}

fn default_case_run_time() -> u64 {
    1
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Draw a progress bar instead of plain lines
    #[serde(default = "default_progress")]
    pub progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            progress: default_progress(),
        }
    }
}

fn default_progress() -> bool {
    true
}

/// Metrics exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MetricsConfig {
    /// Serve counters at `http://0.0.0.0:{port}/metrics` during a run
    #[serde(default)]
    pub port: Option<u16>,
}

impl SweepConfig {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Discover and load configuration by walking up from the current directory
    pub fn discover() -> anyhow::Result<Option<Self>> {
        let dir = std::env::current_dir()?;
        Self::discover_from(&dir)
    }

    /// Discover and load configuration by walking up from `start`
    pub fn discover_from(start: &Path) -> anyhow::Result<Option<Self>> {
        match Self::find(start) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    fn find(start: &Path) -> Option<PathBuf> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Run budget, preferring a command-line override over the file value
    pub fn budget(&self, override_secs: Option<u64>) -> Result<RunBudget, ConfigError> {
        RunBudget::from_secs(override_secs.unwrap_or(self.runner.case_run_time))
    }

    /// Whether to draw a progress bar; `--no-progress` always wins
    pub fn progress(&self, no_progress: bool) -> bool {
        self.output.progress && !no_progress
    }

    /// Exporter port, preferring `--metrics-port` over the file value
    pub fn metrics_port(&self, override_port: Option<u16>) -> Option<u16> {
        override_port.or(self.metrics.port)
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# SweepBench Configuration

[runner]
# Seconds each case keeps running per combination and argument tuple
case_run_time = 1

[output]
# Progress bar on stderr; set to false for plain lines only
progress = true

[metrics]
# Serve counters for scraping during a run
# port = 9101
"#
        .to_string()
    }
}
