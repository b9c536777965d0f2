//! Run configuration, read from an optional YAML file.


use std::path::Path;

use anyhow::{Context, Result};
use chrono::Month;
use serde::Deserialize;

use crate::weekkey::{ReportLabel, parse_report_label};

pub const DEFAULT_MAX_WORKERS: usize = 6;

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("targeted mode requires the {0:?} setting")]
    MissingTargetField(&'static str),
    #[error("month must be a month name such as \"Dec\"")]
    InvalidMonth,
    #[error("week must be between 1 and 6, got {0}")]
    InvalidWeek(u32),
    #[error("max_workers must be at least 1")]
    NoWorkers,
}

/// Configuration for one run, prepared from the YAML form.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    pub selection: ReportSelection,
    /// Number of pages converted concurrently.
    pub max_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selection: ReportSelection::Full,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

/// Which of the input reports a run processes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportSelection {
    Full,
    /// Only the report published under the given label.
    Targeted(ReportLabel),
}

impl ReportSelection {
    /// Returns true if the report with the given file name is selected.
    pub fn includes(&self, file_name: &str) -> bool {
        match self {
            ReportSelection::Full => true,
            ReportSelection::Targeted(target) => parse_report_label(file_name) == Some(*target),
        }
    }
}

/// Loads the configuration from `path`, or returns the default configuration if no path is
/// given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("opening configuration file {:?}", path))?;
    parse_config(&yaml).with_context(|| format!("parsing configuration file {:?}", path))
}

/// Parses and prepares configuration YAML. An empty document gives the default configuration.
pub fn parse_config(yaml: &str) -> Result<Config> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: YamlConfig = serde_yaml_ng::from_str(yaml)?;
    Ok(config.prepare()?)
}

#[derive(Deserialize, Debug)]
struct YamlConfig {
    #[serde(default)]
    mode: YamlMode,
    year: Option<i32>,
    month: Option<String>,
    week: Option<u32>,
    #[serde(default = "default_max_workers")]
    max_workers: usize,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "snake_case")]
enum YamlMode {
    #[default]
    Full,
    Targeted,
}

fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}

impl YamlConfig {
    /// Creates a `Config` from self.
    fn prepare(self) -> Result<Config, ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }

        let selection = match self.mode {
            YamlMode::Full => ReportSelection::Full,
            YamlMode::Targeted => {
                let year = self.year.ok_or(ConfigError::MissingTargetField("year"))?;
                let month = self
                    .month
                    .ok_or(ConfigError::MissingTargetField("month"))?
                    .trim()
                    .parse::<Month>()
                    .map_err(|_| ConfigError::InvalidMonth)?;
                let week = self.week.ok_or(ConfigError::MissingTargetField("week"))?;
                if !(1..=6).contains(&week) {
                    return Err(ConfigError::InvalidWeek(week));
                }
                ReportSelection::Targeted(ReportLabel { year, month, week })
            }
        };

        Ok(Config {
            selection,
            max_workers: self.max_workers,
        })
    }
}
