use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use pipeline::config::{Config, load_config};

/// CLI arguments relating to [Config].
#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Path to a YAML run configuration. Without one, every report is processed with the default
    /// settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of pages to convert concurrently. Overrides `max_workers` in the configuration.
    #[arg(long)]
    pub workers: Option<usize>,
}

impl ConfigArgs {
    /// Loads the configuration, applying overrides from the command line.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(workers) = self.workers {
            if workers == 0 {
                bail!("--workers must be at least 1");
            }
            config.max_workers = workers;
        }
        Ok(config)
    }
}
