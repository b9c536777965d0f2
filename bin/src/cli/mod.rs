use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use simplelog::LevelFilter;

mod configargs;
mod consolidate;
mod convert;
mod converterargs;
mod progress;
mod run;

/// Extracts the weekly "Trading by Type of Investors" statistics for JGB and TONA futures from
/// report PDFs, and consolidates them into one table of weekly series.
#[derive(Parser, Debug)]
#[command(name = "jgbfdata")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Logging level.
    #[arg(long, default_value = "Warn")]
    log_level: LevelFilter,
}

#[derive(Subcommand, Debug)]
enum Command {
    Convert(convert::Command),
    Consolidate(consolidate::Command),
    Run(run::Command),
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default())
        .with_context(|| "configuring logging")?;

    use Command::*;
    match &args.command {
        Convert(cmd) => convert::run(cmd),
        Consolidate(cmd) => consolidate::run(cmd),
        Run(cmd) => run::run(cmd),
    }
}
