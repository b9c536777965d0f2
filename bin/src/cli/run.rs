use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{configargs::ConfigArgs, consolidate, convert, converterargs::ConverterArgs};

/// Converts report PDFs and consolidates them in one go.
#[derive(Args, Debug)]
pub struct Command {
    /// Directory to search for report PDFs.
    pub pdf_dir: PathBuf,

    /// Directory to write converted reports into.
    pub work_dir: PathBuf,

    /// Directory to write the consolidated CSV file into.
    pub output_dir: PathBuf,

    /// Options relating to the run configuration.
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Options relating to reading and converting PDFs.
    #[command(flatten)]
    pub converter: ConverterArgs,

    /// Do not show a progress bar while converting.
    #[arg(long, default_value = "false")]
    pub no_progress: bool,
}

/// Runs the subcommand.
pub fn run(cmd: &Command) -> Result<()> {
    let documents = convert::convert(
        &cmd.pdf_dir,
        &cmd.work_dir,
        &cmd.config,
        &cmd.converter,
        cmd.no_progress,
    )?;
    consolidate::write_output(&documents, &cmd.output_dir)
}
