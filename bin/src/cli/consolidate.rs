use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use pipeline::{
    clock::RealClock,
    coordinator::CombinedDocument,
    output_csv::write_matrix_to_dir,
    workflow::{consolidate_documents, load_combined_documents},
};

/// Consolidates previously converted reports into a CSV table of weekly series.
#[derive(Args, Debug)]
pub struct Command {
    /// Directory to write the consolidated CSV file into.
    pub output_dir: PathBuf,

    /// Work directories holding converted reports.
    #[arg(required = true)]
    pub work_dirs: Vec<PathBuf>,
}

/// Runs the subcommand.
pub fn run(cmd: &Command) -> Result<()> {
    let documents = load_combined_documents(&cmd.work_dirs)?;
    write_output(&documents, &cmd.output_dir)
}

/// Consolidates `documents` and writes the result into `output_dir`.
pub fn write_output(documents: &[CombinedDocument], output_dir: &Path) -> Result<()> {
    let matrix = consolidate_documents(documents)?;
    let path = write_matrix_to_dir(&matrix, output_dir, &RealClock::new())?;

    if !matrix.unmapped_codes.is_empty() {
        eprintln!(
            "Warning: {} series have no column in the output and were left out.",
            matrix.unmapped_codes.len()
        );
    }
    eprintln!("Wrote {} weeks of data to {:?}.", matrix.rows.len(), path);
    Ok(())
}
