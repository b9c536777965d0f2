use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use pipeline::{
    coordinator::{ArtifactLayout, CombinedDocument},
    workflow::{convert_reports, find_pdf_files},
};

use super::{configargs::ConfigArgs, converterargs::ConverterArgs, progress::EventDisplayer};

/// Converts the relevant pages of report PDFs into combined documents in a work directory.
#[derive(Args, Debug)]
pub struct Command {
    /// Directory to search for report PDFs.
    pub pdf_dir: PathBuf,

    /// Directory to write converted reports into.
    pub work_dir: PathBuf,

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
    let documents = convert(
        &cmd.pdf_dir,
        &cmd.work_dir,
        &cmd.config,
        &cmd.converter,
        cmd.no_progress,
    )?;
    eprintln!("Converted {} reports.", documents.len());
    Ok(())
}

/// Converts the reports under `pdf_dir`, writing artifacts under `work_dir`.
pub fn convert(
    pdf_dir: &Path,
    work_dir: &Path,
    config_args: &ConfigArgs,
    converter_args: &ConverterArgs,
    no_progress: bool,
) -> Result<Vec<CombinedDocument>> {
    let config = config_args.load_config()?;
    let pdfs = find_pdf_files(pdf_dir)?;
    log::info!("Found {} PDF files under {:?}.", pdfs.len(), pdf_dir);
    let text_reader = converter_args.text_reader()?;
    let converter = converter_args.converter()?;
    let layout = ArtifactLayout::new(work_dir);
    let mut events = EventDisplayer::new(!no_progress);

    convert_reports(
        &config,
        &pdfs,
        &text_reader,
        converter.as_ref(),
        &layout,
        &mut events,
    )
    .with_context(|| format!("converting reports in {:?}", pdf_dir))
}
