use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;

use crate::{clock::Clock, consolidate::ConsolidatedMatrix};

/// Name of the consolidated output file written at the time given by `clock`.
pub fn output_file_name(clock: &dyn Clock) -> String {
    format!(
        "JGBF_DATA_Consolidated_{}.csv",
        clock.now().format("%Y%m%d_%H%M%S")
    )
}

/// Writes the matrix as CSV: a header row of series codes, a row of descriptions, then one row
/// per week.
///
/// The file at `path` is replaced only once the whole matrix has been written.
pub fn write_matrix_csv(matrix: &ConsolidatedMatrix, path: &Path) -> Result<()> {
    let file =
        AtomicWriteFile::open(path).with_context(|| format!("opening {:?} for writing", path))?;
    let mut output = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(file);

    output
        .write_record(
            std::iter::once("Date").chain(matrix.columns.iter().map(|column| column.code.as_str())),
        )
        .context("writing series code row")?;
    output
        .write_record(
            std::iter::once("Description")
                .chain(matrix.columns.iter().map(|column| column.description.as_str())),
        )
        .context("writing description row")?;

    for (week, cells) in &matrix.rows {
        let week = week.to_string();
        output
            .write_record(std::iter::once(week.as_str()).chain(cells.iter().map(String::as_str)))
            .with_context(|| format!("writing row for week {}", week))?;
    }

    let file = output
        .into_inner()
        .map_err(|err| err.into_error())
        .context("flushing CSV output")?;
    file.commit()
        .with_context(|| format!("committing {:?}", path))
}

/// Writes the matrix into `output_dir` under a timestamped name, returning the path written.
pub fn write_matrix_to_dir(
    matrix: &ConsolidatedMatrix,
    output_dir: &Path,
    clock: &dyn Clock,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {:?}", output_dir))?;
    let path = output_dir.join(output_file_name(clock));
    write_matrix_csv(matrix, &path)?;
    log::info!("Wrote {} weeks of data to {:?}.", matrix.rows.len(), path);
    Ok(path)
}
