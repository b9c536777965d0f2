//! Entry points for the stages of a run: converting reports into combined documents, and
//! consolidating combined documents into the matrix.


use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use hashbrown::HashSet;

use crate::{
    config::Config,
    consolidate::{ConsolidatedMatrix, Consolidator},
    coordinator::{
        ArtifactLayout, CombinedDocument, ConvertEvents, classify_document, convert_documents,
        extract_relevant_tables, read_combined_document,
    },
    pdf::{PageTableConverter, PageTextReader},
    rowparse::{ExtractedDatum, parse_table},
    weekkey::parse_week_key,
};

/// How deep below the input directory reports are searched for.
pub const MAX_SEARCH_DEPTH: usize = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    #[error("no input reports were found")]
    NoInput,
    #[error("no pages of the input reports cover any of the instruments")]
    NoRelevantPages,
}

/// Finds the PDF files under `root`, in sorted order.
pub fn find_pdf_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .max_depth(MAX_SEARCH_DEPTH)
        .follow_links(false)
    {
        let entry = entry.with_context(|| format!("searching for reports in {:?}", root))?;
        if entry.file_type().is_file() && has_extension(entry.path(), "pdf") {
            pdfs.push(entry.into_path());
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

/// Converts the reports in `pdfs` that `config` selects into combined documents, written under
/// `layout`.
pub fn convert_reports(
    config: &Config,
    pdfs: &[PathBuf],
    text_reader: &dyn PageTextReader,
    converter: &dyn PageTableConverter,
    layout: &ArtifactLayout,
    events: &mut dyn ConvertEvents,
) -> Result<Vec<CombinedDocument>> {
    let selected: Vec<&PathBuf> = pdfs
        .iter()
        .filter(|pdf| {
            let file_name = pdf
                .file_name()
                .map(|name| name.to_string_lossy())
                .unwrap_or_default();
            let included = config.selection.includes(&file_name);
            if !included {
                log::info!("{:?} is not selected by the configuration.", pdf);
            }
            included
        })
        .collect();
    if selected.is_empty() {
        return Err(anyhow!(WorkflowError::NoInput));
    }
    log::info!("Found {} reports to process.", selected.len());

    let mut documents = Vec::with_capacity(selected.len());
    for pdf in selected {
        let document = match classify_document(text_reader, pdf) {
            Ok(document) => document,
            Err(err) => {
                log::error!("Could not scan {:?}: {:#}", pdf, err);
                continue;
            }
        };
        if document.pages.is_empty() {
            log::warn!(
                "No relevant pages found in {}. Skipping.",
                document.source_name
            );
            continue;
        }
        documents.push(document);
    }
    if documents.is_empty() {
        return Err(anyhow!(WorkflowError::NoRelevantPages));
    }

    convert_documents(&documents, converter, layout, config.max_workers, events)
}

/// Reads the combined documents previously written under each of `work_dirs`.
///
/// Artifacts that cannot be read are logged and skipped.
pub fn load_combined_documents(work_dirs: &[PathBuf]) -> Result<Vec<CombinedDocument>> {
    let mut documents = Vec::new();
    for work_dir in work_dirs {
        let combined_dir = ArtifactLayout::new(work_dir).combined_dir();
        if !combined_dir.is_dir() {
            log::warn!("No converted reports in {:?}.", work_dir);
            continue;
        }

        let mut paths = Vec::new();
        for entry in walkdir::WalkDir::new(&combined_dir).max_depth(1) {
            let entry = entry.with_context(|| format!("listing {:?}", combined_dir))?;
            if entry.file_type().is_file() && has_extension(entry.path(), "json") {
                paths.push(entry.into_path());
            }
        }
        paths.sort();

        for path in paths {
            match read_combined_document(&path) {
                Ok(document) => documents.push(document),
                Err(err) => log::error!("Skipping unreadable combined document: {:#}", err),
            }
        }
    }

    if documents.is_empty() {
        return Err(anyhow!(WorkflowError::NoInput));
    }
    Ok(documents)
}

/// Extracts the data from the classified tables of one document.
///
/// The week is taken from the document's source name; a document without a recognisable date
/// yields nothing. Data repeated within the document is only returned once.
pub fn extract_document_data(document: &CombinedDocument) -> Vec<ExtractedDatum> {
    let Some(week) = parse_week_key(&document.source_name) else {
        log::warn!(
            "Could not determine the week of {}. Skipping it.",
            document.source_name
        );
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut data = Vec::new();
    for table in extract_relevant_tables(document) {
        let Some(table_type) = table.label.table_type() else {
            log::debug!(
                "Table {} ({}) of {} has no type.",
                table.index,
                table.label,
                document.source_name
            );
            continue;
        };
        for datum in parse_table(table.rows, table.instrument, table_type, week) {
            if seen.insert(datum.clone()) {
                data.push(datum);
            }
        }
    }
    log::info!(
        "Extracted {} values for week {} from {}.",
        data.len(),
        week,
        document.source_name
    );
    data
}

/// Consolidates the data of all `documents` into the matrix.
pub fn consolidate_documents(documents: &[CombinedDocument]) -> Result<ConsolidatedMatrix> {
    let mut consolidator = Consolidator::new();
    for document in documents {
        for datum in extract_document_data(document) {
            consolidator.add(datum);
        }
    }
    Ok(consolidator.build()?)
}
