//! Boundaries with the external PDF capabilities: page text extraction, and conversion of a
//! single page into tables.

pub mod pdfium;
pub mod tabulacli;
#[cfg(feature = "tabula-jni")]
pub mod tabulajni;
pub mod tabulajson;

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Reads the plain text of every page of a PDF.
pub trait PageTextReader {
    /// Returns one string per page, in page order.
    fn page_texts(&self, pdf_path: &Path) -> Result<Vec<String>>;
}

/// Converts one page of a PDF into a tabula JSON artifact.
///
/// Implementations are called concurrently from worker threads, each call writing to a distinct
/// `artifact_path`.
pub trait PageTableConverter: Sync {
    /// Converts the page at the 0-based `page_index`, writing the resulting table set to
    /// `artifact_path`.
    fn convert_page(&self, pdf_path: &Path, page_index: u16, artifact_path: &Path) -> Result<()>;
}

/// Extraction algorithm for Tabula to use.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TabulaExtractionMethod {
    Guess,
    #[default]
    Lattice,
    Stream,
}

impl TabulaExtractionMethod {
    /// Command line flag selecting this method in the Tabula CLI.
    pub fn cli_flag(self) -> &'static str {
        match self {
            TabulaExtractionMethod::Guess => "--guess",
            TabulaExtractionMethod::Lattice => "--lattice",
            TabulaExtractionMethod::Stream => "--stream",
        }
    }

    #[cfg(feature = "tabula-jni")]
    pub fn to_tabula_extraction_method(self) -> tabula::ExtractionMethod {
        match self {
            TabulaExtractionMethod::Stream => tabula::ExtractionMethod::Basic,
            TabulaExtractionMethod::Guess => tabula::ExtractionMethod::Decide,
            TabulaExtractionMethod::Lattice => tabula::ExtractionMethod::Spreadsheet,
        }
    }
}
