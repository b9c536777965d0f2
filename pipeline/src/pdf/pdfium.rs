use std::path::Path;

use anyhow::{Context, Result};
use pdfium_render::prelude::Pdfium;

use super::PageTextReader;

/// Reads page text with the Pdfium library, bound at runtime.
///
/// Pdfium is not thread safe, so this is used from a single thread.
pub struct PdfiumTextReader {
    pdfium: Pdfium,
}

impl PdfiumTextReader {
    /// Binds to the Pdfium library in `lib_dir` if given, falling back to the system library.
    pub fn new(lib_dir: Option<&Path>) -> Result<Self> {
        let bindings = match lib_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                .or_else(|_| Pdfium::bind_to_system_library()),
            None => Pdfium::bind_to_system_library(),
        }
        .context("binding to the Pdfium library")?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageTextReader for PdfiumTextReader {
    fn page_texts(&self, pdf_path: &Path) -> Result<Vec<String>> {
        let document = self
            .pdfium
            .load_pdf_from_file(pdf_path, None)
            .with_context(|| format!("opening PDF {:?}", pdf_path))?;

        let mut texts = Vec::new();
        for (page_index, page) in document.pages().iter().enumerate() {
            let text = page
                .text()
                .with_context(|| format!("reading text of page {} in {:?}", page_index, pdf_path))?;
            texts.push(text.all());
        }
        Ok(texts)
    }
}
