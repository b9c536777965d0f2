use std::{
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use anyhow::{Result, anyhow, bail};
use hashbrown::HashMap;

use crate::{
    coordinator::{ConvertEvent, ConvertEvents},
    pdf::{PageTableConverter, PageTextReader},
};

/// Page text that classifies as the given subtitle, with all four table section headings.
pub fn report_page_text(subtitle: &str) -> String {
    [
        "Trading by Type of Investors",
        subtitle,
        "総計・自己合計・委託合計 Total, Proprietary & Brokerage",
        "委託内訳 Breakdown of Brokerage",
        "法人内訳 Breakdown of Institutions",
        "金融機関内訳 Breakdown of Financial Institutions",
    ]
    .join("\n")
}

/// Serves page text from memory, keyed by PDF file name.
#[derive(Default)]
pub struct FakeTextReader {
    documents: HashMap<String, Vec<String>>,
}

impl FakeTextReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(mut self, file_name: &str, pages: &[&str]) -> Self {
        self.documents.insert(
            file_name.to_string(),
            pages.iter().map(|page| page.to_string()).collect(),
        );
        self
    }
}

impl PageTextReader for FakeTextReader {
    fn page_texts(&self, pdf_path: &Path) -> Result<Vec<String>> {
        let file_name = pdf_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.documents
            .get(&file_name)
            .cloned()
            .ok_or_else(|| anyhow!("no such document {:?}", file_name))
    }
}

/// What a [FakeConverter] does for one page.
pub enum FakePage {
    /// Writes the tables after waiting for `delay`.
    Tables {
        tables: Vec<Vec<Vec<String>>>,
        delay: Duration,
    },
    Fail,
    Panic,
}

impl FakePage {
    pub fn tables(tables: Vec<Vec<Vec<String>>>) -> Self {
        FakePage::Tables {
            tables,
            delay: Duration::ZERO,
        }
    }
}

/// Writes Tabula JSON fragments from canned tables, keyed by PDF file name and page index.
#[derive(Default)]
pub struct FakeConverter {
    pages: HashMap<(String, u16), FakePage>,
    converted: Mutex<Vec<PathBuf>>,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, file_name: &str, page_index: u16, page: FakePage) -> Self {
        self.pages.insert((file_name.to_string(), page_index), page);
        self
    }

    /// Fragment paths written so far, in order of writing.
    pub fn converted(&self) -> Vec<PathBuf> {
        self.converted
            .lock()
            .map(|converted| converted.clone())
            .unwrap_or_default()
    }
}

impl PageTableConverter for FakeConverter {
    fn convert_page(&self, pdf_path: &Path, page_index: u16, artifact_path: &Path) -> Result<()> {
        let file_name = pdf_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.pages.get(&(file_name, page_index)) {
            None => bail!("page {} was not expected to be converted", page_index),
            Some(FakePage::Fail) => bail!("conversion of page {} failed", page_index),
            Some(FakePage::Panic) => panic!("converter crashed on page {}", page_index),
            Some(FakePage::Tables { tables, delay }) => {
                std::thread::sleep(*delay);
                let json: Vec<serde_json::Value> = tables
                    .iter()
                    .map(|rows| {
                        let data: Vec<Vec<serde_json::Value>> = rows
                            .iter()
                            .map(|row| {
                                row.iter()
                                    .map(|text| serde_json::json!({"top": 0.0, "text": text}))
                                    .collect()
                            })
                            .collect();
                        serde_json::json!({"extraction_method": "lattice", "data": data})
                    })
                    .collect();
                std::fs::write(artifact_path, serde_json::to_vec(&json)?)?;
                if let Ok(mut converted) = self.converted.lock() {
                    converted.push(artifact_path.to_owned());
                }
                Ok(())
            }
        }
    }
}

/// Records every event it receives.
#[derive(Default)]
pub struct RecordingEvents {
    pub events: Vec<ConvertEvent>,
}

impl ConvertEvents for RecordingEvents {
    fn on_event(&mut self, event: ConvertEvent) {
        self.events.push(event);
    }
}
