//! Conversion of the relevant pages of reports into combined documents.
//!
//! Page conversion is the only parallel stage. Each classified page becomes a [PageJob], run on a
//! bounded pool of worker threads. Every job yields a [PageOutcome], and all outcomes are
//! collected before any document is combined, in page order.

#[cfg(test)]
mod tests;

use std::{
    any::Any,
    panic::AssertUnwindSafe,
    path::{Path, PathBuf},
    sync::{Mutex, mpsc},
};

use anyhow::{Context, Result, anyhow};
use atomic_write_file::AtomicWriteFile;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::{
    classify::{
        PageSubtitle, TableLabel, TableSections, assign_table_labels, classify_page_text,
        page_table_sections,
    },
    mpscutil,
    pdf::{PageTableConverter, PageTextReader, tabulajson::read_tables},
    series::Instrument,
    table::Table,
};

/// Locations of the artifacts written under a work directory.
#[derive(Clone, Debug)]
pub struct ArtifactLayout {
    work_dir: PathBuf,
}

impl ArtifactLayout {
    pub fn new<P: Into<PathBuf>>(work_dir: P) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Directory of per-page fragments, which only exist while a conversion is running.
    pub fn chunks_dir(&self) -> PathBuf {
        self.work_dir.join("temp_chunks")
    }

    /// Directory of combined documents.
    pub fn combined_dir(&self) -> PathBuf {
        self.work_dir.join("converted")
    }

    pub fn fragment_path(&self, stem: &str, page_index: u16) -> PathBuf {
        self.chunks_dir().join(format!("{}_page_{}.json", stem, page_index))
    }

    pub fn combined_path(&self, stem: &str) -> PathBuf {
        self.combined_dir().join(format!("{}.json", stem))
    }

    fn create_dirs(&self) -> Result<()> {
        for dir in [self.chunks_dir(), self.combined_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating directory {:?}", dir))?;
        }
        Ok(())
    }
}

/// A report PDF, and those of its pages that report on one of the instruments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassifiedDocument {
    pub pdf_path: PathBuf,
    /// File name of the PDF.
    pub source_name: String,
    /// File name of the PDF without its extension. Artifacts are named after this, made unique
    /// within a conversion.
    pub stem: String,
    pub pages: Vec<ClassifiedPage>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassifiedPage {
    /// 0-based index of the page in the PDF.
    pub page_index: u16,
    pub subtitle: PageSubtitle,
    pub sections: TableSections,
}

/// Reads the text of every page of the PDF at `pdf_path`, and keeps the pages that classify as
/// reporting on an instrument.
pub fn classify_document(
    text_reader: &dyn PageTextReader,
    pdf_path: &Path,
) -> Result<ClassifiedDocument> {
    let source_name = pdf_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("PDF path {:?} has no file name", pdf_path))?;
    let stem = pdf_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_name.clone());

    let texts = text_reader
        .page_texts(pdf_path)
        .with_context(|| format!("reading text of {:?}", pdf_path))?;

    let mut pages = Vec::new();
    for (index, text) in texts.iter().enumerate() {
        let Some(subtitle) = classify_page_text(text) else {
            continue;
        };
        let page_index = u16::try_from(index)
            .with_context(|| format!("page {} of {:?} is out of range", index + 1, pdf_path))?;
        log::info!(
            "{} page {}: {:?} ({}).",
            source_name,
            index + 1,
            subtitle.subtitle,
            subtitle.instrument,
        );
        pages.push(ClassifiedPage {
            page_index,
            subtitle,
            sections: page_table_sections(text),
        });
    }

    Ok(ClassifiedDocument {
        pdf_path: pdf_path.to_owned(),
        source_name,
        stem,
        pages,
    })
}

/// Conversion of a single page.
#[derive(Clone, Debug)]
pub struct PageJob {
    /// Index of the job's document in the documents being converted.
    pub document: usize,
    pub source_name: String,
    pub pdf_path: PathBuf,
    pub page: ClassifiedPage,
    pub fragment_path: PathBuf,
}

#[derive(Debug)]
pub enum PageOutcome {
    Success { job: PageJob, tables: Vec<Table> },
    Failure { job: PageJob, reason: anyhow::Error },
}

impl PageOutcome {
    pub fn job(&self) -> &PageJob {
        match self {
            PageOutcome::Success { job, .. } => job,
            PageOutcome::Failure { job, .. } => job,
        }
    }
}

/// Progress of a conversion, reported to [ConvertEvents].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConvertEvent {
    Started {
        total_pages: usize,
    },
    PageFinished {
        source_name: String,
        page_index: u16,
        succeeded: bool,
        completed: usize,
        total: usize,
    },
    DocumentCombined {
        source_name: String,
        path: PathBuf,
        pages: usize,
    },
    /// None of the document's pages converted.
    DocumentSkipped {
        source_name: String,
    },
}

/// Receives progress of a conversion. Events are delivered on the thread that started the
/// conversion.
pub trait ConvertEvents {
    fn on_event(&mut self, event: ConvertEvent);
}

/// Discards all events.
pub struct NoEvents;

impl ConvertEvents for NoEvents {
    fn on_event(&mut self, _event: ConvertEvent) {}
}

/// Runs `jobs` on up to `max_workers` threads, returning when all of them have completed.
///
/// Outcomes are returned in order of completion.
pub fn run_page_jobs(
    jobs: Vec<PageJob>,
    converter: &dyn PageTableConverter,
    max_workers: usize,
    events: &mut dyn ConvertEvents,
) -> Vec<PageOutcome> {
    let total = jobs.len();
    let worker_count = max_workers.max(1).min(total);

    let (job_send, job_recv) = mpsc::channel();
    for job in jobs {
        mpscutil::send_or_log_warning(&job_send, "page job", job);
    }
    drop(job_send);
    let job_recv = Mutex::new(job_recv);

    let (outcome_send, outcome_recv) = mpsc::channel();
    let mut outcomes = Vec::with_capacity(total);

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let job_recv = &job_recv;
            let outcome_send = outcome_send.clone();
            scope.spawn(move || run_worker(job_recv, converter, outcome_send));
        }
        drop(outcome_send);

        for outcome in outcome_recv {
            let (succeeded, job) = match &outcome {
                PageOutcome::Success { job, .. } => (true, job),
                PageOutcome::Failure { job, reason } => {
                    log::error!(
                        "Failed to convert page {} of {:?}: {:#}",
                        u32::from(job.page.page_index) + 1,
                        job.pdf_path,
                        reason,
                    );
                    (false, job)
                }
            };
            events.on_event(ConvertEvent::PageFinished {
                source_name: job.source_name.clone(),
                page_index: job.page.page_index,
                succeeded,
                completed: outcomes.len() + 1,
                total,
            });
            outcomes.push(outcome);
        }
    });

    outcomes
}

fn run_worker(
    jobs: &Mutex<mpsc::Receiver<PageJob>>,
    converter: &dyn PageTableConverter,
    outcomes: mpsc::Sender<PageOutcome>,
) {
    loop {
        let job = {
            let Ok(receiver) = jobs.lock() else {
                log::error!("Page job queue is poisoned; stopping worker.");
                return;
            };
            match receiver.recv() {
                Ok(job) => job,
                // Queue drained.
                Err(_) => return,
            }
        };
        let outcome = convert_job(converter, job);
        mpscutil::send_or_log_warning(&outcomes, "page conversion outcome", outcome);
    }
}

fn convert_job(converter: &dyn PageTableConverter, job: PageJob) -> PageOutcome {
    let result = std::panic::catch_unwind(AssertUnwindSafe(|| -> Result<Vec<Table>> {
        converter.convert_page(&job.pdf_path, job.page.page_index, &job.fragment_path)?;
        read_tables(&job.fragment_path)
    }));

    match result {
        Ok(Ok(tables)) => PageOutcome::Success { job, tables },
        Ok(Err(reason)) => PageOutcome::Failure { job, reason },
        Err(payload) => PageOutcome::Failure {
            job,
            reason: anyhow!("page conversion panicked: {}", panic_message(&payload)),
        },
    }
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// All converted pages of one report, in page order. This is the artifact that consolidation
/// reads.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CombinedDocument {
    pub source_name: String,
    pub pages: Vec<CombinedPage>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CombinedPage {
    pub page_index: u16,
    pub subtitle: String,
    pub instrument: Instrument,
    pub tables: Vec<LabelledTable>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LabelledTable {
    pub label: TableLabel,
    pub rows: Table,
}

/// Combines the converted pages of a document, sorting them into page order and labelling their
/// tables.
pub fn combine_pages(
    source_name: &str,
    mut pages: Vec<(ClassifiedPage, Vec<Table>)>,
) -> CombinedDocument {
    pages.sort_by_key(|(page, _)| page.page_index);

    let pages = pages
        .into_iter()
        .map(|(page, tables)| {
            let labels = assign_table_labels(page.sections, tables.len());
            CombinedPage {
                page_index: page.page_index,
                subtitle: page.subtitle.subtitle,
                instrument: page.subtitle.instrument,
                tables: labels
                    .into_iter()
                    .zip(tables)
                    .map(|(label, rows)| LabelledTable { label, rows })
                    .collect(),
            }
        })
        .collect();

    CombinedDocument {
        source_name: source_name.to_string(),
        pages,
    }
}

/// A table of a combined document, with what is known about it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TableRef<'a> {
    /// Index of the table across the whole document, counting in page order.
    pub index: usize,
    pub instrument: Instrument,
    pub subtitle: &'a str,
    pub label: TableLabel,
    pub rows: &'a Table,
}

/// Lists every table of `document` with the instrument and subtitle of its page.
pub fn extract_relevant_tables(document: &CombinedDocument) -> Vec<TableRef<'_>> {
    document
        .pages
        .iter()
        .flat_map(|page| page.tables.iter().map(move |table| (page, table)))
        .enumerate()
        .map(|(index, (page, table))| TableRef {
            index,
            instrument: page.instrument,
            subtitle: &page.subtitle,
            label: table.label,
            rows: &table.rows,
        })
        .collect()
}

pub fn write_combined_document(document: &CombinedDocument, path: &Path) -> Result<()> {
    let mut file =
        AtomicWriteFile::open(path).with_context(|| format!("opening {:?} for writing", path))?;
    serde_json::to_writer_pretty(&mut file, document)
        .with_context(|| format!("writing combined document {:?}", path))?;
    file.commit()
        .with_context(|| format!("committing {:?}", path))
}

pub fn read_combined_document(path: &Path) -> Result<CombinedDocument> {
    let file =
        std::fs::File::open(path).with_context(|| format!("opening combined document {:?}", path))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parsing combined document {:?}", path))
}

/// Converts the classified pages of `documents`, writing one combined document per report under
/// `layout`.
///
/// A page that fails to convert is left out of its document. A document none of whose pages
/// converted, or whose combined document cannot be written, is logged and left out of the
/// result.
pub fn convert_documents(
    documents: &[ClassifiedDocument],
    converter: &dyn PageTableConverter,
    layout: &ArtifactLayout,
    max_workers: usize,
    events: &mut dyn ConvertEvents,
) -> Result<Vec<CombinedDocument>> {
    layout.create_dirs()?;
    let stems = artifact_stems(documents);

    let jobs: Vec<PageJob> = documents
        .iter()
        .zip(&stems)
        .enumerate()
        .flat_map(|(document_index, (document, stem))| {
            document.pages.iter().map(move |page| PageJob {
                document: document_index,
                source_name: document.source_name.clone(),
                pdf_path: document.pdf_path.clone(),
                page: page.clone(),
                fragment_path: layout.fragment_path(stem, page.page_index),
            })
        })
        .collect();

    log::info!(
        "Converting {} pages of {} reports.",
        jobs.len(),
        documents.len()
    );
    events.on_event(ConvertEvent::Started {
        total_pages: jobs.len(),
    });
    let outcomes = run_page_jobs(jobs, converter, max_workers, events);

    let mut converted_pages: Vec<Vec<(ClassifiedPage, Vec<Table>)>> =
        vec![Vec::new(); documents.len()];
    for outcome in outcomes {
        remove_fragment(&outcome.job().fragment_path);
        if let PageOutcome::Success { job, tables } = outcome {
            if let Some(pages) = converted_pages.get_mut(job.document) {
                pages.push((job.page, tables));
            }
        }
    }
    if let Err(err) = std::fs::remove_dir(layout.chunks_dir()) {
        log::debug!("Leaving fragment directory in place: {}", err);
    }

    let mut combined = Vec::new();
    for ((document, stem), pages) in documents.iter().zip(&stems).zip(converted_pages) {
        if document.pages.is_empty() {
            continue;
        }
        if pages.is_empty() {
            log::error!(
                "No pages of {} were converted; skipping it.",
                document.source_name
            );
            events.on_event(ConvertEvent::DocumentSkipped {
                source_name: document.source_name.clone(),
            });
            continue;
        }

        let page_count = pages.len();
        let combined_document = combine_pages(&document.source_name, pages);
        let path = layout.combined_path(stem);
        if let Err(err) = write_combined_document(&combined_document, &path) {
            log::error!(
                "Could not save {}; skipping it: {:#}",
                document.source_name,
                err
            );
            events.on_event(ConvertEvent::DocumentSkipped {
                source_name: document.source_name.clone(),
            });
            continue;
        }
        log::info!(
            "Combined {} pages of {} into {:?}.",
            page_count,
            document.source_name,
            path
        );
        events.on_event(ConvertEvent::DocumentCombined {
            source_name: document.source_name.clone(),
            path,
            pages: page_count,
        });
        combined.push(combined_document);
    }

    Ok(combined)
}

/// Names the artifacts of each document after its stem. Reports from different directories
/// can share a stem, so repeats get a numeric suffix.
fn artifact_stems(documents: &[ClassifiedDocument]) -> Vec<String> {
    let mut used = HashSet::new();
    documents
        .iter()
        .map(|document| {
            let mut stem = document.stem.clone();
            let mut suffix = 1;
            while !used.insert(stem.clone()) {
                suffix += 1;
                stem = format!("{}_{}", document.stem, suffix);
            }
            if stem != document.stem {
                log::warn!(
                    "{:?} has the same name as another report; saving it as {}.",
                    document.pdf_path,
                    stem
                );
            }
            stem
        })
        .collect()
}

fn remove_fragment(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove page fragment {:?}: {}", path, err);
        }
    }
}
