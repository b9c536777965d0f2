use std::{path::Path, sync::Mutex};

use anyhow::{Context, Result, anyhow};

use super::{PageTableConverter, TabulaExtractionMethod};

/// Converts pages with Tabula running in an in-process JVM.
///
/// Conversions are serialised through the VM lock, so the worker pool only overlaps the
/// surrounding file IO.
pub struct TabulaJniConverter {
    vm: Mutex<tabula::TabulaVM>,
    method: TabulaExtractionMethod,
}

impl TabulaJniConverter {
    /// Starts the JVM with Tabula on the given classpath (`libpath`).
    pub fn new(libpath: &str, method: TabulaExtractionMethod) -> Result<Self> {
        let vm = tabula::TabulaVM::new(libpath, false).context("starting the Tabula JVM")?;
        Ok(Self {
            vm: Mutex::new(vm),
            method,
        })
    }
}

impl PageTableConverter for TabulaJniConverter {
    fn convert_page(&self, pdf_path: &Path, page_index: u16, artifact_path: &Path) -> Result<()> {
        let vm = self
            .vm
            .lock()
            .map_err(|_| anyhow!("Tabula JVM lock poisoned"))?;
        let env = vm.attach().context("attaching to TabulaVM")?;

        let pages = [i32::from(page_index) + 1];
        let tabula = env
            .configure_tabula(
                None,
                Some(&pages),
                tabula::OutputFormat::Json,
                false,
                self.method.to_tabula_extraction_method(),
                false,
                None,
            )
            .context("configuring Tabula to extract tables")?;

        tabula
            .parse_document_into(pdf_path, artifact_path)
            .with_context(|| format!("extracting tables from page {} of {:?}", pages[0], pdf_path))
    }
}
