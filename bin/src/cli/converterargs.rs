use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, ValueEnum};
use pipeline::pdf::{
    PageTableConverter, TabulaExtractionMethod, pdfium::PdfiumTextReader,
    tabulacli::TabulaCliConverter,
};

/// CLI arguments relating to reading and converting report PDFs.
#[derive(Args, Clone, Debug)]
pub struct ConverterArgs {
    /// Java executable used to run Tabula.
    #[arg(long, default_value = "java")]
    java: PathBuf,

    /// Path to the Tabula jar. With --in-process, this is the classpath of the in-process JVM.
    #[arg(long)]
    tabula_jar: Option<PathBuf>,

    /// Tabula's table extraction method.
    #[arg(long, value_enum, default_value_t = MethodArg::Lattice)]
    method: MethodArg,

    /// Directory containing the Pdfium library. The system library is used if it cannot be
    /// loaded from here.
    #[arg(long)]
    pdfium_lib_dir: Option<PathBuf>,

    /// Run Tabula in-process through JNI rather than as a subprocess per page. Requires a build
    /// with the `tabula-jni` feature.
    #[arg(long, default_value = "false")]
    in_process: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MethodArg {
    Guess,
    Lattice,
    Stream,
}

impl From<MethodArg> for TabulaExtractionMethod {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::Guess => TabulaExtractionMethod::Guess,
            MethodArg::Lattice => TabulaExtractionMethod::Lattice,
            MethodArg::Stream => TabulaExtractionMethod::Stream,
        }
    }
}

impl ConverterArgs {
    pub fn text_reader(&self) -> Result<PdfiumTextReader> {
        PdfiumTextReader::new(self.pdfium_lib_dir.as_deref())
    }

    pub fn converter(&self) -> Result<Box<dyn PageTableConverter>> {
        let jar = self
            .tabula_jar
            .clone()
            .ok_or_else(|| anyhow!("--tabula-jar must be specified to convert reports"))?;

        #[cfg(feature = "tabula-jni")]
        if self.in_process {
            let converter = pipeline::pdf::tabulajni::TabulaJniConverter::new(
                &jar.to_string_lossy(),
                self.method.into(),
            )?;
            return Ok(Box::new(converter));
        }
        #[cfg(not(feature = "tabula-jni"))]
        if self.in_process {
            anyhow::bail!("--in-process requires a build with the tabula-jni feature");
        }

        Ok(Box::new(TabulaCliConverter {
            java: self.java.clone(),
            jar,
            method: self.method.into(),
        }))
    }
}
