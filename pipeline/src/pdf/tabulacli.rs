use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail};

use super::{PageTableConverter, TabulaExtractionMethod};

/// Converts pages by running the Tabula command line jar in a Java subprocess, once per page.
#[derive(Debug)]
pub struct TabulaCliConverter {
    pub java: PathBuf,
    pub jar: PathBuf,
    pub method: TabulaExtractionMethod,
}

impl TabulaCliConverter {
    fn command(&self, pdf_path: &Path, page_index: u16, artifact_path: &Path) -> Command {
        let mut command = Command::new(&self.java);
        command
            .arg("-jar")
            .arg(&self.jar)
            .arg("--pages")
            .arg((u32::from(page_index) + 1).to_string())
            .arg("--format")
            .arg("JSON")
            .arg(self.method.cli_flag())
            .arg("--silent")
            .arg("--outfile")
            .arg(artifact_path)
            .arg(pdf_path);
        command
    }
}

impl PageTableConverter for TabulaCliConverter {
    fn convert_page(&self, pdf_path: &Path, page_index: u16, artifact_path: &Path) -> Result<()> {
        let output = self
            .command(pdf_path, page_index, artifact_path)
            .output()
            .with_context(|| format!("running {:?}", self.java))?;

        if !output.status.success() {
            bail!(
                "Tabula exited with {} converting page {} of {:?}: {}",
                output.status,
                u32::from(page_index) + 1,
                pdf_path,
                String::from_utf8_lossy(&output.stderr).trim(),
            );
        }
        if !artifact_path.exists() {
            bail!("Tabula did not write {:?}", artifact_path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[gtest]
    fn test_command_arguments() {
        let converter = TabulaCliConverter {
            java: "java".into(),
            jar: "/opt/tabula.jar".into(),
            method: TabulaExtractionMethod::Stream,
        };

        let command = converter.command(Path::new("report.pdf"), 2, Path::new("out/report_page_2.json"));

        let args: Vec<String> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        expect_that!(
            args,
            elements_are![
                eq("-jar"),
                eq("/opt/tabula.jar"),
                eq("--pages"),
                eq("3"),
                eq("--format"),
                eq("JSON"),
                eq("--stream"),
                eq("--silent"),
                eq("--outfile"),
                eq("out/report_page_2.json"),
                eq("report.pdf"),
            ]
        );
    }
}
