use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::table::Table;

/// A sequence of extracted tables from a PDF page, as written by Tabula in JSON format.
#[derive(Deserialize, Debug)]
#[serde(transparent)]
pub struct JsonTableSet(pub Vec<JsonTable>);

/// A single extracted table. Only the cell text is used; positional fields are ignored.
#[derive(Deserialize, Debug)]
pub struct JsonTable {
    #[serde(default)]
    pub data: Vec<JsonRow>,
}

#[derive(Deserialize, Debug)]
pub struct JsonRow(pub Vec<JsonCell>);

#[derive(Deserialize, Debug)]
pub struct JsonCell {
    #[serde(default)]
    pub text: String,
}

impl JsonTableSet {
    pub fn into_tables(self) -> Vec<Table> {
        self.0.into_iter().map(Into::into).collect()
    }
}

/// Reads the tables in a Tabula JSON artifact.
pub fn read_tables(artifact_path: &Path) -> Result<Vec<Table>> {
    let file = std::fs::File::open(artifact_path)
        .with_context(|| format!("opening converted page {:?}", artifact_path))?;
    let table_set: JsonTableSet = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parsing converted page {:?}", artifact_path))?;
    Ok(table_set.into_tables())
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use testutils::WrapError;

    use super::read_tables;
    use crate::table::Row;

    #[gtest]
    fn test_read_tables() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("page.json");
        std::fs::write(
            &path,
            r#"[
                {
                    "extraction_method": "lattice",
                    "page_number": 3,
                    "top": 1.0, "left": 2.0, "width": 3.0, "height": 4.0,
                    "right": 5.0, "bottom": 6.0,
                    "data": [
                        [{"top": 0, "left": 0, "width": 1, "height": 1, "text": " 自己取引計 "},
                         {"top": 0, "left": 0, "width": 1, "height": 1, "text": "売り \n買い"}]
                    ]
                },
                {"data": []}
            ]"#,
        )?;

        let tables = read_tables(&path).wrap_error()?;

        expect_eq!(tables.len(), 2);
        expect_that!(
            &tables[0].0,
            elements_are![eq(&Row::from(["自己取引計", "売り 買い"]))]
        );
        expect_that!(&tables[1].0, is_empty());
        Ok(())
    }
}
