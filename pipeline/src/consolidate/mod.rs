//! Pivot of extracted data into the week by series matrix.


use std::collections::BTreeSet;

use hashbrown::{HashMap, HashSet};

use crate::{
    rowparse::ExtractedDatum,
    series::{SeriesCode, TemplateColumn, template_columns},
    weekkey::WeekKey,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConsolidateError {
    #[error("no data was extracted from any report")]
    NoData,
}

/// Dense week by series table. Empty cells are values that were not reported.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConsolidatedMatrix {
    pub columns: Vec<TemplateColumn>,
    /// One row per observed week in ascending order, with one cell per column.
    pub rows: Vec<(WeekKey, Vec<String>)>,
    /// Codes of data that have no column in the output, in sorted order.
    pub unmapped_codes: Vec<SeriesCode>,
}

/// Accumulates data from any number of reports, in any order.
#[derive(Debug, Default)]
pub struct Consolidator {
    /// Every distinct value seen for each code and week.
    values: HashMap<SeriesCode, HashMap<WeekKey, BTreeSet<String>>>,
    weeks: BTreeSet<WeekKey>,
}

impl Consolidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one datum. A repeated `(code, week)` with a different value is a conflict, which
    /// is warned about and resolved to the greatest value when the matrix is built.
    pub fn add(&mut self, datum: ExtractedDatum) {
        let ExtractedDatum { code, week, value } = datum;
        self.weeks.insert(week);

        let candidates = self
            .values
            .entry(code.clone())
            .or_default()
            .entry(week)
            .or_default();
        if !candidates.is_empty() && !candidates.contains(&value) {
            log::warn!(
                "Conflicting values for {} in week {}: {:?} and {:?}.",
                code,
                week,
                candidates,
                value,
            );
        }
        candidates.insert(value);
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Builds the matrix over the full template of columns.
    pub fn build(&self) -> Result<ConsolidatedMatrix, ConsolidateError> {
        if self.is_empty() {
            return Err(ConsolidateError::NoData);
        }

        let columns = template_columns();
        let unmapped_codes = {
            let template_codes: HashSet<&SeriesCode> =
                columns.iter().map(|column| &column.code).collect();
            let mut unmapped_codes: Vec<SeriesCode> = self
                .values
                .keys()
                .filter(|code| !template_codes.contains(code))
                .cloned()
                .collect();
            unmapped_codes.sort();
            unmapped_codes
        };
        for code in &unmapped_codes {
            log::warn!("Data for {} has no column in the output and is omitted.", code);
        }

        let rows = self
            .weeks
            .iter()
            .map(|week| {
                let cells = columns
                    .iter()
                    .map(|column| {
                        self.values
                            .get(&column.code)
                            .and_then(|by_week| by_week.get(week))
                            .and_then(|candidates| candidates.last())
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect();
                (*week, cells)
            })
            .collect();

        Ok(ConsolidatedMatrix {
            columns,
            rows,
            unmapped_codes,
        })
    }
}

/// Pivots `data` into the week by series matrix.
pub fn consolidate<I>(data: I) -> Result<ConsolidatedMatrix, ConsolidateError>
where
    I: IntoIterator<Item = ExtractedDatum>,
{
    let mut consolidator = Consolidator::new();
    for datum in data {
        consolidator.add(datum);
    }
    consolidator.build()
}
