//! Classification of report pages by instrument, and of the tables on them by table type.


use std::{fmt::Display, sync::LazyLock};

use serde::{Deserialize, Serialize};

use crate::{parseutil::normalize_parens, series::Instrument};

/// Number of tables every classified page is laid out with, in the order of
/// [TABLE_SECTION_KEYWORDS].
pub const TABLES_PER_PAGE: usize = 4;

/// Substrings of a subtitle line that identify the page's instrument.
const INSTRUMENT_KEYWORDS: &[(&str, Instrument)] = &[
    ("長期国債先物（現金決済型ミニ）", Instrument::Mini10YearJgbFuturesCashSettled),
    ("JGB(10-year) Futures", Instrument::Jgb10YearFutures),
    (
        "mini-10-year JGB Futures (Cash-Settled)",
        Instrument::Mini10YearJgbFuturesCashSettled,
    ),
    ("mini-20-year JGB Futures", Instrument::Mini20YearJgbFutures),
    ("3-Month TONA Futures", Instrument::ThreeMonthTonaFutures),
];

/// Lines containing any of these belong to options pages, which share subtitles with the
/// futures pages.
const EXCLUSION_KEYWORDS: &[&str] = &["Options on", "オプション"];

/// Section headings of the tables on a page, in page order.
pub const TABLE_SECTION_KEYWORDS: [(&str, TableType); TABLES_PER_PAGE] = [
    ("総計・自己合計・委託合計", TableType::MainSummary),
    ("委託内訳", TableType::BrokerageBreakdown),
    ("法人内訳", TableType::InstitutionsBreakdown),
    ("金融機関内訳", TableType::FinancialInstitutionsBreakdown),
];

/// Instrument keywords, normalized and ordered so that longer, more specific keywords are
/// tested before any keyword they contain.
static SORTED_INSTRUMENT_KEYWORDS: LazyLock<Vec<(String, Instrument)>> = LazyLock::new(|| {
    sorted_longest_first(INSTRUMENT_KEYWORDS)
        .into_iter()
        .map(|(keyword, instrument)| (normalize_parens(keyword), instrument))
        .collect()
});

/// Returns the entries of `dict` ordered by descending keyword length in characters. Entries
/// of equal length keep their relative order.
pub fn sorted_longest_first<T: Copy>(dict: &[(&'static str, T)]) -> Vec<(&'static str, T)> {
    let mut sorted = dict.to_vec();
    sorted.sort_by_key(|(keyword, _)| std::cmp::Reverse(keyword.chars().count()));
    sorted
}

/// Returns the value of the first entry in `dict` whose label is contained in `text`.
pub fn match_label<K, T>(dict: &[(K, T)], text: &str) -> Option<T>
where
    K: AsRef<str>,
    T: Copy,
{
    dict.iter()
        .find(|(label, _)| text.contains(label.as_ref()))
        .map(|&(_, value)| value)
}

/// Instrument of a page, and the subtitle line it was identified from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageSubtitle {
    pub instrument: Instrument,
    /// The whole trimmed line containing the instrument keyword.
    pub subtitle: String,
}

/// Identifies the instrument a page reports on from its text lines, in document order.
///
/// Returns `None` for pages with no instrument keyword outside of option-page lines. Such pages
/// are not processed further.
pub fn classify_page<S: AsRef<str>>(lines: &[S]) -> Option<PageSubtitle> {
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if EXCLUSION_KEYWORDS.iter().any(|keyword| line.contains(keyword)) {
            continue;
        }
        let normalized = normalize_parens(line);
        if let Some(instrument) = match_label(SORTED_INSTRUMENT_KEYWORDS.as_slice(), &normalized) {
            return Some(PageSubtitle {
                instrument,
                subtitle: line.to_string(),
            });
        }
    }
    None
}

/// [classify_page] over the lines of a page's text.
pub fn classify_page_text(text: &str) -> Option<PageSubtitle> {
    let lines: Vec<&str> = text.lines().collect();
    classify_page(&lines)
}

/// Type of a table on a classified page.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    MainSummary,
    BrokerageBreakdown,
    InstitutionsBreakdown,
    FinancialInstitutionsBreakdown,
}

impl TableType {
    /// Title of the table section as printed in the report.
    pub fn title(self) -> &'static str {
        use TableType::*;
        match self {
            MainSummary => "総計・自己合計・委託合計 Total, Proprietary & Brokerage",
            BrokerageBreakdown => "委託内訳 Breakdown of Brokerage",
            InstitutionsBreakdown => "法人内訳 Breakdown of Institutions",
            FinancialInstitutionsBreakdown => "金融機関内訳 Breakdown of Financial Institutions",
        }
    }

    fn slot(self) -> usize {
        use TableType::*;
        match self {
            MainSummary => 0,
            BrokerageBreakdown => 1,
            InstitutionsBreakdown => 2,
            FinancialInstitutionsBreakdown => 3,
        }
    }
}

/// Returns the type of the first section keyword contained in `text`.
pub fn classify_table_section(text: &str) -> Option<TableType> {
    match_label(&TABLE_SECTION_KEYWORDS, text)
}

/// Which table section headings were found in a page's text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TableSections([bool; TABLES_PER_PAGE]);

impl TableSections {
    pub fn contains(&self, table_type: TableType) -> bool {
        self.0[table_type.slot()]
    }
}

/// Finds the table section headings present anywhere in a page's text.
pub fn page_table_sections(page_text: &str) -> TableSections {
    let mut sections = TableSections::default();
    for (keyword, table_type) in TABLE_SECTION_KEYWORDS {
        if page_text.contains(keyword) {
            sections.0[table_type.slot()] = true;
        }
    }
    sections
}

/// Label of one table in a combined document.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableLabel {
    Typed(TableType),
    /// The table's type could not be determined. `position` is its 1-based position on the
    /// page.
    Fallback { position: usize },
}

impl TableLabel {
    pub fn table_type(self) -> Option<TableType> {
        match self {
            TableLabel::Typed(table_type) => Some(table_type),
            TableLabel::Fallback { .. } => None,
        }
    }
}

impl Display for TableLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableLabel::Typed(table_type) => f.write_str(table_type.title()),
            TableLabel::Fallback { position } => write!(f, "Table Title {} (Not Found)", position),
        }
    }
}

/// Labels the `table_count` tables converted from one page.
///
/// Tables are only typed by position when the page has exactly [TABLES_PER_PAGE] tables. Any
/// other count means the layout is not the expected one, and every table gets a fallback label.
pub fn assign_table_labels(sections: TableSections, table_count: usize) -> Vec<TableLabel> {
    let fallback = |index: usize| TableLabel::Fallback {
        position: index + 1,
    };

    if table_count != TABLES_PER_PAGE {
        log::warn!(
            "Expected {} tables on page, found {}. Leaving tables unlabelled.",
            TABLES_PER_PAGE,
            table_count
        );
        return (0..table_count).map(fallback).collect();
    }

    TABLE_SECTION_KEYWORDS
        .iter()
        .enumerate()
        .map(|(index, &(_, table_type))| {
            if sections.contains(table_type) {
                TableLabel::Typed(table_type)
            } else {
                fallback(index)
            }
        })
        .collect()
}
