//! Extraction of series values from the rows of classified tables.


use crate::{
    classify::{TableType, match_label},
    series::{
        BreakdownCategory, Instrument, MainCategory, Metric, SeriesCode, SeriesGroup, SeriesKey,
        Subcategory,
    },
    table::Row,
    weekkey::WeekKey,
};

/// Rows shorter than this lack the balance column and are skipped.
pub const MIN_ROW_FIELDS: usize = 8;

const CATEGORY_COLUMN: usize = 0;
const SUBCATEGORY_COLUMN: usize = 1;
const VALUE_COLUMN: usize = 5;
const BALANCE_COLUMN: usize = 7;

/// Category labels of main summary rows, in match priority order.
pub const MAIN_CATEGORY_LABELS: &[(&str, MainCategory)] = &[
    ("自己取引計", MainCategory::Proprietary),
    ("委託取引計", MainCategory::Brokerage),
    ("自己委託合計", MainCategory::Total),
];

/// Category labels of brokerage breakdown rows, in match priority order.
pub const BREAKDOWN_CATEGORY_LABELS: &[(&str, BreakdownCategory)] = &[
    ("法人計", BreakdownCategory::Institutions),
    ("個人計", BreakdownCategory::Individuals),
    ("海外投資家計", BreakdownCategory::Foreigners),
    ("証券会社", BreakdownCategory::SecuritiesCos),
];

pub const SUBCATEGORY_LABELS: &[(&str, Subcategory)] =
    &[("売り", Subcategory::Sales), ("買い", Subcategory::Purchases)];

/// Subcategory cells containing this are aggregate rows, which are not recorded.
const TOTAL_MARKER: &str = "合計";

/// One value of one series in one week.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ExtractedDatum {
    pub code: SeriesCode,
    pub week: WeekKey,
    /// Non-empty figure, in normalized sign notation.
    pub value: String,
}

/// Normalizes the sign notation of a reported figure. Placeholders for missing figures become
/// empty, and the triangle the reports use as a minus sign becomes `-`.
pub fn normalize_sign(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return String::new();
    }
    match trimmed.strip_prefix('▲') {
        Some(magnitude) => format!("-{}", magnitude),
        None => trimmed.to_string(),
    }
}

/// Extracts the data in the rows of one table.
///
/// The first row is the table header. Only main summary and brokerage breakdown tables hold
/// recorded series; other table types yield nothing.
pub fn parse_table(
    rows: &[Row],
    instrument: Instrument,
    table_type: TableType,
    week: WeekKey,
) -> Vec<ExtractedDatum> {
    let mut data = Vec::new();
    // Category cells span several rows, and are only filled in on the first of them.
    let mut current_category = String::new();

    for row in rows.iter().skip(1) {
        if row.len() < MIN_ROW_FIELDS {
            log::debug!("Skipping row with {} fields: {:?}", row.len(), row);
            continue;
        }

        let category_cell = row[CATEGORY_COLUMN].trim();
        if !category_cell.is_empty() {
            current_category = category_cell.to_string();
        }
        let subcategory_cell = row[SUBCATEGORY_COLUMN].trim();
        if current_category.is_empty() || subcategory_cell.is_empty() {
            continue;
        }
        if subcategory_cell.contains(TOTAL_MARKER) {
            continue;
        }

        let Some(group) = match_group(table_type, &current_category) else {
            continue;
        };
        let Some(subcategory) = match_label(SUBCATEGORY_LABELS, subcategory_cell) else {
            continue;
        };

        for (metric, column) in [(Metric::Value, VALUE_COLUMN), (Metric::Balance, BALANCE_COLUMN)] {
            let value = normalize_sign(&row[column]);
            if value.is_empty() {
                continue;
            }
            let key = SeriesKey {
                instrument,
                group,
                subcategory,
                metric,
            };
            data.push(ExtractedDatum {
                code: key.code(),
                week,
                value,
            });
        }
    }

    data
}

fn match_group(table_type: TableType, category_cell: &str) -> Option<SeriesGroup> {
    match table_type {
        TableType::MainSummary => {
            match_label(MAIN_CATEGORY_LABELS, category_cell).map(SeriesGroup::Main)
        }
        TableType::BrokerageBreakdown => {
            match_label(BREAKDOWN_CATEGORY_LABELS, category_cell).map(SeriesGroup::Breakdown)
        }
        TableType::InstitutionsBreakdown | TableType::FinancialInstitutionsBreakdown => None,
    }
}
