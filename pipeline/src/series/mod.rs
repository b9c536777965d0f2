//! Series codes, and the fixed universe of columns in the consolidated output.


use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Futures product covered by the report.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
pub enum Instrument {
    #[serde(rename = "JGB10YEARFUTURES")]
    #[strum(serialize = "JGB10YEARFUTURES")]
    Jgb10YearFutures,
    #[serde(rename = "MINI10YEARJGBFUTURESCASHSETTLED")]
    #[strum(serialize = "MINI10YEARJGBFUTURESCASHSETTLED")]
    Mini10YearJgbFuturesCashSettled,
    #[serde(rename = "MINI20YEARJGBFUTURES")]
    #[strum(serialize = "MINI20YEARJGBFUTURES")]
    Mini20YearJgbFutures,
    #[serde(rename = "3MONTHTONAFUTURES")]
    #[strum(serialize = "3MONTHTONAFUTURES")]
    ThreeMonthTonaFutures,
}

impl Instrument {
    /// Code used within series codes.
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Name used within column descriptions.
    pub fn name(self) -> &'static str {
        use Instrument::*;
        match self {
            Jgb10YearFutures => "JGB(10-year) Futures",
            Mini10YearJgbFuturesCashSettled => "mini-10-year JGB Futures（Cash-Settled)",
            Mini20YearJgbFutures => "mini-20-year JGB Futures",
            ThreeMonthTonaFutures => "3-Month TONA Futures",
        }
    }
}

impl Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Category of a main summary table row.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
pub enum MainCategory {
    #[strum(serialize = "PROPRIETARY")]
    Proprietary,
    #[strum(serialize = "BROKERAGE")]
    Brokerage,
    #[strum(serialize = "TOTAL")]
    Total,
}

impl MainCategory {
    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn name(self) -> &'static str {
        use MainCategory::*;
        match self {
            Proprietary => "Proprietary",
            Brokerage => "Brokerage",
            Total => "Total",
        }
    }
}

/// Category of a brokerage breakdown table row.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
pub enum BreakdownCategory {
    #[strum(serialize = "INSTITUTIONS")]
    Institutions,
    #[strum(serialize = "INDIVIDUALS")]
    Individuals,
    #[strum(serialize = "FOREIGNERS")]
    Foreigners,
    #[strum(serialize = "SECURITIES_COS")]
    SecuritiesCos,
}

impl BreakdownCategory {
    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn name(self) -> &'static str {
        use BreakdownCategory::*;
        match self {
            Institutions => "Institutions",
            Individuals => "Individuals",
            Foreigners => "Foreigners",
            SecuritiesCos => "Securities Cos",
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
pub enum Subcategory {
    #[strum(serialize = "SALES")]
    Sales,
    #[strum(serialize = "PURCHASES")]
    Purchases,
}

impl Subcategory {
    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn name(self) -> &'static str {
        match self {
            Subcategory::Sales => "Sales",
            Subcategory::Purchases => "Purchases",
        }
    }
}

/// Which figure of a row a series holds.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
pub enum Metric {
    #[strum(serialize = "VALUE")]
    Value,
    #[strum(serialize = "BALANCE")]
    Balance,
}

impl Metric {
    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Value => "Value",
            Metric::Balance => "Balance",
        }
    }
}

/// The table block a series is reported in, with the category of the row within that block.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SeriesGroup {
    Main(MainCategory),
    Breakdown(BreakdownCategory),
}

/// Structured identity of one series. Each distinct key has a distinct code.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SeriesKey {
    pub instrument: Instrument,
    pub group: SeriesGroup,
    pub subcategory: Subcategory,
    pub metric: Metric,
}

impl SeriesKey {
    pub fn code(&self) -> SeriesCode {
        let instrument = self.instrument.code();
        let subcategory = self.subcategory.code();
        let metric = self.metric.code();
        let code = match self.group {
            SeriesGroup::Main(category) => format!(
                "JGBF.TOTAL_PROPRIETARY_BROKERAGE.{instrument}.TRADINGVALUE.{category}.{subcategory}.{metric}.W",
                category = category.code(),
            ),
            SeriesGroup::Breakdown(category) => format!(
                "JGBF.{domain}.{instrument}.BREAKDOWNOFBROKERAGE.TRADINGVALUE.{category}.{subcategory}.{metric}.W",
                domain = breakdown_domain(self.instrument),
                category = category.code(),
            ),
        };
        SeriesCode(code)
    }

    pub fn description(&self) -> String {
        let instrument = self.instrument.name();
        let subcategory = self.subcategory.name();
        let metric = self.metric.name();
        match self.group {
            SeriesGroup::Main(category) => format!(
                "Trading by Type of Investors, {instrument}, Total, Proprietary ＆ Brokerage, Trading Value, {category}, {subcategory}, {metric}",
                category = category.name(),
            ),
            SeriesGroup::Breakdown(category) => format!(
                "Trading by Type of Investors, {instrument}, Breakdown of Brokerage, Trading Value, {category}, {subcategory}, {metric}",
                category = category.name(),
            ),
        }
    }
}

/// Breakdown series of the 10-year futures are published under a different domain to those of
/// every other instrument.
fn breakdown_domain(instrument: Instrument) -> &'static str {
    match instrument {
        Instrument::Jgb10YearFutures => "TRADINGBYTYPEOFINVESTORS",
        _ => "TOTAL_PROPRIETARY_BROKERAGE",
    }
}

/// Stable string identifier of one series.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SeriesCode(String);

impl SeriesCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SeriesCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One column of the consolidated output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateColumn {
    pub code: SeriesCode,
    pub description: String,
}

impl From<SeriesKey> for TemplateColumn {
    fn from(key: SeriesKey) -> Self {
        Self {
            code: key.code(),
            description: key.description(),
        }
    }
}

/// Returns every series key in column order: all main summary series, then all breakdown
/// series, each ordered by instrument, category, subcategory, and metric.
pub fn template_keys() -> Vec<SeriesKey> {
    let main_groups = MainCategory::iter().map(SeriesGroup::Main);
    let breakdown_groups = BreakdownCategory::iter().map(SeriesGroup::Breakdown);
    let blocks: [Vec<SeriesGroup>; 2] = [main_groups.collect(), breakdown_groups.collect()];

    let mut keys = Vec::new();
    for groups in &blocks {
        for instrument in Instrument::iter() {
            for &group in groups {
                for subcategory in Subcategory::iter() {
                    for metric in Metric::iter() {
                        keys.push(SeriesKey {
                            instrument,
                            group,
                            subcategory,
                            metric,
                        });
                    }
                }
            }
        }
    }
    keys
}

/// Returns the full set of output columns. This does not depend on any observed data.
pub fn template_columns() -> Vec<TemplateColumn> {
    template_keys().into_iter().map(Into::into).collect()
}
