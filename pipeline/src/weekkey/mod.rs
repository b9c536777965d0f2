//! Resolution of report labels and file names into ISO 8601 week keys.


use std::fmt::Display;

use chrono::{Datelike, Month, NaiveDate, TimeDelta};
use lazy_regex::regex_captures;

/// Identifies one reporting period as an ISO 8601 `(year, week)` pair.
///
/// Ordering is by year then week, which agrees with the ordering of the `YYYY-WW` rendering.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WeekKey {
    iso_year: i32,
    iso_week: u32,
}

impl WeekKey {
    pub fn new(iso_year: i32, iso_week: u32) -> Self {
        Self { iso_year, iso_week }
    }

    /// Returns the ISO week containing `date`. Weeks start on Monday, and belong to the year
    /// containing their Thursday.
    pub fn from_date(date: NaiveDate) -> Self {
        let week = date.iso_week();
        Self {
            iso_year: week.year(),
            iso_week: week.week(),
        }
    }

    pub fn iso_year(&self) -> i32 {
        self.iso_year
    }

    pub fn iso_week(&self) -> u32 {
        self.iso_week
    }
}

impl Display for WeekKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.iso_year, self.iso_week)
    }
}

/// The `(year, month, week ordinal)` a report is published under, as shown in the exchange's
/// report listing, e.g. `Dec 2023, Week2`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReportLabel {
    pub year: i32,
    pub month: Month,
    /// 1-based week within the month.
    pub week: u32,
}

/// Resolves the week key of a report from its label text or file name. Returns `None` when no
/// known shape matches; callers are expected to log and skip the report.
pub fn parse_week_key(text: &str) -> Option<WeekKey> {
    parse_report_date(text).map(WeekKey::from_date)
}

/// Resolves a date within the week covered by a report, trying each known shape in priority
/// order. A shape that matches structurally but names an impossible date falls through to the
/// next shape.
pub fn parse_report_date(text: &str) -> Option<NaiveDate> {
    filename_date(text)
        .or_else(|| match_label(text).and_then(|parts| parts.date()))
        .or_else(|| match_label(&text.replace('_', " ")).and_then(|parts| parts.date()))
}

/// Extracts the published label of a report from label text, or a file name derived from one.
pub fn parse_report_label(text: &str) -> Option<ReportLabel> {
    let parts = match_label(text).or_else(|| match_label(&text.replace('_', " ")))?;
    Some(ReportLabel {
        year: parts.year,
        month: Month::try_from(u8::try_from(parts.month).ok()?).ok()?,
        week: parts.week,
    })
}

/// Matches the file name shapes produced when saving reports.
fn filename_date(text: &str) -> Option<NaiveDate> {
    // e.g. "Dec_2023_Week2_12-4_-_12-8": the numeric start of the range, in the year of the
    // label unless a January report starts in December.
    if let Some((_, month_name, year, start_month, start_day)) =
        regex_captures!(r"([A-Za-z]{3})_(\d{4})_Week\d+_(\d{1,2})-(\d{1,2})"i, text)
    {
        if let (Some(month), Ok(year), Ok(start_month), Ok(start_day)) = (
            month_number(month_name),
            year.parse::<i32>(),
            start_month.parse::<u32>(),
            start_day.parse::<u32>(),
        ) {
            if let Some(date) = range_start(year, month, start_month, start_day) {
                return Some(date);
            }
        }
    }

    // The same without a month name: year, then the numeric start of the range.
    if let Some((_, year, month, day)) =
        regex_captures!(r"_(\d{4})_Week\d+_(\d{1,2})-(\d{1,2})"i, text)
    {
        if let Some(date) = ymd(year.parse().ok(), month.parse().ok(), day.parse().ok()) {
            return Some(date);
        }
    }

    // e.g. "weekly_Dec._8_2023_-_".
    if let Some((_, month_name, day, year)) =
        regex_captures!(r"_([A-Za-z]{3})\.?_(\d{1,2})_(\d{4})_-_"i, text)
    {
        if let Some(date) = ymd(year.parse().ok(), month_number(month_name), day.parse().ok()) {
            return Some(date);
        }
    }

    None
}

/// First day of the range of a report labelled with `label_year` and `label_month`.
fn range_start(
    label_year: i32,
    label_month: u32,
    start_month: u32,
    start_day: u32,
) -> Option<NaiveDate> {
    // A January report can start in the last days of December.
    let year = if label_month == 1 && start_month == 12 {
        label_year - 1
    } else {
        label_year
    };
    NaiveDate::from_ymd_opt(year, start_month, start_day)
}

/// Structural parts of a report label.
#[derive(Debug)]
struct LabelParts {
    year: i32,
    month: u32,
    week: u32,
    /// `(month, day)` of the first day covered, when the label states it.
    start: Option<(u32, u32)>,
}

impl LabelParts {
    fn date(&self) -> Option<NaiveDate> {
        if let Some((start_month, start_day)) = self.start {
            if let Some(date) = range_start(self.year, self.month, start_month, start_day) {
                return Some(date);
            }
        }
        self.week_ordinal_date()
    }

    /// Date within the N-th week of the month, counting seven day blocks from its first day.
    fn week_ordinal_date(&self) -> Option<NaiveDate> {
        if !(1..=6).contains(&self.week) {
            return None;
        }
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        first.checked_add_signed(TimeDelta::days(7 * (i64::from(self.week) - 1)))
    }
}

/// Matches the label shapes shown in the report listing.
fn match_label(text: &str) -> Option<LabelParts> {
    // e.g. "Dec. 8, 2023 (Week 2)".
    if let Some((_, month_name, day, year, week)) = regex_captures!(
        r"([A-Za-z]{3})\.?\s+(\d{1,2}),?\s+(\d{4}).*?Week\s?(\d+)"i,
        text
    ) {
        if let (Some(month), Ok(day), Ok(year), Ok(week)) = (
            month_number(month_name),
            day.parse::<u32>(),
            year.parse::<i32>(),
            week.parse::<u32>(),
        ) {
            return Some(LabelParts {
                year,
                month,
                week,
                start: Some((month, day)),
            });
        }
    }

    // e.g. "Jul 2025, Week2（7/7 - 7/11）", with the range being optional.
    if let Some((_, month_name, year, week, start_month, start_day)) = regex_captures!(
        r"([A-Za-z]{3})\.?\s+(\d{4}).*?Week\s?(\d+)(?:\s*[（(]?\s*(\d{1,2})\s*[/-]\s*(\d{1,2}))?"i,
        text
    ) {
        if let (Some(month), Ok(year), Ok(week)) = (
            month_number(month_name),
            year.parse::<i32>(),
            week.parse::<u32>(),
        ) {
            let start = match (start_month.parse::<u32>(), start_day.parse::<u32>()) {
                (Ok(start_month), Ok(start_day)) => Some((start_month, start_day)),
                _ => None,
            };
            return Some(LabelParts {
                year,
                month,
                week,
                start,
            });
        }
    }

    None
}

fn ymd(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year?, month?, day?)
}

/// Parses an English month name or abbreviation, ignoring case.
fn month_number(name: &str) -> Option<u32> {
    name.parse::<Month>().ok().map(|month| month.number_from_month())
}
