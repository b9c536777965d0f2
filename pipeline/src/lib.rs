//! Extraction of the weekly "Trading by Type of Investors" statistics for JGB and TONA futures
//! from the exchange's PDF reports, and their consolidation into one week by series table.

pub mod classify;
pub mod clock;
pub mod config;
pub mod consolidate;
pub mod coordinator;
pub mod mpscutil;
pub mod output_csv;
pub mod parseutil;
pub mod pdf;
pub mod rowparse;
pub mod series;
pub mod table;
#[cfg(test)]
mod testutil;
pub mod weekkey;
pub mod workflow;
