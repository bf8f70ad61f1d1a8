//! Time-windowed incident reports
//!
//! Two report paths share the same pagination machinery:
//!
//! - **count**: walks the calendar one day at a time from a start date,
//!   gates each day through the include/exclude [`DateFilter`], drains that
//!   day's incidents and folds their titles into a pivot table of
//!   occurrences per day/week/month iteration.
//! - **list**: drains a single `[since, until)` window and writes one row per
//!   incident, optionally enriched with alert custom details.
//!
//! # Example
//!
//! ```no_run
//! use pdreport::config::{ApiAccess, Config, CountOptions};
//! use pdreport::pagerduty::PagerDutyClient;
//! use pdreport::reporting::{Granularity, ReportEngine, ReportExporter};
//! use pdreport::models::parse_timestamp;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let access = ApiAccess::new("api-key", "PTEAM01", "PSVC001,PSVC002");
//!     let client = PagerDutyClient::new(&config.pagerduty, access)?;
//!     let engine = ReportEngine::new(client, config.pagination.clone());
//!
//!     let options = CountOptions::new(parse_timestamp("2025-01-01")?, Granularity::Week, 4)
//!         .with_output("weekly.csv");
//!     let report = engine.count(&options).await?;
//!     ReportExporter::write_csv(&report.csv, &options.output).await?;
//!
//!     Ok(())
//! }
//! ```

mod aggregator;
mod calendar;
mod engine;
mod export;
mod filter;
mod flat;
mod pivot;

pub use aggregator::{
    normalize_title, title_matches, AggregationState, IterationCounts, PivotAggregator,
};
pub use calendar::{CalendarDay, CalendarIterator, Granularity};
pub use engine::{CountReport, ListReport, ReportEngine};
pub use export::ReportExporter;
pub use filter::{load_windows, DateFilter, DayDecision};
pub use flat::{sanitize, CustomFieldExtractor, FlatReport, BASE_COLUMNS, UNKNOWN};
pub use pivot::{PivotTable, TITLE_COLUMN};
