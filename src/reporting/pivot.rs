//! Renders aggregated counts as a CSV pivot table

use crate::error::{AppError, Result};
use crate::reporting::aggregator::AggregationState;

/// Title column header
pub const TITLE_COLUMN: &str = "Incident Title";

/// CSV rendering of an [`AggregationState`]
pub struct PivotTable;

impl PivotTable {
    /// Header row plus one row per title in first-seen order; each row has
    /// exactly `iteration_count` cells, absent counts rendered as 0.
    ///
    /// The state must carry one header label per iteration, which holds
    /// once the calendar has been fully walked.
    pub fn render(state: &AggregationState, iteration_count: u32) -> Result<String> {
        if state.header_labels.len() != iteration_count as usize {
            return Err(AppError::Export(format!(
                "pivot has {} iteration labels, expected {}",
                state.header_labels.len(),
                iteration_count
            )));
        }

        let mut writer = csv::WriterBuilder::new()
            .flexible(false)
            .from_writer(Vec::new());

        let header: Vec<&str> = std::iter::once(TITLE_COLUMN)
            .chain(state.header_labels.iter().map(String::as_str))
            .collect();
        writer.write_record(&header)?;

        for title in state.counts.titles() {
            let mut record = Vec::with_capacity(header.len());
            record.push(title.to_string());
            record.extend((1..=iteration_count).map(|i| state.count_for(title, i).to_string()));
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::aggregator::PivotAggregator;
    use crate::reporting::calendar::{CalendarIterator, Granularity};
    use chrono::{TimeZone, Utc};

    fn aggregate(titles_per_day: &[&[&str]], granularity: Granularity, count: u32) -> AggregationState {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut aggregator = PivotAggregator::new(granularity, None);
        for (day, titles) in CalendarIterator::new(start, granularity, count).zip(titles_per_day) {
            aggregator.enter_day(&day);
            for title in titles.iter() {
                aggregator.record(title, day.iteration);
            }
        }
        aggregator.finish()
    }

    #[test]
    fn test_render_fills_missing_cells_with_zero() {
        let state = aggregate(&[&["A", "B"], &["A"], &["C", "C"]], Granularity::Day, 3);
        let csv = PivotTable::render(&state, 3).unwrap();

        assert_eq!(
            csv,
            "Incident Title,day starting 2025-01-01,day starting 2025-01-02,day starting 2025-01-03\n\
             A,1,1,0\n\
             B,1,0,0\n\
             C,0,0,2\n"
        );
    }

    #[test]
    fn test_render_shape_matches_iteration_count() {
        let state = aggregate(&[&["A"], &["B"], &["C"], &["A"]], Granularity::Day, 4);
        let csv = PivotTable::render(&state, 4).unwrap();

        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|line| line.split(',').count() == 5));
    }

    #[test]
    fn test_render_restores_brackets() {
        let state = aggregate(&[&["[prod] Disk full"]], Granularity::Day, 1);
        let csv = PivotTable::render(&state, 1).unwrap();

        assert!(csv.contains("[prod] Disk full,1\n"));
        assert!(!csv.contains("||--"));
    }

    #[test]
    fn test_render_keeps_placeholder_text_in_titles() {
        let state = aggregate(&[&["deploy ||-- rollback", "[prod] deploy"]], Granularity::Day, 1);
        let csv = PivotTable::render(&state, 1).unwrap();

        assert!(csv.contains("\ndeploy ||-- rollback,1\n"));
        assert!(csv.contains("\n[prod] deploy,1\n"));
    }

    #[test]
    fn test_render_rejects_missing_iteration_labels() {
        let state = aggregate(&[&["A"]], Granularity::Day, 1);
        let err = PivotTable::render(&state, 2).unwrap_err();
        assert_eq!(err.error_code(), "EXPORT_ERROR");
    }

    #[test]
    fn test_render_quotes_titles_with_commas() {
        let state = aggregate(&[&["db-1, db-2 unreachable"]], Granularity::Day, 1);
        let csv = PivotTable::render(&state, 1).unwrap();
        assert!(csv.contains("\"db-1, db-2 unreachable\",1\n"));
    }

    #[test]
    fn test_render_empty_state() {
        let state = aggregate(&[&[]], Granularity::Week, 1);
        let csv = PivotTable::render(&state, 1).unwrap();
        assert_eq!(csv, "Incident Title,week starting 2025-01-01\n");
    }
}
