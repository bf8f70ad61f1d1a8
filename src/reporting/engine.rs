//! Drives the `count` and `list` reports against an incident source

use crate::config::{CountOptions, ListOptions, PaginationConfig};
use crate::error::Result;
use crate::models::{details_for_title, DateWindow};
use crate::pagerduty::{IncidentPager, IncidentSource};
use crate::reporting::aggregator::{title_matches, AggregationState, PivotAggregator};
use crate::reporting::calendar::CalendarIterator;
use crate::reporting::filter::{DateFilter, DayDecision};
use crate::reporting::flat::{CustomFieldExtractor, FlatReport};
use crate::reporting::pivot::PivotTable;
use futures::TryStreamExt;
use std::pin::pin;
use tracing::{debug, error, info};

/// Result of a `count` run
#[derive(Debug, Clone)]
pub struct CountReport {
    pub state: AggregationState,
    /// Days whose incidents were fetched
    pub days_queried: u32,
    /// Days skipped by the date filter
    pub days_skipped: u32,
    pub csv: String,
}

/// Result of a `list` run
#[derive(Debug, Clone)]
pub struct ListReport {
    /// Incidents returned by the API
    pub fetched: usize,
    /// Rows written after title filtering
    pub rows: usize,
    pub csv: String,
}

/// Report engine
pub struct ReportEngine<S: IncidentSource> {
    source: S,
    pagination: PaginationConfig,
}

impl<S: IncidentSource> ReportEngine<S> {
    pub fn new(source: S, pagination: PaginationConfig) -> Self {
        Self { source, pagination }
    }

    /// Count incident titles per iteration, one day at a time.
    ///
    /// Window files are loaded before any request is made. Any fetch error
    /// aborts the run.
    pub async fn count(&self, options: &CountOptions) -> Result<CountReport> {
        let filter = DateFilter::load(
            options.exclude_dates.as_deref(),
            options.include_dates.as_deref(),
        )
        .await?;

        info!(
            iterations = options.iteration_count,
            granularity = %options.granularity,
            since = %options.since.to_rfc3339(),
            "Getting incident counts"
        );

        let mut aggregator = PivotAggregator::new(options.granularity, options.filter.clone());
        let mut days_queried = 0;
        let mut days_skipped = 0;

        let calendar =
            CalendarIterator::new(options.since, options.granularity, options.iteration_count);
        for day in calendar {
            aggregator.enter_day(&day);
            if day.starts_iteration {
                info!(
                    iteration = day.iteration,
                    granularity = %options.granularity,
                    "Starting iteration"
                );
            }

            debug!(
                start = %day.window.since_param(),
                end = %day.window.until_param(),
                "Processing day"
            );

            match filter.evaluate(day.window.start) {
                DayDecision::Excluded => {
                    info!(day = %day.window.start.date_naive(), "Skipping day, date is excluded");
                    days_skipped += 1;
                }
                DayDecision::NotIncluded => {
                    info!(day = %day.window.start.date_naive(), "Skipping day, date is not included");
                    days_skipped += 1;
                }
                DayDecision::Included => {
                    let recorded = self.count_day(&mut aggregator, day.window, day.iteration).await?;
                    debug!(recorded, iteration = day.iteration, "Counted incidents for day");
                    days_queried += 1;
                }
            }
        }

        let state = aggregator.finish();
        let csv = PivotTable::render(&state, options.iteration_count)?;

        info!(
            titles = state.counts.len(),
            days_queried, days_skipped, "Incident counts complete"
        );

        Ok(CountReport {
            state,
            days_queried,
            days_skipped,
            csv,
        })
    }

    /// Drain one day's window into the aggregator
    async fn count_day(
        &self,
        aggregator: &mut PivotAggregator,
        window: DateWindow,
        iteration: u32,
    ) -> Result<usize> {
        let pager = IncidentPager::new(&self.source, window, &self.pagination);
        let mut incidents = pin!(pager.incidents());
        let mut recorded = 0;

        while let Some(incident) = incidents.try_next().await.map_err(|e| {
            error!(day = %window.start.date_naive(), error = %e, "Failed to get incidents");
            e
        })? {
            if aggregator.record(&incident.title, iteration) {
                recorded += 1;
            }
        }

        Ok(recorded)
    }

    /// List every incident in `[since, until)` as one CSV row each.
    ///
    /// The extraction pattern is compiled before any request. Any fetch
    /// error, including a failed alert lookup, aborts the run.
    pub async fn list(&self, options: &ListOptions) -> Result<ListReport> {
        let extractor = CustomFieldExtractor::new(
            options.custom_fields.clone(),
            options.custom_fields_regex.as_deref(),
        )?;

        let window = DateWindow::new(options.since, options.until);
        info!(
            since = %window.since_param(),
            until = %window.until_param(),
            "Getting incidents"
        );

        let incidents = IncidentPager::new(&self.source, window, &self.pagination)
            .collect_all()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to get incidents");
                e
            })?;
        let total = incidents.len();
        info!(total, "Retrieved incidents");

        let mut report = FlatReport::new(extractor.fields())?;
        for (index, incident) in incidents.iter().enumerate() {
            let title = incident.trimmed_title();
            if !title_matches(title, options.filter.as_deref()) {
                continue;
            }

            let custom_values = if extractor.is_empty() {
                Vec::new()
            } else {
                let alerts = self.source.fetch_alerts(&incident.id).await.map_err(|e| {
                    error!(incident_id = %incident.id, error = %e, "Failed to get incident details");
                    e
                })?;
                extractor.extract(&details_for_title(&alerts, title))
            };

            report.push_row(incident, &custom_values)?;
            debug!(processed = index + 1, total, "Retrieved incident details");
        }

        let rows = report.rows();
        let csv = report.finish()?;
        info!(rows, "Incident listing complete");

        Ok(ListReport {
            fetched: total,
            rows,
            csv,
        })
    }
}
