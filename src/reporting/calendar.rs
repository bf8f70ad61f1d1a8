//! Day-by-day calendar iteration grouped into day/week/month buckets

use crate::models::DateWindow;
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Length of one report iteration
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    EnumString,
    Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Column header for an iteration whose first day is `first_day`
    pub fn label(&self, first_day: DateTime<Utc>) -> String {
        format!("{} starting {}", self, first_day.format("%Y-%m-%d"))
    }
}

/// One day produced by the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    /// Query window `[day, day + 1)`
    pub window: DateWindow,

    /// 1-based iteration the day belongs to
    pub iteration: u32,

    /// First day of its iteration
    pub starts_iteration: bool,
}

/// Walks forward one day at a time from `start` until `iteration_count`
/// iterations have been produced. There is no end date.
#[derive(Debug, Clone)]
pub struct CalendarIterator {
    granularity: Granularity,
    iteration_count: u32,
    cursor: DateTime<Utc>,
    iteration: u32,
    days_into_iteration: u32,
}

impl CalendarIterator {
    pub fn new(start: DateTime<Utc>, granularity: Granularity, iteration_count: u32) -> Self {
        Self {
            granularity,
            iteration_count,
            cursor: start,
            iteration: 1,
            days_into_iteration: 0,
        }
    }

    /// Whether advancing past the day just produced closes the iteration.
    ///
    /// Weeks count every produced day, including days later skipped by the
    /// date filter. Months compare the month of the day just produced with
    /// the month of the day before it, so a bucket closes after the first of
    /// a month has been processed.
    fn iteration_complete(&self) -> bool {
        match self.granularity {
            Granularity::Day => true,
            Granularity::Week => self.days_into_iteration == 7,
            Granularity::Month => {
                let processed = self.cursor - Duration::days(1);
                let previous = processed - Duration::days(1);
                processed.month() != previous.month()
            }
        }
    }
}

impl Iterator for CalendarIterator {
    type Item = CalendarDay;

    fn next(&mut self) -> Option<Self::Item> {
        if self.iteration > self.iteration_count {
            return None;
        }

        let day = CalendarDay {
            window: DateWindow::day(self.cursor),
            iteration: self.iteration,
            starts_iteration: self.days_into_iteration == 0,
        };

        self.cursor = day.window.end;
        self.days_into_iteration += 1;

        if self.iteration_complete() {
            self.iteration += 1;
            self.days_into_iteration = 0;
        }

        Some(day)
    }
}

impl std::iter::FusedIterator for CalendarIterator {}
