//! Sparse title × iteration occurrence counts

use crate::reporting::calendar::{CalendarDay, Granularity};
use std::collections::HashMap;

const OPEN_BRACKET: &str = "[";
const CLOSE_BRACKET: &str = "]";
const OPEN_PLACEHOLDER: &str = "||--";
const CLOSE_PLACEHOLDER: &str = "--||";

/// Key a title is stored under: brackets escaped, whitespace trimmed.
///
/// Titles that differ only by a bracket versus its placeholder text share a
/// key; the first-seen spelling is the one reported.
pub fn normalize_title(title: &str) -> String {
    title
        .replace(OPEN_BRACKET, OPEN_PLACEHOLDER)
        .replace(CLOSE_BRACKET, CLOSE_PLACEHOLDER)
        .trim()
        .to_string()
}

/// Case-sensitive substring filter; `None` accepts every title
pub fn title_matches(title: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |needle| title.contains(needle))
}

/// Title → iteration → count, keyed by [`normalize_title`].
///
/// The trimmed title is kept as first seen, so output never depends on
/// reversing the key escape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IterationCounts {
    titles: Vec<String>,
    counts: HashMap<String, HashMap<u32, u64>>,
}

impl IterationCounts {
    /// Add one occurrence of `title` in `iteration`
    pub fn increment(&mut self, title: &str, iteration: u32) {
        let key = normalize_title(title);
        if !self.counts.contains_key(&key) {
            self.titles.push(title.trim().to_string());
        }
        *self
            .counts
            .entry(key)
            .or_default()
            .entry(iteration)
            .or_insert(0) += 1;
    }

    /// Recorded count, 0 when absent
    pub fn get(&self, title: &str, iteration: u32) -> u64 {
        self.counts
            .get(&normalize_title(title))
            .and_then(|per_iteration| per_iteration.get(&iteration))
            .copied()
            .unwrap_or(0)
    }

    /// Titles in first-seen order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Everything the pivot serializer needs once the calendar is exhausted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationState {
    pub counts: IterationCounts,
    pub header_labels: Vec<String>,
    pub current_iteration: u32,
    pub days_into_current_iteration: u32,
}

impl AggregationState {
    pub fn count_for(&self, title: &str, iteration: u32) -> u64 {
        self.counts.get(title, iteration)
    }
}

/// Folds fetched incident titles into [`AggregationState`]
#[derive(Debug, Clone)]
pub struct PivotAggregator {
    granularity: Granularity,
    filter: Option<String>,
    state: AggregationState,
}

impl PivotAggregator {
    pub fn new(granularity: Granularity, filter: Option<String>) -> Self {
        Self {
            granularity,
            filter: filter.filter(|f| !f.is_empty()),
            state: AggregationState::default(),
        }
    }

    /// Track calendar progress; opens a new header column on the first day
    /// of each iteration
    pub fn enter_day(&mut self, day: &CalendarDay) {
        if day.starts_iteration {
            self.state
                .header_labels
                .push(self.granularity.label(day.window.start));
            self.state.days_into_current_iteration = 0;
        }
        self.state.current_iteration = day.iteration;
        self.state.days_into_current_iteration += 1;
    }

    /// Count one occurrence of `title` in `iteration`. Returns false when the
    /// title filter rejected it.
    pub fn record(&mut self, title: &str, iteration: u32) -> bool {
        if !title_matches(title.trim(), self.filter.as_deref()) {
            return false;
        }
        self.state.counts.increment(title, iteration);
        true
    }

    pub fn finish(self) -> AggregationState {
        self.state
    }
}
