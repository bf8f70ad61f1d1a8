//! Include/exclude date windows deciding which days are counted

use crate::error::{AppError, Result};
use crate::models::DateWindow;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;

/// Outcome of evaluating one day against the window lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayDecision {
    Included,
    /// Matched an exclude window
    Excluded,
    /// An include list exists and no window in it matched
    NotIncluded,
}

/// Day filter built from optional exclude and include window lists
#[derive(Debug, Clone, Default)]
pub struct DateFilter {
    exclude: Option<Vec<DateWindow>>,
    include: Option<Vec<DateWindow>>,
}

impl DateFilter {
    pub fn new(exclude: Option<Vec<DateWindow>>, include: Option<Vec<DateWindow>>) -> Self {
        Self { exclude, include }
    }

    /// Load both lists from JSON window files. Any read or parse failure is
    /// a configuration error.
    pub async fn load(exclude: Option<&Path>, include: Option<&Path>) -> Result<Self> {
        let exclude = match exclude {
            Some(path) => Some(load_windows(path).await?),
            None => None,
        };
        let include = match include {
            Some(path) => Some(load_windows(path).await?),
            None => None,
        };
        Ok(Self::new(exclude, include))
    }

    /// Exclusion takes precedence over inclusion
    pub fn evaluate(&self, day: DateTime<Utc>) -> DayDecision {
        if let Some(exclude) = &self.exclude {
            if any_matches(exclude, day) {
                return DayDecision::Excluded;
            }
        }

        match &self.include {
            Some(include) if !any_matches(include, day) => DayDecision::NotIncluded,
            _ => DayDecision::Included,
        }
    }
}

fn any_matches(windows: &[DateWindow], day: DateTime<Utc>) -> bool {
    windows.iter().any(|window| window.matches_day(day))
}

/// Read a JSON array of `{start, end}` windows
pub async fn load_windows(path: &Path) -> Result<Vec<DateWindow>> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::Configuration(format!(
            "failed to read date windows from {}: {}",
            path.display(),
            e
        ))
    })?;

    let windows: Vec<DateWindow> = serde_json::from_str(&raw).map_err(|e| {
        AppError::Configuration(format!(
            "malformed date windows in {}: {}",
            path.display(),
            e
        ))
    })?;

    debug!(path = %path.display(), windows = windows.len(), "Loaded date windows");
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn single_day(y: i32, m: u32, d: u32) -> DateWindow {
        DateWindow::new(
            date(y, m, d),
            Utc.with_ymd_and_hms(y, m, d, 23, 59, 59).unwrap(),
        )
    }

    #[test]
    fn test_no_lists_includes_everything() {
        let filter = DateFilter::default();
        assert_eq!(filter.evaluate(date(2025, 1, 1)), DayDecision::Included);
    }

    #[test]
    fn test_exclude_list() {
        let filter = DateFilter::new(Some(vec![single_day(2025, 1, 2)]), None);
        assert_eq!(filter.evaluate(date(2025, 1, 1)), DayDecision::Included);
        assert_eq!(filter.evaluate(date(2025, 1, 2)), DayDecision::Excluded);
        assert_eq!(filter.evaluate(date(2025, 1, 3)), DayDecision::Included);
    }

    #[test]
    fn test_include_list() {
        let filter = DateFilter::new(None, Some(vec![single_day(2025, 1, 1)]));
        assert_eq!(filter.evaluate(date(2025, 1, 1)), DayDecision::Included);
        assert_eq!(filter.evaluate(date(2025, 1, 2)), DayDecision::NotIncluded);
    }

    #[test]
    fn test_exclusion_wins_over_inclusion() {
        let window = single_day(2025, 1, 5);
        let filter = DateFilter::new(Some(vec![window]), Some(vec![window]));
        assert_eq!(filter.evaluate(date(2025, 1, 5)), DayDecision::Excluded);
    }

    #[test]
    fn test_empty_include_list_excludes_everything() {
        let filter = DateFilter::new(None, Some(Vec::new()));
        assert_eq!(filter.evaluate(date(2025, 1, 5)), DayDecision::NotIncluded);
    }

    #[tokio::test]
    async fn test_load_from_files() {
        let mut exclude = tempfile::NamedTempFile::new().unwrap();
        write!(
            exclude,
            r#"[{{"start": "2025-01-02T00:00:00Z", "end": "2025-01-02T23:59:59Z"}}]"#
        )
        .unwrap();

        let filter = DateFilter::load(Some(exclude.path()), None).await.unwrap();
        assert_eq!(filter.evaluate(date(2025, 1, 2)), DayDecision::Excluded);
        assert_eq!(filter.evaluate(date(2025, 1, 3)), DayDecision::Included);
    }

    #[tokio::test]
    async fn test_malformed_file_is_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"start": "2025-01-02"}}"#).unwrap();

        let err = DateFilter::load(None, Some(file.path())).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_missing_file_is_configuration_error() {
        let err = load_windows(Path::new("/nonexistent/pdreport/windows.json"))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("windows.json"));
    }
}
