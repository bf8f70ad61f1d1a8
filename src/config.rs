use crate::error::{AppError, Result};
use crate::reporting::Granularity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// PagerDuty API configuration
    #[validate(nested)]
    pub pagerduty: PagerDutyConfig,

    /// Pagination and pacing
    #[validate(nested)]
    pub pagination: PaginationConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("PDREPORT_CONFIG").unwrap_or_else(|_| "pdreport.toml".to_string());
        Self::load_from(Some(&config_path), None)
    }

    /// Load from the embedded defaults, an optional config file and the
    /// environment. `env` replaces the process environment when given.
    pub fn load_from(
        config_path: Option<&str>,
        env: Option<HashMap<String, String>>,
    ) -> std::result::Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ));

        // Override with config file if it exists
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder
            // Override with environment variables (prefix: PDREPORT__)
            .add_source(
                config::Environment::with_prefix("PDREPORT")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PagerDutyConfig {
    /// REST API base URL
    #[serde(default = "default_api_url")]
    #[validate(url)]
    pub api_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

impl PagerDutyConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for PagerDutyConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaginationConfig {
    /// Records requested per page
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,

    /// Highest offset the API accepts; pages at or past it are never requested
    #[serde(default = "default_max_offset")]
    #[validate(range(min = 1))]
    pub max_offset: u32,

    /// Pause before every page request (milliseconds)
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
}

impl PaginationConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Same limits without pacing, for scripted sources
    pub fn unthrottled() -> Self {
        Self {
            request_delay_ms: 0,
            ..Default::default()
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_offset: default_max_offset(),
            request_delay_ms: default_request_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// File written when `--output-filename` is not given
    #[serde(default = "default_output_filename")]
    pub default_filename: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_filename: default_output_filename(),
        }
    }
}

/// Credentials and the team/service scope every query is restricted to
#[derive(Clone, Validate)]
pub struct ApiAccess {
    #[validate(length(min = 1, message = "PagerDuty API key cannot be empty"))]
    pub api_key: String,

    pub team_ids: Vec<String>,

    pub service_ids: Vec<String>,
}

impl ApiAccess {
    /// Build from the comma-separated id lists used on the command line
    pub fn new(api_key: impl Into<String>, team_ids: &str, service_ids: &str) -> Self {
        Self {
            api_key: api_key.into(),
            team_ids: split_ids(team_ids),
            service_ids: split_ids(service_ids),
        }
    }
}

impl fmt::Debug for ApiAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiAccess")
            .field("api_key", &"<redacted>")
            .field("team_ids", &self.team_ids)
            .field("service_ids", &self.service_ids)
            .finish()
    }
}

/// Split a comma-separated id list, dropping blank entries
pub fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Options of the `count` report
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CountOptions {
    /// First day of the first iteration
    pub since: DateTime<Utc>,

    /// Length of one iteration
    pub granularity: Granularity,

    /// Number of iterations to report
    #[validate(range(min = 1, message = "iteration count must be at least 1"))]
    pub iteration_count: u32,

    /// Only titles containing this substring are counted
    pub filter: Option<String>,

    /// JSON window file; when set only matching days are counted
    pub include_dates: Option<PathBuf>,

    /// JSON window file; matching days are skipped
    pub exclude_dates: Option<PathBuf>,

    pub output: PathBuf,
}

impl CountOptions {
    pub fn new(since: DateTime<Utc>, granularity: Granularity, iteration_count: u32) -> Self {
        Self {
            since,
            granularity,
            iteration_count,
            filter: None,
            include_dates: None,
            exclude_dates: None,
            output: default_output_filename(),
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = non_empty(Some(filter.into()));
        self
    }

    pub fn with_include_dates(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_dates = Some(path.into());
        self
    }

    pub fn with_exclude_dates(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude_dates = Some(path.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    /// Validate, mapping failures onto the crate error
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

/// Options of the `list` report
#[derive(Debug, Clone, Serialize, Validate)]
#[validate(schema(function = "validate_list_range"))]
pub struct ListOptions {
    pub since: DateTime<Utc>,

    pub until: DateTime<Utc>,

    /// Only titles containing this substring are listed
    pub filter: Option<String>,

    /// Custom detail fields appended as extra columns
    pub custom_fields: Vec<String>,

    /// Pattern applied to every custom field value; group 1 is kept
    pub custom_fields_regex: Option<String>,

    pub output: PathBuf,
}

impl ListOptions {
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            since,
            until,
            filter: None,
            custom_fields: Vec::new(),
            custom_fields_regex: None,
            output: default_output_filename(),
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = non_empty(Some(filter.into()));
        self
    }

    /// Set custom fields from a comma-separated list
    pub fn with_custom_fields(mut self, fields: &str) -> Self {
        self.custom_fields = split_ids(fields);
        self
    }

    pub fn with_custom_fields_regex(mut self, pattern: impl Into<String>) -> Self {
        self.custom_fields_regex = non_empty(Some(pattern.into()));
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

fn validate_list_range(options: &ListOptions) -> std::result::Result<(), ValidationError> {
    if options.since >= options.until {
        let mut err = ValidationError::new("invalid_range");
        err.message = Some("`since` must be earlier than `until`".into());
        return Err(err);
    }
    Ok(())
}

/// Treat empty strings as "not given"
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Reject configurations that would make every request fail
pub fn validate_config(config: &Config) -> Result<()> {
    config
        .validate()
        .map_err(|e| AppError::Configuration(e.to_string()))
}

fn default_api_url() -> String {
    "https://api.pagerduty.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_max_offset() -> u32 {
    10000
}

fn default_request_delay() -> u64 {
    2000
}

fn default_output_filename() -> PathBuf {
    PathBuf::from("output.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn builtin() -> Config {
        Config::load_from(None, Some(HashMap::new())).unwrap()
    }

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_default_config_values() {
        let config = builtin();
        assert_eq!(config.pagerduty.api_url, "https://api.pagerduty.com");
        assert_eq!(config.pagination.page_size, 100);
        assert_eq!(config.pagination.max_offset, 10000);
        assert_eq!(config.pagination.request_delay(), Duration::from_secs(2));
        assert_eq!(config.output.default_filename, PathBuf::from("output.csv"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_page_size_rejected() {
        let mut config = builtin();
        config.pagination.page_size = 500;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_environment_overrides_file_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdreport.toml");
        std::fs::write(
            &path,
            "[pagerduty]\napi_url = \"https://eu.pagerduty.com\"\n\n[pagination]\nrequest_delay_ms = 750\n",
        )
        .unwrap();

        let config = Config::load_from(
            path.to_str(),
            env(&[("PDREPORT__PAGINATION__REQUEST_DELAY_MS", "500")]),
        )
        .unwrap();

        assert_eq!(config.pagerduty.api_url, "https://eu.pagerduty.com");
        assert_eq!(config.pagination.request_delay_ms, 500);
        assert_eq!(config.pagination.max_offset, 10000);
    }

    #[test]
    fn test_malformed_environment_override_is_an_error() {
        let result = Config::load_from(
            None,
            env(&[("PDREPORT__PAGINATION__REQUEST_DELAY_MS", "abc")]),
        );

        let err: AppError = result.unwrap_err().into();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("request_delay_ms"));
    }

    #[test]
    fn test_malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdreport.toml");
        std::fs::write(&path, "[pagination\npage_size = 10\n").unwrap();

        assert!(Config::load_from(path.to_str(), Some(HashMap::new())).is_err());
    }

    #[test]
    fn test_split_ids() {
        assert_eq!(split_ids("PA1, PA2,,PA3 "), vec!["PA1", "PA2", "PA3"]);
        assert!(split_ids("").is_empty());
    }

    #[test]
    fn test_api_access_debug_redacts_key() {
        let access = ApiAccess::new("secret-token", "T1", "S1,S2");
        let debug = format!("{:?}", access);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("S2"));
        assert!(ApiAccess::new("", "T1", "S1").validate().is_err());
    }

    #[test]
    fn test_count_options_validation() {
        let since = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(CountOptions::new(since, Granularity::Week, 1).validated().is_ok());

        let err = CountOptions::new(since, Granularity::Week, 0)
            .validated()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_count_options_empty_filter_is_none() {
        let since = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let options = CountOptions::new(since, Granularity::Day, 1).with_filter("");
        assert!(options.filter.is_none());
    }

    #[test]
    fn test_list_options_validation() {
        let since = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();

        let options = ListOptions::new(since, until).with_custom_fields("host, region");
        assert_eq!(options.custom_fields, vec!["host", "region"]);
        assert!(options.validated().is_ok());

        assert!(ListOptions::new(until, since).validated().is_err());
    }
}
