use crate::config::{ApiAccess, PagerDutyConfig};
use crate::error::{AppError, Result};
use crate::models::{Alert, AlertList, DateWindow, IncidentPage};
use crate::pagerduty::IncidentSource;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use validator::Validate;

const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";

/// PagerDuty REST API v2 client
#[derive(Clone)]
pub struct PagerDutyClient {
    pub(crate) api_url: String,
    pub(crate) access: ApiAccess,
    pub(crate) client: Client,
}

impl PagerDutyClient {
    /// Create a new client scoped to the given teams and services
    pub fn new(config: &PagerDutyConfig, access: ApiAccess) -> Result<Self> {
        access
            .validate()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        let mut auth = HeaderValue::from_str(&format!("Token token={}", access.api_key))
            .map_err(|_| {
                AppError::Configuration("PagerDuty API key contains invalid characters".to_string())
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V2));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            access,
            client,
        })
    }

    /// Query string of the incidents listing
    pub(crate) fn incident_query(
        &self,
        window: &DateWindow,
        offset: u32,
        limit: u32,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("since", window.since_param()),
            ("until", window.until_param()),
            ("time_zone", "UTC".to_string()),
        ];
        params.extend(
            self.access
                .service_ids
                .iter()
                .map(|id| ("service_ids[]", id.clone())),
        );
        params.extend(
            self.access
                .team_ids
                .iter()
                .map(|id| ("team_ids[]", id.clone())),
        );
        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.api_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "PagerDuty request failed");
                AppError::Network(format!("Failed to reach PagerDuty: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        response.json::<T>().await.map_err(|e| {
            AppError::Serialization(format!("Failed to parse PagerDuty response: {}", e))
        })
    }
}

fn status_error(status: StatusCode, body: String) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppError::Authentication(format!("PagerDuty rejected the API key ({})", status))
        }
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimit,
        _ => AppError::Integration {
            integration_source: "pagerduty".to_string(),
            message: format!("API error ({}): {}", status, body),
        },
    }
}

#[async_trait]
impl IncidentSource for PagerDutyClient {
    async fn fetch_page(&self, window: &DateWindow, offset: u32, limit: u32) -> Result<IncidentPage> {
        debug!(
            since = %window.since_param(),
            until = %window.until_param(),
            offset,
            "Fetching incidents"
        );
        let query = self.incident_query(window, offset, limit);
        self.get_json("incidents", &query).await
    }

    async fn fetch_alerts(&self, incident_id: &str) -> Result<Vec<Alert>> {
        debug!(incident_id, "Fetching incident alerts");
        let list: AlertList = self
            .get_json(&format!("incidents/{}/alerts", incident_id), &[])
            .await?;
        Ok(list.alerts)
    }
}
