//! PagerDuty REST API access
//!
//! [`IncidentSource`] is the seam between the report engine and the remote
//! API: [`PagerDutyClient`] talks HTTP, tests substitute scripted sources.
//! [`IncidentPager`] turns page-at-a-time access into a lazy stream.

pub mod client;
pub mod pager;

pub use client::PagerDutyClient;
pub use pager::IncidentPager;

use crate::error::Result;
use crate::models::{Alert, DateWindow, IncidentPage};
use async_trait::async_trait;
use std::sync::Arc;

/// Paginated source of incidents
#[async_trait]
pub trait IncidentSource: Send + Sync {
    /// Fetch one page of incidents created inside `window`
    async fn fetch_page(&self, window: &DateWindow, offset: u32, limit: u32) -> Result<IncidentPage>;

    /// Fetch the alerts grouped under an incident
    async fn fetch_alerts(&self, incident_id: &str) -> Result<Vec<Alert>>;
}

#[async_trait]
impl<T: IncidentSource + ?Sized> IncidentSource for Arc<T> {
    async fn fetch_page(&self, window: &DateWindow, offset: u32, limit: u32) -> Result<IncidentPage> {
        (**self).fetch_page(window, offset, limit).await
    }

    async fn fetch_alerts(&self, incident_id: &str) -> Result<Vec<Alert>> {
        (**self).fetch_alerts(incident_id).await
    }
}
