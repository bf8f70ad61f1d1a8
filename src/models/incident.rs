use serde::{Deserialize, Serialize};

/// An incident as returned by the PagerDuty incidents endpoint
///
/// Only `title` is needed for occurrence counting; the remaining fields feed
/// the flat listing and default to empty when the API omits them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    /// PagerDuty incident identifier
    #[serde(default)]
    pub id: String,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// Urgency (`high` / `low`)
    #[serde(default)]
    pub urgency: String,

    /// Creation timestamp, kept verbatim
    #[serde(default)]
    pub created_at: String,

    /// Last status change timestamp, kept verbatim
    #[serde(default)]
    pub last_status_change_at: String,

    /// Link to the incident in the PagerDuty web UI
    #[serde(default)]
    pub html_url: String,
}

impl Incident {
    /// Create an incident carrying only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Title with surrounding whitespace removed
    pub fn trimmed_title(&self) -> &str {
        self.title.trim()
    }
}

/// One page of the incidents listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IncidentPage {
    #[serde(default)]
    pub incidents: Vec<Incident>,

    /// Continuation flag
    #[serde(default)]
    pub more: bool,
}
