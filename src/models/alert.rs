use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An alert attached to an incident, from `incidents/{id}/alerts`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub body: Option<AlertBody>,
}

/// Alert body; `details` holds the custom details sent with the event
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlertBody {
    #[serde(default)]
    pub details: Value,
}

/// Response envelope of the alerts endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertList {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl Alert {
    /// Custom details of this alert, `Null` when the body is missing
    pub fn details(&self) -> &Value {
        static NULL: Value = Value::Null;
        self.body.as_ref().map(|b| &b.details).unwrap_or(&NULL)
    }
}

/// Custom details of the first alert whose summary equals `title`
///
/// Returns `Null` when no alert matches.
pub fn details_for_title(alerts: &[Alert], title: &str) -> Value {
    alerts
        .iter()
        .find(|alert| alert.summary == title)
        .map(|alert| alert.details().clone())
        .unwrap_or(Value::Null)
}

/// Look up a dotted path (`a.b.0.c`) inside a JSON value
///
/// Numeric segments index into arrays. A segment that does not resolve
/// yields `None`, as does an explicit `null` at the end of the path.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(direct) = value.as_object().and_then(|obj| obj.get(path)) {
        return Some(direct).filter(|v| !v.is_null());
    }

    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current).filter(|v| !v.is_null())
}
