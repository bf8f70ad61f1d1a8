//! Shared helpers for report integration tests
//!
//! [`ScriptedSource`] replays queued pages in call order and records every
//! request it receives.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pdreport::models::{Alert, AlertBody, DateWindow, Incident, IncidentPage};
use pdreport::pagerduty::IncidentSource;
use pdreport::{AppError, Result};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

enum Step {
    Page(IncidentPage),
    Fail(String),
}

/// In-memory incident source driven by a script of responses
#[derive(Default)]
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    page_calls: Mutex<Vec<(DateWindow, u32)>>,
    alerts: HashMap<String, Vec<Alert>>,
    failing_alerts: Vec<String>,
    alert_calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one page of incidents with the given titles
    pub fn page(self, titles: &[&str], more: bool) -> Self {
        let incidents = titles.iter().map(|t| Incident::titled(*t)).collect();
        self.incidents(incidents, more)
    }

    /// Queue one page of fully populated incidents
    pub fn incidents(self, incidents: Vec<Incident>, more: bool) -> Self {
        self.steps
            .lock()
            .unwrap()
            .push_back(Step::Page(IncidentPage { incidents, more }));
        self
    }

    /// Queue a failing page request
    pub fn failure(self, message: &str) -> Self {
        self.steps
            .lock()
            .unwrap()
            .push_back(Step::Fail(message.to_string()));
        self
    }

    /// Alerts returned for `incident_id`
    pub fn alerts(mut self, incident_id: &str, alerts: Vec<Alert>) -> Self {
        self.alerts.insert(incident_id.to_string(), alerts);
        self
    }

    /// Alert lookups for `incident_id` fail
    pub fn failing_alerts(mut self, incident_id: &str) -> Self {
        self.failing_alerts.push(incident_id.to_string());
        self
    }

    pub fn page_calls(&self) -> Vec<(DateWindow, u32)> {
        self.page_calls.lock().unwrap().clone()
    }

    pub fn alert_calls(&self) -> Vec<String> {
        self.alert_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IncidentSource for ScriptedSource {
    async fn fetch_page(&self, window: &DateWindow, offset: u32, _limit: u32) -> Result<IncidentPage> {
        self.page_calls.lock().unwrap().push((*window, offset));
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Page(page)) => Ok(page),
            Some(Step::Fail(message)) => Err(AppError::Network(message)),
            None => Ok(IncidentPage::default()),
        }
    }

    async fn fetch_alerts(&self, incident_id: &str) -> Result<Vec<Alert>> {
        self.alert_calls.lock().unwrap().push(incident_id.to_string());
        if self.failing_alerts.iter().any(|id| id == incident_id) {
            return Err(AppError::Integration {
                integration_source: "pagerduty".to_string(),
                message: "API error (500 Internal Server Error)".to_string(),
            });
        }
        Ok(self.alerts.get(incident_id).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn alert(summary: &str, details: Value) -> Alert {
    Alert {
        summary: summary.to_string(),
        body: Some(AlertBody { details }),
    }
}

/// Write a JSON window file into `dir`
pub fn window_file(dir: &std::path::Path, name: &str, windows: &[(&str, &str)]) -> std::path::PathBuf {
    let entries: Vec<Value> = windows
        .iter()
        .map(|(start, end)| serde_json::json!({ "start": start, "end": end }))
        .collect();
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();
    path
}
