//! Flat incident listing, one CSV row per incident

use crate::error::{AppError, Result};
use crate::models::{lookup_path, Incident};
use regex::Regex;
use serde_json::Value;

/// Fixed leading columns of the listing
pub const BASE_COLUMNS: [&str; 5] = [
    "title",
    "urgency",
    "created_at",
    "last_status_change_at",
    "html_url",
];

/// Value used when a custom field cannot be resolved
pub const UNKNOWN: &str = "unknown";

/// Resolves configured custom detail fields from an alert's details
#[derive(Debug, Clone)]
pub struct CustomFieldExtractor {
    fields: Vec<String>,
    pattern: Option<Regex>,
}

impl CustomFieldExtractor {
    /// Compiles `pattern` up front; an invalid pattern is a configuration error
    pub fn new(fields: Vec<String>, pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .filter(|p| !p.is_empty())
            .map(Regex::new)
            .transpose()?;
        Ok(Self { fields, pattern })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// No custom fields configured, so no detail lookup is needed
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// One sanitized cell per configured field
    pub fn extract(&self, details: &Value) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| {
                let raw = raw_value(details, field);
                let value = match &self.pattern {
                    Some(pattern) => first_group(pattern, &raw),
                    None => raw,
                };
                sanitize(&value)
            })
            .collect()
    }
}

fn raw_value(details: &Value, field: &str) -> String {
    match lookup_path(details, field) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => UNKNOWN.to_string(),
    }
}

fn first_group(pattern: &Regex, raw: &str) -> String {
    pattern
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|group| group.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Strip line breaks and double embedded quotes
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect::<String>()
        .replace('"', "\"\"")
}

/// Accumulates listing rows into an in-memory CSV document.
///
/// Cells are written unquoted; custom values are made safe by [`sanitize`].
pub struct FlatReport {
    writer: csv::Writer<Vec<u8>>,
    columns: usize,
    rows: usize,
}

impl FlatReport {
    /// Start a report whose header carries one extra column per custom field
    pub fn new(custom_fields: &[String]) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(Vec::new());

        let header: Vec<&str> = BASE_COLUMNS
            .iter()
            .copied()
            .chain(custom_fields.iter().map(String::as_str))
            .collect();
        writer.write_record(&header)?;

        Ok(Self {
            writer,
            columns: header.len(),
            rows: 0,
        })
    }

    pub fn push_row(&mut self, incident: &Incident, custom_values: &[String]) -> Result<()> {
        let record: Vec<&str> = [
            incident.trimmed_title(),
            incident.urgency.as_str(),
            incident.created_at.as_str(),
            incident.last_status_change_at.as_str(),
            incident.html_url.as_str(),
        ]
        .into_iter()
        .chain(custom_values.iter().map(String::as_str))
        .collect();

        if record.len() != self.columns {
            return Err(AppError::Export(format!(
                "row has {} cells, header has {}",
                record.len(),
                self.columns
            )));
        }

        self.writer.write_record(&record)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(self) -> Result<String> {
        let bytes = self
            .writer
            .into_inner()
            .map_err(|e| AppError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))
    }
}
