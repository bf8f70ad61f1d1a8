//! Report file output

use crate::error::{AppError, Result};
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Writes rendered reports to disk
pub struct ReportExporter;

impl ReportExporter {
    /// Write `contents` to `output_path`, replacing any existing file
    pub async fn write_csv(contents: &str, output_path: &Path) -> Result<usize> {
        fs::write(output_path, contents.as_bytes()).await.map_err(|e| {
            AppError::Export(format!(
                "Failed to write {}: {}",
                output_path.display(),
                e
            ))
        })?;

        info!(
            path = %output_path.display(),
            bytes = contents.len(),
            "Saved report"
        );
        Ok(contents.len())
    }
}
