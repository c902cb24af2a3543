//! End-to-end conversion: load → extract → sort → write.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::document::load_document;
use crate::extract::extract_records;
use crate::normalize::Diagnostics;
use crate::writer::{column_superset, preview, sort_by_time, write_csv};

/// Rows shown in the console preview after a successful write.
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub output_path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub positions_found: usize,
    pub segments_found: usize,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Written(ConversionSummary),
    /// Nothing to convert; no file was written.
    Empty { diagnostics: Diagnostics },
}

/// Convert the Timeline export at `input` into a CSV at `output`.
///
/// Only an unreadable document or a failed write is an error. Malformed
/// individual records end up as empty cells and are counted in the
/// summary's diagnostics.
pub fn convert(input: &Path, output: &Path) -> Result<ConversionOutcome> {
    if let Ok(cwd) = std::env::current_dir() {
        info!("Current working directory: {}", cwd.display());
    }
    info!("Input JSON file: {}", input.display());
    info!("Output CSV file: {}", output.display());

    let document = load_document(input).context("failed to load Timeline document")?;

    let mut diagnostics = Diagnostics::new();
    let extraction = extract_records(&document, &mut diagnostics);
    drop(document);

    if extraction.records.is_empty() {
        warn!("No location data found to convert, nothing written");
        return Ok(ConversionOutcome::Empty { diagnostics });
    }

    let mut records = extraction.records;
    let columns = column_superset(&records);
    sort_by_time(&mut records);

    write_csv(output, &records, &columns)
        .with_context(|| format!("failed to write CSV to {}", output.display()))?;

    info!("Conversion complete. CSV saved to {}", output.display());
    info!("Number of rows in CSV: {}", records.len());

    match preview(&records, &columns, PREVIEW_ROWS) {
        Ok(text) => info!("First rows of data:\n{text}"),
        Err(e) => warn!("Failed to render preview: {e}"),
    }

    if !diagnostics.is_clean() {
        warn!(
            "{} timestamps and {} coordinates could not be parsed, {} records skipped",
            diagnostics.time_failures(),
            diagnostics.coordinate_failures(),
            diagnostics.skipped_records()
        );
    }

    Ok(ConversionOutcome::Written(ConversionSummary {
        output_path: output.to_path_buf(),
        rows: records.len(),
        columns: columns.len(),
        positions_found: extraction.positions_found,
        segments_found: extraction.segments_found,
        diagnostics,
    }))
}
