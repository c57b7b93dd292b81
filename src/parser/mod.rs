pub mod fields;
pub mod fragments;
pub mod normalize;

use chrono::{DateTime, Utc};
use scraper::Html;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::Batch;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("page body is empty")]
    EmptyInput,

    #[error("no arrival rows found in page ({bytes} bytes)")]
    NoRows { bytes: usize },
}

/// Three-step pipeline: page → rows → fields → de-duplicated batch.
/// Every record carries the same `captured_at`.
pub fn extract_batch(markup: &str, captured_at: DateTime<Utc>) -> Result<Batch, ExtractionError> {
    if markup.trim().is_empty() {
        return Err(ExtractionError::EmptyInput);
    }

    let doc = Html::parse_document(markup);
    let rows = fragments::segment_rows(&doc);
    if rows.is_empty() {
        return Err(ExtractionError::NoRows { bytes: markup.len() });
    }
    info!("Rows found: {}", rows.len());

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for (i, row) in rows.into_iter().enumerate() {
        match fields::parse_fragment(row).and_then(|f| normalize::to_record(&f, captured_at)) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                debug!(row = i, "row has no train number, skipping");
            }
        }
    }

    let parsed = records.len();
    let batch = normalize::dedupe_by_train(records);
    info!(
        "Extracted {} trains ({} rows skipped, {} duplicates dropped)",
        batch.len(),
        skipped,
        parsed - batch.len()
    );
    if batch.is_empty() {
        warn!("Page had rows but no train entries");
    }
    Ok(batch)
}

// ── Tests ──
