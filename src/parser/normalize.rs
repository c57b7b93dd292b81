use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::fields::ParsedFields;
use crate::record::{Batch, TrainRecord};

const MINUTES_MARKER: &str = "мин.";

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Delay text to whole minutes. Anything unreadable counts as on time.
pub fn delay_minutes(text: &str) -> u32 {
    let cleaned = text.replace(MINUTES_MARKER, "").replace('+', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "-" {
        return 0;
    }
    DIGITS_RE
        .find(cleaned)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

pub fn to_record(fields: &ParsedFields, captured_at: DateTime<Utc>) -> Option<TrainRecord> {
    TrainRecord::new(&fields.train_id, delay_minutes(&fields.delay_text), captured_at)
}

/// Keep the first record per train id, in input order.
pub fn dedupe_by_train(records: Vec<TrainRecord>) -> Batch {
    let mut seen = HashSet::new();
    let unique = records
        .into_iter()
        .filter(|r| seen.insert(r.train_id().to_string()))
        .collect();
    Batch::from_unique(unique)
}
