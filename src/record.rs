use chrono::{DateTime, SecondsFormat, Utc};

/// One train's delay as seen at capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainRecord {
    train_id: String,
    delay_minutes: u32,
    captured_at: DateTime<Utc>,
}

impl TrainRecord {
    /// Returns `None` for a blank train id.
    pub fn new(train_id: &str, delay_minutes: u32, captured_at: DateTime<Utc>) -> Option<Self> {
        let train_id = train_id.trim();
        if train_id.is_empty() {
            return None;
        }
        Some(TrainRecord {
            train_id: train_id.to_string(),
            delay_minutes,
            captured_at,
        })
    }

    pub fn train_id(&self) -> &str {
        &self.train_id
    }

    pub fn delay_minutes(&self) -> u32 {
        self.delay_minutes
    }

    #[cfg(test)]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// RFC 3339 timestamp as written to every store.
    pub fn captured_at_text(&self) -> String {
        self.captured_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Records from one run, unique by train id, in first-seen page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    records: Vec<TrainRecord>,
}

impl Batch {
    /// Callers must hand over already de-duplicated records.
    pub(crate) fn from_unique(records: Vec<TrainRecord>) -> Self {
        Batch { records }
    }

    #[cfg(test)]
    pub fn records(&self) -> &[TrainRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrainRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a TrainRecord;
    type IntoIter = std::slice::Iter<'a, TrainRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn blank_id_is_refused() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        assert!(TrainRecord::new("", 3, at).is_none());
        assert!(TrainRecord::new("   ", 3, at).is_none());
    }

    #[test]
    fn id_is_trimmed() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let r = TrainRecord::new(" 8601 ", 3, at).unwrap();
        assert_eq!(r.train_id(), "8601");
        assert_eq!(r.captured_at_text(), "2024-03-01T08:00:00Z");
    }
}
