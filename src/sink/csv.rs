use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::{Sink, SinkError};
use crate::record::Batch;

const HEADER: [&str; 3] = ["train", "delay_min", "scraped_at"];

/// Append-only CSV file. The header goes in once, when the file is new.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        CsvSink { path: path.as_ref().to_path_buf() }
    }
}

impl Sink for CsvSink {
    fn name(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn append(&self, batch: &Batch) -> Result<(), SinkError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let fresh = file.metadata()?.len() == 0;
        let mut w = BufWriter::new(file);

        if fresh {
            write_row(&mut w, &HEADER)?;
        }
        for r in batch {
            let delay = r.delay_minutes().to_string();
            let at = r.captured_at_text();
            write_row(&mut w, &[r.train_id(), delay.as_str(), at.as_str()])?;
        }
        w.flush()?;

        info!("Appended {} rows to {}", batch.len(), self.path.display());
        Ok(())
    }
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(mut w: W, row: &[&str]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalize::dedupe_by_train;
    use crate::record::TrainRecord;
    use chrono::{TimeZone, Utc};

    fn batch(rows: &[(&str, u32)]) -> Batch {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 0).unwrap();
        dedupe_by_train(rows.iter().map(|(id, d)| TrainRecord::new(id, *d, at).unwrap()).collect())
    }

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delays.csv");
        let sink = CsvSink::new(&path);

        sink.append(&batch(&[("8601", 3), ("2612", 0)])).unwrap();
        sink.append(&batch(&[("3621", 15)])).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "train,delay_min,scraped_at\n\
             8601,3,2024-03-01T08:15:00Z\n\
             2612,0,2024-03-01T08:15:00Z\n\
             3621,15,2024-03-01T08:15:00Z\n"
        );
    }

    #[test]
    fn creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("nested").join("delays.csv");
        CsvSink::new(&path).append(&batch(&[])).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "train,delay_min,scraped_at\n");
    }

    #[test]
    fn quotes_awkward_fields() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["a,b", "say \"hi\"", "plain"]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\"a,b\",\"say \"\"hi\"\"\",plain\n");
    }
}
