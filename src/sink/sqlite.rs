use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::info;

use super::{Sink, SinkError};
use crate::record::Batch;

pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        SqliteSink { path: path.as_ref().to_path_buf() }
    }

    fn connect(&self) -> Result<Connection, SinkError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        init_schema(&conn)?;
        Ok(conn)
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS train_delays (
            id         INTEGER PRIMARY KEY,
            train      TEXT NOT NULL,
            delay_min  INTEGER NOT NULL,
            scraped_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_train_delays_train ON train_delays(train);
        ",
    )
}

impl Sink for SqliteSink {
    fn name(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn append(&self, batch: &Batch) -> Result<(), SinkError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO train_delays (train, delay_min, scraped_at) VALUES (?1, ?2, ?3)",
            )?;
            for r in batch {
                stmt.execute(rusqlite::params![
                    r.train_id(),
                    r.delay_minutes(),
                    r.captured_at_text(),
                ])?;
            }
        }
        tx.commit()?;

        info!("Inserted {} rows into {}", batch.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalize::dedupe_by_train;
    use crate::record::TrainRecord;
    use chrono::{TimeZone, Utc};

    #[test]
    fn rows_accumulate_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("delays.sqlite");
        let sink = SqliteSink::new(&path);

        let first = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        sink.append(&dedupe_by_train(vec![
            TrainRecord::new("8601", 3, first).unwrap(),
            TrainRecord::new("2612", 0, first).unwrap(),
        ]))
        .unwrap();
        sink.append(&dedupe_by_train(vec![TrainRecord::new("8601", 5, second).unwrap()]))
            .unwrap();

        let conn = Connection::open(&path).unwrap();
        let mut stmt = conn
            .prepare("SELECT train, delay_min, scraped_at FROM train_delays ORDER BY id")
            .unwrap();
        let rows: Vec<(String, u32, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                ("8601".to_string(), 3, "2024-03-01T08:00:00Z".to_string()),
                ("2612".to_string(), 0, "2024-03-01T08:00:00Z".to_string()),
                ("8601".to_string(), 5, "2024-03-01T08:30:00Z".to_string()),
            ]
        );
    }
}
