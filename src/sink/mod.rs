pub mod csv;
pub mod sheets;
pub mod sqlite;

use thiserror::Error;

use crate::record::Batch;
use crate::settings::{Settings, SinkKind};

pub use self::csv::CsvSink;
pub use self::sheets::SheetsSink;
pub use self::sqlite::SqliteSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote store returned status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("sink misconfigured: {0}")]
    Config(String),
}

/// Anything that can take a finished batch and keep it.
pub trait Sink {
    /// Short label for log lines.
    fn name(&self) -> String;

    fn append(&self, batch: &Batch) -> Result<(), SinkError>;
}

/// Build the sink selected in settings.
pub fn from_settings(settings: &Settings) -> Result<Box<dyn Sink>, SinkError> {
    let sink: Box<dyn Sink> = match settings.sink {
        SinkKind::Csv => Box::new(CsvSink::new(&settings.csv_path)),
        SinkKind::Sqlite => Box::new(SqliteSink::new(&settings.sqlite_path)),
        SinkKind::Sheets => {
            let id = settings
                .sheet_id
                .clone()
                .ok_or_else(|| SinkError::Config("missing spreadsheet id".into()))?;
            let token = settings
                .sheets_token
                .clone()
                .ok_or_else(|| SinkError::Config("missing access token".into()))?;
            Box::new(SheetsSink::new(id, settings.sheet_range.clone(), token, settings.timeout())?)
        }
    };
    Ok(sink)
}
