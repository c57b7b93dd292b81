use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::{json, Value};
use tracing::info;

use super::{Sink, SinkError};
use crate::record::Batch;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

/// Google Sheets target; the whole batch goes in one `values:append` call.
pub struct SheetsSink {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    range: String,
    token: String,
}

impl SheetsSink {
    pub fn new(
        spreadsheet_id: String,
        range: String,
        token: String,
        timeout: Duration,
    ) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(SheetsSink {
            client,
            api_base: SHEETS_API.to_string(),
            spreadsheet_id,
            range,
            token,
        })
    }

    fn append_url(&self) -> Result<Url, SinkError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| SinkError::Config(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SinkError::Config("sheets API url cannot take a path".into()))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}:append", self.range));
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

fn request_body(batch: &Batch) -> Value {
    let values: Vec<Value> = batch
        .iter()
        .map(|r| json!([r.train_id(), r.delay_minutes(), r.captured_at_text()]))
        .collect();
    json!({ "values": values })
}

impl Sink for SheetsSink {
    fn name(&self) -> String {
        format!("sheets:{}", self.spreadsheet_id)
    }

    fn append(&self, batch: &Batch) -> Result<(), SinkError> {
        if batch.is_empty() {
            info!("Nothing to append to spreadsheet {}", self.spreadsheet_id);
            return Ok(());
        }

        let response = self
            .client
            .post(self.append_url()?)
            .bearer_auth(&self.token)
            .json(&request_body(batch))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(SinkError::Remote { status: status.as_u16(), message });
        }

        info!("Appended {} rows to spreadsheet {}", batch.len(), self.spreadsheet_id);
        Ok(())
    }
}
