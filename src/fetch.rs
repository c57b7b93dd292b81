use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use thiserror::Error;
use tracing::info;

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { status: u16, url: String },
}

/// GET the arrivals page and return its body. One attempt, no retry.
pub fn fetch_page(settings: &Settings) -> Result<String, FetchError> {
    let client = Client::builder().timeout(settings.timeout()).build()?;
    fetch_with(&client, settings)
}

fn fetch_with(client: &Client, settings: &Settings) -> Result<String, FetchError> {
    info!("Fetching arrivals page: {}", settings.url);
    let response = client
        .get(&settings.url)
        .header(USER_AGENT, &settings.user_agent)
        .send()?;

    let status = response.status();
    info!("Status code: {}", status.as_u16());
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: settings.url.clone(),
        });
    }

    Ok(response.text()?)
}
