use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_URL: &str = "https://live.bdz.bg/bg/sofia/arrivals";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
const ENV_PREFIX: &str = "BDZ";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Csv,
    Sqlite,
    Sheets,
}

#[derive(Clone, Deserialize)]
pub struct Settings {
    pub url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub sink: SinkKind,
    pub csv_path: PathBuf,
    pub sqlite_path: PathBuf,
    #[serde(default)]
    pub sheet_id: Option<String>,
    pub sheet_range: String,
    #[serde(default)]
    pub sheets_token: Option<String>,
}

/// Values given on the command line; they beat the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub sink: Option<SinkKind>,
    /// Path for file sinks, spreadsheet id for the sheets sink.
    pub dest: Option<String>,
}

impl Settings {
    /// Defaults, then `BDZ_*` environment variables, then CLI overrides.
    pub fn load(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_env(Environment::with_prefix(ENV_PREFIX), overrides)
    }

    fn from_env(env: Environment, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut settings: Settings = Config::builder()
            .set_default("url", DEFAULT_URL)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("timeout_secs", 30)?
            .set_default("sink", "csv")?
            .set_default("csv_path", "train_punctuality_all.csv")?
            .set_default("sqlite_path", "data/train_delays.sqlite")?
            .set_default("sheet_range", "Sheet1!A:C")?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.apply(overrides);
        settings.validate()?;
        Ok(settings)
    }

    fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.url {
            self.url = url;
        }
        if let Some(sink) = overrides.sink {
            self.sink = sink;
        }
        if let Some(dest) = overrides.dest {
            match self.sink {
                SinkKind::Csv => self.csv_path = PathBuf::from(dest),
                SinkKind::Sqlite => self.sqlite_path = PathBuf::from(dest),
                SinkKind::Sheets => self.sheet_id = Some(dest),
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Invalid("url must not be empty".into()));
        }
        if self.sink == SinkKind::Sheets {
            if self.sheet_id.as_deref().map_or(true, |s| s.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "sheets sink needs a spreadsheet id (BDZ_SHEET_ID or --dest)".into(),
                ));
            }
            if self.sheets_token.as_deref().map_or(true, |s| s.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "sheets sink needs an access token in BDZ_SHEETS_TOKEN".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[cfg(test)]
    pub(crate) fn from_map(vars: &[(&str, &str)], overrides: Overrides) -> Result<Self, ConfigError> {
        let map: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from_env(Environment::with_prefix(ENV_PREFIX).source(Some(map)), overrides)
    }
}

// Token stays out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("url", &self.url)
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .field("sink", &self.sink)
            .field("csv_path", &self.csv_path)
            .field("sqlite_path", &self.sqlite_path)
            .field("sheet_id", &self.sheet_id)
            .field("sheet_range", &self.sheet_range)
            .field("sheets_token", &self.sheets_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
