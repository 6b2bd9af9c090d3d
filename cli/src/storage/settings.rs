//! Settings file management

use serde::{Deserialize, Serialize};

use crate::errors::CliError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// CLI settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Account used when `--account` is not given
    #[serde(default)]
    pub default_account: Option<u64>,

    /// Configured accounts
    #[serde(default)]
    pub accounts: Vec<AccountSettings>,

    /// Platform API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Status polling configuration
    #[serde(default)]
    pub polling: PollingSettings,
}

impl Settings {
    /// Load settings, falling back to defaults when the file does not exist
    pub async fn load(file: &File) -> Result<Self, CliError> {
        if !file.exists().await {
            return Ok(Self::default());
        }
        file.read_json::<Settings>().await.map_err(|e| {
            CliError::ConfigError(format!(
                "Unable to read settings file {}: {}",
                file.path().display(),
                e
            ))
        })
    }

    /// Find an account by id or by name
    pub fn find_account(&self, id_or_name: &str) -> Option<&AccountSettings> {
        let id = id_or_name.parse::<u64>().ok();
        self.accounts.iter().find(|a| {
            Some(a.account_id) == id || a.name.as_deref() == Some(id_or_name)
        })
    }
}

/// One configured account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSettings {
    pub account_id: u64,

    #[serde(default)]
    pub name: Option<String>,

    /// Access token used as bearer credential
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Platform API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL for the platform API
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Origin of the platform web UI
    #[serde(default = "default_web_origin")]
    pub web_origin: String,
}

fn default_api_url() -> String {
    "https://api.deckhand.dev".to_string()
}

fn default_web_origin() -> String {
    "https://app.deckhand.dev".to_string()
}

impl ApiSettings {
    /// Web page of a project in the platform UI
    pub fn project_detail_url(&self, account_id: u64, project_name: &str) -> String {
        format!(
            "{}/developer-projects/{}/project/{}",
            self.web_origin.trim_end_matches('/'),
            account_id,
            project_name
        )
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            web_origin: default_web_origin(),
        }
    }
}

/// Status polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSettings {
    /// Delay between two status fetches, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Retries for a failed status fetch before the poll session fails
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_fetch_retries() -> u32 {
    2
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            fetch_retries: default_fetch_retries(),
        }
    }
}
