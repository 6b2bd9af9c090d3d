//! Per-invocation application context

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::authn::token_mngr::TokenManager;
use crate::errors::CliError;
use crate::http::client::HttpClient;
use crate::http::projects::PlatformApi;
use crate::status::events::EventSink;
use crate::status::fetcher::{RetryingFetcher, StatusFetcher};
use crate::status::poller::PollerOptions;
use crate::storage::settings::Settings;

/// Everything a command needs, built once per invocation
pub struct AppContext {
    pub settings: Settings,

    /// Account the command targets
    pub account_id: u64,

    pub http_client: Arc<HttpClient>,
    pub token_mngr: Arc<TokenManager>,
    pub sink: Arc<dyn EventSink>,
}

impl AppContext {
    /// Build a context for `account` (id or name), or the default account
    pub fn new(
        settings: Settings,
        account: Option<&str>,
        token_mngr: TokenManager,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, CliError> {
        let account_id = resolve_account(&settings, account)?;
        let http_client = Arc::new(HttpClient::new(&settings.api.base_url)?);
        debug!("Targeting account {} at {}", account_id, http_client.base_url());

        Ok(Self {
            settings,
            account_id,
            http_client,
            token_mngr: Arc::new(token_mngr),
            sink,
        })
    }

    pub fn platform_api(&self) -> PlatformApi {
        PlatformApi::new(self.http_client.clone(), self.token_mngr.clone())
    }

    pub fn poller_options(&self) -> PollerOptions {
        PollerOptions {
            interval: Duration::from_millis(self.settings.polling.interval_ms),
        }
    }

    /// Build and deploy status fetchers, wrapped with the configured retries
    pub fn status_fetchers(&self) -> (Arc<dyn StatusFetcher>, Arc<dyn StatusFetcher>) {
        let api = self.platform_api();
        let retries = self.settings.polling.fetch_retries;
        (
            Arc::new(RetryingFetcher::new(api.build_fetcher(), retries)),
            Arc::new(RetryingFetcher::new(api.deploy_fetcher(), retries)),
        )
    }

    pub fn project_detail_url(&self, project_name: &str) -> String {
        self.settings
            .api
            .project_detail_url(self.account_id, project_name)
    }
}

/// Resolve the target account from `--account` or the configured default
///
/// A numeric value is accepted even when the account is not configured, so a
/// token from the environment can be used with it.
pub fn resolve_account(settings: &Settings, account: Option<&str>) -> Result<u64, CliError> {
    match account {
        Some(value) => {
            if let Some(configured) = settings.find_account(value) {
                return Ok(configured.account_id);
            }
            value.parse::<u64>().map_err(|_| {
                CliError::ConfigError(format!("Account '{}' is not configured", value))
            })
        }
        None => settings.default_account.ok_or_else(|| {
            CliError::ConfigError(
                "No account specified. Pass --account or set default_account in the config file."
                    .to_string(),
            )
        }),
    }
}
