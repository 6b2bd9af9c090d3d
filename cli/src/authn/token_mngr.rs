//! Token manager for account authentication

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::CliError;
use crate::storage::settings::AccountSettings;

/// Environment variable overriding the configured access token
pub const ACCESS_TOKEN_ENV: &str = "DECKHAND_ACCESS_TOKEN";

/// Token manager trait for testability
#[async_trait]
pub trait TokenManagerExt: Send + Sync {
    /// Get the access token for an account
    async fn get_token(&self, account_id: u64) -> Result<Arc<SecretString>, CliError>;
}

/// Resolves and caches one access token per account
///
/// Lives as long as the [`AppContext`](crate::app::context::AppContext) that
/// owns it; nothing is shared across invocations.
pub struct TokenManager {
    accounts: Vec<AccountSettings>,
    env_override: Option<String>,
    cached_tokens: RwLock<HashMap<u64, Arc<SecretString>>>,
}

impl TokenManager {
    /// Create a new token manager
    pub fn new(accounts: Vec<AccountSettings>, env_override: Option<String>) -> Self {
        Self {
            accounts,
            env_override: env_override.filter(|t| !t.trim().is_empty()),
            cached_tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Create a token manager honoring [`ACCESS_TOKEN_ENV`]
    pub fn from_env(accounts: Vec<AccountSettings>) -> Self {
        Self::new(accounts, std::env::var(ACCESS_TOKEN_ENV).ok())
    }

    fn resolve(&self, account_id: u64) -> Result<SecretString, CliError> {
        if let Some(token) = &self.env_override {
            debug!("Using access token from {} for account {}", ACCESS_TOKEN_ENV, account_id);
            return Ok(SecretString::from(token.clone()));
        }

        self.accounts
            .iter()
            .find(|a| a.account_id == account_id)
            .and_then(|a| a.access_token.clone())
            .map(SecretString::from)
            .ok_or_else(|| {
                CliError::AuthError(format!(
                    "No access token configured for account {}. Add one to the config file or set {}.",
                    account_id, ACCESS_TOKEN_ENV
                ))
            })
    }
}

#[async_trait]
impl TokenManagerExt for TokenManager {
    async fn get_token(&self, account_id: u64) -> Result<Arc<SecretString>, CliError> {
        // Try to get from cache first
        {
            let cached = self.cached_tokens.read().await;
            if let Some(token) = cached.get(&account_id) {
                return Ok(token.clone());
            }
        }

        let token = Arc::new(self.resolve(account_id)?);
        let mut cached = self.cached_tokens.write().await;
        cached.insert(account_id, token.clone());
        Ok(token)
    }
}
