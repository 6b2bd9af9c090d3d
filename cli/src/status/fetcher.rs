//! Task status fetchers

use async_trait::async_trait;
use tracing::warn;

use crate::errors::CliError;
use crate::models::task::{TaskKind, TaskSnapshot};
use crate::utils::{calc_exp_backoff, CooldownOptions};

/// Identifies the task a fetcher reports on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTarget {
    pub account_id: u64,

    /// Project the task belongs to
    pub task_name: String,

    pub task_id: String,

    /// Build the task correlates with; set when polling a deploy
    pub build_id: Option<String>,
}

/// Source of task status snapshots, bound to one task kind
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    fn kind(&self) -> TaskKind;

    async fn fetch_status(&self, target: &PollTarget) -> Result<TaskSnapshot, CliError>;
}

/// Retries retryable failures of an inner fetcher with exponential backoff
///
/// Client errors (4xx other than 429) are returned on the first attempt.
pub struct RetryingFetcher<F> {
    inner: F,
    retries: u32,
    cooldown: CooldownOptions,
}

impl<F: StatusFetcher> RetryingFetcher<F> {
    pub fn new(inner: F, retries: u32) -> Self {
        Self {
            inner,
            retries,
            cooldown: CooldownOptions::default(),
        }
    }

    pub fn with_cooldown(mut self, cooldown: CooldownOptions) -> Self {
        self.cooldown = cooldown;
        self
    }
}

#[async_trait]
impl<F: StatusFetcher> StatusFetcher for RetryingFetcher<F> {
    fn kind(&self) -> TaskKind {
        self.inner.kind()
    }

    async fn fetch_status(&self, target: &PollTarget) -> Result<TaskSnapshot, CliError> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch_status(target).await {
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    let delay = calc_exp_backoff(&self.cooldown, attempt);
                    attempt += 1;
                    warn!(
                        "Fetching {} status for #{} failed (attempt {}), retrying in {:?}: {}",
                        self.inner.kind(),
                        target.task_id,
                        attempt,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}
