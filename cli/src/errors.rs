//! Error types for deckhand

use std::fmt;

use thiserror::Error;

/// Main error type for deckhand
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Project '{project}' does not exist. Try running 'deckhand project init' first.")]
    ProjectNotFound { project: String, account_id: u64 },

    #[error("Project config error: {0}")]
    ProjectConfig(String),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Ignore rules error: {0}")]
    IgnoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// HTTP status code of an API error, if this is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CliError::Api(e) => Some(e.status),
            _ => None,
        }
    }

    /// Attach request context to an API error; other errors are returned unchanged
    pub fn with_api_context(self, account_id: u64, project_name: &str) -> Self {
        match self {
            CliError::Api(e) => CliError::Api(e.with_context(ApiErrorContext {
                account_id: Some(account_id),
                project_name: Some(project_name.to_string()),
            })),
            other => other,
        }
    }

    /// Whether asking again may succeed: transport failures, throttling and
    /// server-side errors
    pub fn is_retryable(&self) -> bool {
        match self {
            CliError::HttpError(_) => true,
            CliError::Api(e) => e.status == 429 || e.status >= 500,
            _ => false,
        }
    }
}

/// Account and project the failed request was made for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorContext {
    pub account_id: Option<u64>,
    pub project_name: Option<String>,
}

/// A non-success response from the platform API
#[derive(Error, Debug, Clone)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub context: ApiErrorContext,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            context: ApiErrorContext::default(),
        }
    }

    pub fn with_context(mut self, context: ApiErrorContext) -> Self {
        self.context = context;
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The request")?;
        if let Some(project) = &self.context.project_name {
            write!(f, " for project '{}'", project)?;
        }
        if let Some(account_id) = self.context.account_id {
            write!(f, " in account {}", account_id)?;
        }
        write!(f, " failed with status {}", self.status)?;
        if !self.message.trim().is_empty() {
            write!(f, ": {}", self.message.trim())?;
        }
        Ok(())
    }
}
