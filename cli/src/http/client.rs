//! HTTP client implementation

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::errors::{ApiError, CliError};

/// HTTP client for platform communication
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str) -> Result<Self, CliError> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            CliError::ConfigError(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CliError::ConfigError(format!(
                "Invalid API base URL '{}'",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("deckhand/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL; each segment is percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(
        &self,
        request: RequestBuilder,
        account_id: u64,
        token: &SecretString,
    ) -> RequestBuilder {
        request
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            )
            .query(&[("portalId", account_id)])
    }

    async fn parse<T: DeserializeOwned>(
        method: &str,
        url: &Url,
        response: Response,
    ) -> Result<T, CliError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP {} {} failed: {} - {}", method, url, status, body);
            return Err(ApiError::new(status.as_u16(), body).into());
        }

        let body = response.json().await?;
        Ok(body)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        account_id: u64,
        token: &SecretString,
    ) -> Result<T, CliError> {
        let url = self.endpoint(segments);
        debug!("GET {}", url);

        let request = self.authorized(self.client.get(url.clone()), account_id, token);
        let response = request.send().await?;
        Self::parse("GET", &url, response).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        account_id: u64,
        token: &SecretString,
        body: &B,
    ) -> Result<T, CliError> {
        let url = self.endpoint(segments);
        debug!("POST {}", url);

        let request = self.authorized(self.client.post(url.clone()).json(body), account_id, token);
        let response = request.send().await?;
        Self::parse("POST", &url, response).await
    }

    /// Upload a file as the `file` field of a multipart form
    pub async fn post_file<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        account_id: u64,
        token: &SecretString,
        file_path: &Path,
    ) -> Result<T, CliError> {
        let url = self.endpoint(segments);
        let bytes = tokio::fs::read(file_path).await?;
        debug!("POST {} ({} bytes)", url, bytes.len());

        let part = Part::bytes(bytes)
            .file_name("project.zip")
            .mime_str("application/zip")?;
        let form = Form::new().part("file", part);

        let request = self.authorized(
            self.client.post(url.clone()).multipart(form),
            account_id,
            token,
        );
        let response = request.send().await?;
        Self::parse("POST", &url, response).await
    }
}
