//! Project, build and deploy API client

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use openapi_client::models::{
    BuildStatusResponse, CreateProjectRequest, DeployRequest, DeployResponse,
    DeployStatusResponse, ProjectResponse, UploadResponse,
};
use secrecy::SecretString;
use tracing::debug;

use crate::authn::token_mngr::TokenManagerExt;
use crate::errors::CliError;
use crate::http::client::HttpClient;
use crate::models::task::{build_snapshot, deploy_snapshot, TaskKind, TaskSnapshot};
use crate::status::fetcher::{PollTarget, StatusFetcher};

/// Remote project operations used by the commands
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// Fail with [`CliError::ProjectNotFound`] unless the project exists
    async fn ensure_exists(&self, account_id: u64, project_name: &str) -> Result<(), CliError>;

    async fn create_project(&self, account_id: u64, project_name: &str) -> Result<(), CliError>;

    /// Upload a project archive and return the id of the build it started
    async fn upload(
        &self,
        account_id: u64,
        project_name: &str,
        archive_path: &Path,
    ) -> Result<String, CliError>;

    /// Request a deploy of a build and return the deploy id
    async fn deploy(
        &self,
        account_id: u64,
        project_name: &str,
        build_id: &str,
    ) -> Result<String, CliError>;

    /// Status of the most recently deployed build, if any
    async fn deployed_build(
        &self,
        account_id: u64,
        project_name: &str,
    ) -> Result<Option<TaskSnapshot>, CliError>;
}

impl HttpClient {
    /// Fetch a project by name
    pub async fn fetch_project(
        &self,
        account_id: u64,
        token: &SecretString,
        project_name: &str,
    ) -> Result<ProjectResponse, CliError> {
        self.get(&["dfs", "v1", "projects", project_name], account_id, token)
            .await
    }

    /// Get the status of a build
    pub async fn get_build_status(
        &self,
        account_id: u64,
        token: &SecretString,
        project_name: &str,
        build_id: &str,
    ) -> Result<BuildStatusResponse, CliError> {
        self.get(
            &[
                "dfs",
                "v1",
                "builds",
                "by-project-name",
                project_name,
                "builds",
                build_id,
                "status",
            ],
            account_id,
            token,
        )
        .await
    }

    /// Get the status of a deploy
    pub async fn get_deploy_status(
        &self,
        account_id: u64,
        token: &SecretString,
        project_name: &str,
        deploy_id: &str,
    ) -> Result<DeployStatusResponse, CliError> {
        self.get(
            &[
                "dfs",
                "v1",
                "deploys",
                "by-project-name",
                project_name,
                "deploys",
                deploy_id,
                "status",
            ],
            account_id,
            token,
        )
        .await
    }
}

/// Platform API bound to an HTTP client and a token manager
#[derive(Clone)]
pub struct PlatformApi {
    http_client: Arc<HttpClient>,
    token_mngr: Arc<dyn TokenManagerExt>,
}

impl PlatformApi {
    pub fn new(http_client: Arc<HttpClient>, token_mngr: Arc<dyn TokenManagerExt>) -> Self {
        Self {
            http_client,
            token_mngr,
        }
    }

    /// Status fetcher for builds
    pub fn build_fetcher(&self) -> BuildStatusFetcher {
        BuildStatusFetcher { api: self.clone() }
    }

    /// Status fetcher for deploys
    pub fn deploy_fetcher(&self) -> DeployStatusFetcher {
        DeployStatusFetcher { api: self.clone() }
    }
}

fn parse_build_id(build_id: &str) -> Result<u64, CliError> {
    build_id
        .parse()
        .map_err(|_| CliError::ConfigError(format!("Invalid build id '{}'", build_id)))
}

#[async_trait]
impl ProjectApi for PlatformApi {
    async fn ensure_exists(&self, account_id: u64, project_name: &str) -> Result<(), CliError> {
        let token = self.token_mngr.get_token(account_id).await?;
        match self
            .http_client
            .fetch_project(account_id, &token, project_name)
            .await
        {
            Ok(project) => {
                debug!("Found project {} ({:?})", project.name, project.id);
                Ok(())
            }
            Err(e) if e.status_code() == Some(404) => Err(CliError::ProjectNotFound {
                project: project_name.to_string(),
                account_id,
            }),
            Err(e) => Err(e.with_api_context(account_id, project_name)),
        }
    }

    async fn create_project(&self, account_id: u64, project_name: &str) -> Result<(), CliError> {
        let token = self.token_mngr.get_token(account_id).await?;
        let body = CreateProjectRequest {
            name: project_name.to_string(),
        };
        let _: serde_json::Value = self
            .http_client
            .post(&["dfs", "v1", "projects"], account_id, &token, &body)
            .await
            .map_err(|e| e.with_api_context(account_id, project_name))?;
        Ok(())
    }

    async fn upload(
        &self,
        account_id: u64,
        project_name: &str,
        archive_path: &Path,
    ) -> Result<String, CliError> {
        let token = self.token_mngr.get_token(account_id).await?;
        let response: UploadResponse = self
            .http_client
            .post_file(
                &["dfs", "v1", "projects", "upload", project_name],
                account_id,
                &token,
                archive_path,
            )
            .await?;
        Ok(response.build_id.to_string())
    }

    async fn deploy(
        &self,
        account_id: u64,
        project_name: &str,
        build_id: &str,
    ) -> Result<String, CliError> {
        let token = self.token_mngr.get_token(account_id).await?;
        let body = DeployRequest {
            build_id: parse_build_id(build_id)?,
        };
        let response: DeployResponse = self
            .http_client
            .post(
                &["dfs", "v1", "deploys", "by-project-name", project_name],
                account_id,
                &token,
                &body,
            )
            .await
            .map_err(|e| e.with_api_context(account_id, project_name))?;
        Ok(response.id)
    }

    async fn deployed_build(
        &self,
        account_id: u64,
        project_name: &str,
    ) -> Result<Option<TaskSnapshot>, CliError> {
        let token = self.token_mngr.get_token(account_id).await?;
        let project = match self
            .http_client
            .fetch_project(account_id, &token, project_name)
            .await
        {
            Ok(project) => project,
            Err(e) if e.status_code() == Some(404) => {
                return Err(CliError::ProjectNotFound {
                    project: project_name.to_string(),
                    account_id,
                })
            }
            Err(e) => return Err(e.with_api_context(account_id, project_name)),
        };

        let Some(build_id) = project.deployed_build_id.map(|id| id.to_string()) else {
            return Ok(None);
        };

        let status = self
            .http_client
            .get_build_status(account_id, &token, project_name, &build_id)
            .await
            .map_err(|e| e.with_api_context(account_id, project_name))?;
        Ok(Some(build_snapshot(&build_id, status)))
    }
}

/// Fetches build status snapshots
pub struct BuildStatusFetcher {
    api: PlatformApi,
}

#[async_trait]
impl StatusFetcher for BuildStatusFetcher {
    fn kind(&self) -> TaskKind {
        TaskKind::Build
    }

    async fn fetch_status(&self, target: &PollTarget) -> Result<TaskSnapshot, CliError> {
        let token = self.api.token_mngr.get_token(target.account_id).await?;
        let response = self
            .api
            .http_client
            .get_build_status(target.account_id, &token, &target.task_name, &target.task_id)
            .await
            .map_err(|e| e.with_api_context(target.account_id, &target.task_name))?;
        Ok(build_snapshot(&target.task_id, response))
    }
}

/// Fetches deploy status snapshots
pub struct DeployStatusFetcher {
    api: PlatformApi,
}

#[async_trait]
impl StatusFetcher for DeployStatusFetcher {
    fn kind(&self) -> TaskKind {
        TaskKind::Deploy
    }

    async fn fetch_status(&self, target: &PollTarget) -> Result<TaskSnapshot, CliError> {
        let token = self.api.token_mngr.get_token(target.account_id).await?;
        let response = self
            .api
            .http_client
            .get_deploy_status(target.account_id, &token, &target.task_name, &target.task_id)
            .await
            .map_err(|e| e.with_api_context(target.account_id, &target.task_name))?;
        Ok(deploy_snapshot(&target.task_id, response))
    }
}
