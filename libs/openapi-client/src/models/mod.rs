//! API models

use serde::{Deserialize, Serialize};

/// Project as returned by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub deployed_build_id: Option<u64>,
    #[serde(default)]
    pub latest_build_id: Option<u64>,
}

/// Create project request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

/// Upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub build_id: u64,
}

/// Deploy request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub build_id: u64,
}

/// Deploy response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployResponse {
    pub id: String,
}

/// Locator of the deploy task chained after an auto-deployed build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLocator {
    pub id: String,
    #[serde(default)]
    pub links: serde_json::Value,
}

/// Build status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatusResponse {
    #[serde(default)]
    pub build_id: Option<u64>,
    pub status: String,
    #[serde(default)]
    pub subbuild_statuses: Vec<SubbuildStatus>,
    #[serde(default)]
    pub is_auto_deploy_enabled: bool,
    #[serde(default)]
    pub deploy_status_task_locator: Option<TaskLocator>,
}

/// Status of one component build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubbuildStatus {
    pub build_name: String,
    #[serde(default)]
    pub build_type: Option<String>,
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Deploy status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployStatusResponse {
    #[serde(default)]
    pub deploy_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub subdeploy_statuses: Vec<SubdeployStatus>,
}

/// Status of one component deploy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubdeployStatus {
    pub deploy_name: String,
    #[serde(default)]
    pub deploy_type: Option<String>,
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}
