//! Build and deploy task models

use std::fmt;

use openapi_client::models::{BuildStatusResponse, DeployStatusResponse};
use serde::{Deserialize, Serialize};

/// Kind of task tracked by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Build,
    Deploy,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Build => write!(f, "build"),
            TaskKind::Deploy => write!(f, "deploy"),
        }
    }
}

/// Status of a task or subtask
///
/// Builds never report `Reverted`; deploys may.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Enqueued,
    Pending,
    Building,
    Deploying,
    Success,
    Failure,
    Reverted,
    Error,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Enqueued => "ENQUEUED",
            TaskStatus::Pending => "PENDING",
            TaskStatus::Building => "BUILDING",
            TaskStatus::Deploying => "DEPLOYING",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failure => "FAILURE",
            TaskStatus::Reverted => "REVERTED",
            TaskStatus::Error => "ERROR",
            TaskStatus::Unknown => "UNKNOWN",
        }
    }

    /// Parse a wire status, mapping unrecognized values to `Unknown`
    pub fn from_wire(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "ENQUEUED" => TaskStatus::Enqueued,
            "PENDING" => TaskStatus::Pending,
            "BUILDING" => TaskStatus::Building,
            "DEPLOYING" => TaskStatus::Deploying,
            "SUCCESS" => TaskStatus::Success,
            "FAILURE" => TaskStatus::Failure,
            "REVERTED" => TaskStatus::Reverted,
            "ERROR" => TaskStatus::Error,
            _ => TaskStatus::Unknown,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One independently progressing unit of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub name: String,
    pub component_type: Option<String>,
    pub status: TaskStatus,
    pub error_message: Option<String>,
}

/// Point-in-time view of a task and its subtasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub kind: TaskKind,
    pub id: String,
    pub status: TaskStatus,
    pub subtasks: Vec<Subtask>,

    /// Set on builds only
    pub auto_deploy_enabled: bool,

    /// Deploy task the platform started after this build, if any
    pub deploy_locator: Option<String>,
}

impl TaskSnapshot {
    pub fn subtask_names(&self) -> Vec<String> {
        self.subtasks.iter().map(|s| s.name.clone()).collect()
    }

    pub fn failed_subtasks(&self) -> Vec<&Subtask> {
        self.subtasks
            .iter()
            .filter(|s| s.status == TaskStatus::Failure)
            .collect()
    }
}

/// Convert a build status response for the given build id
pub fn build_snapshot(build_id: &str, response: BuildStatusResponse) -> TaskSnapshot {
    TaskSnapshot {
        kind: TaskKind::Build,
        id: response
            .build_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| build_id.to_string()),
        status: TaskStatus::from_wire(&response.status),
        subtasks: response
            .subbuild_statuses
            .into_iter()
            .map(|s| Subtask {
                name: s.build_name,
                component_type: s.build_type,
                status: TaskStatus::from_wire(&s.status),
                error_message: s.error_message,
            })
            .collect(),
        auto_deploy_enabled: response.is_auto_deploy_enabled,
        deploy_locator: response.deploy_status_task_locator.map(|l| l.id),
    }
}

/// Convert a deploy status response for the given deploy id
pub fn deploy_snapshot(deploy_id: &str, response: DeployStatusResponse) -> TaskSnapshot {
    TaskSnapshot {
        kind: TaskKind::Deploy,
        id: response.deploy_id.unwrap_or_else(|| deploy_id.to_string()),
        status: TaskStatus::from_wire(&response.status),
        subtasks: response
            .subdeploy_statuses
            .into_iter()
            .map(|s| Subtask {
                name: s.deploy_name,
                component_type: s.deploy_type,
                status: TaskStatus::from_wire(&s.status),
                error_message: s.error_message,
            })
            .collect(),
        auto_deploy_enabled: false,
        deploy_locator: None,
    }
}
