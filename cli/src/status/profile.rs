//! Per-kind strategy table for task polling
//!
//! Everything that differs between polling a build and polling a deploy lives
//! here, so the poll loop itself never branches on the task kind.

use crate::models::task::{TaskKind, TaskStatus};

/// Labels and terminal states for one task kind
#[derive(Debug)]
pub struct TaskProfile {
    pub kind: TaskKind,

    /// Verb shown while the task runs ("Building")
    pub verb: &'static str,

    /// Past tense shown on success ("Built")
    pub done: &'static str,

    /// Parent statuses after which no further progress happens
    pub terminal: &'static [TaskStatus],
}

pub static BUILD_PROFILE: TaskProfile = TaskProfile {
    kind: TaskKind::Build,
    verb: "Building",
    done: "Built",
    terminal: &[TaskStatus::Success, TaskStatus::Failure],
};

pub static DEPLOY_PROFILE: TaskProfile = TaskProfile {
    kind: TaskKind::Deploy,
    verb: "Deploying",
    done: "Deployed",
    terminal: &[
        TaskStatus::Success,
        TaskStatus::Failure,
        TaskStatus::Reverted,
        TaskStatus::Error,
    ],
};

impl TaskKind {
    pub fn profile(&self) -> &'static TaskProfile {
        match self {
            TaskKind::Build => &BUILD_PROFILE,
            TaskKind::Deploy => &DEPLOY_PROFILE,
        }
    }
}

impl TaskProfile {
    pub fn is_terminal(&self, status: TaskStatus) -> bool {
        self.terminal.contains(&status)
    }

    /// Header shown once the subtasks are known
    pub fn initialize_text(&self, task_name: &str, subtask_count: usize) -> String {
        format!(
            "{} {}\n\nFound {} components in this project ...\n",
            self.verb, task_name, subtask_count
        )
    }

    pub fn success_text(&self, task_name: &str) -> String {
        format!("{} {}", self.done, task_name)
    }

    pub fn fail_text(&self, task_name: &str) -> String {
        format!("Failed to {} {}", self.kind, task_name)
    }

    /// Short description of a subtask status
    pub fn status_text(&self, status: TaskStatus) -> String {
        match status {
            TaskStatus::Enqueued => "is queued".to_string(),
            TaskStatus::Pending => "is pending".to_string(),
            TaskStatus::Building | TaskStatus::Deploying => {
                format!("is {}", self.verb.to_lowercase())
            }
            TaskStatus::Success => format!("{} successfully", self.done.to_lowercase()),
            TaskStatus::Failure => format!("failed to {}", self.kind),
            TaskStatus::Reverted => "was reverted".to_string(),
            TaskStatus::Error => "errored".to_string(),
            TaskStatus::Unknown => "is in an unknown state".to_string(),
        }
    }
}
