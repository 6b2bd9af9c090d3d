//! UI events emitted by the poller, the pipeline and the reconciler

use crate::models::task::{TaskKind, TaskStatus};

/// Severity of a free-form message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warn,
    Error,
}

/// A structured event for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Subtasks of a task are known
    TaskBegun {
        kind: TaskKind,
        task_name: String,
        task_id: String,
        build_id: Option<String>,
        subtask_count: usize,
    },

    /// A subtask was present when polling started
    SubtaskQueued {
        kind: TaskKind,
        name: String,
        task_id: String,
    },

    /// A subtask reported a status different from the last one seen
    SubtaskTransition {
        kind: TaskKind,
        name: String,
        status: TaskStatus,
        task_id: String,
    },

    /// A subtask is no longer actively displayed
    SubtaskRemoved { kind: TaskKind, name: String },

    TaskSucceeded {
        kind: TaskKind,
        task_name: String,
        task_id: String,
    },

    TaskFailed {
        kind: TaskKind,
        task_name: String,
        task_id: String,
        status: TaskStatus,
    },

    UploadStarted { project: String, account_id: u64 },

    UploadSucceeded {
        project: String,
        account_id: u64,
        build_id: String,
    },

    UploadFailed { project: String, account_id: u64 },

    /// One aggregated warning with follow-up lines
    Warning { header: String, lines: Vec<String> },

    Message { level: MessageLevel, text: String },
}

impl UiEvent {
    pub fn info(text: impl Into<String>) -> Self {
        UiEvent::Message {
            level: MessageLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        UiEvent::Message {
            level: MessageLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        UiEvent::Message {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }
}

/// Consumer of UI events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: UiEvent);
}
