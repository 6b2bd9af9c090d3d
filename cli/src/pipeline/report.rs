//! Build failure reporting

use crate::models::task::TaskSnapshot;
use crate::status::events::UiEvent;

const SEPARATOR_WIDTH: usize = 50;

/// A subtask that finished with FAILURE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSubtask {
    pub name: String,
    pub error_message: Option<String>,
}

/// Summary of a failed build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailureReport {
    pub build_id: String,
    pub failures: Vec<FailedSubtask>,
}

impl BuildFailureReport {
    pub fn from_snapshot(build_id: &str, snapshot: &TaskSnapshot) -> Self {
        Self {
            build_id: build_id.to_string(),
            failures: snapshot
                .failed_subtasks()
                .into_iter()
                .map(|s| FailedSubtask {
                    name: s.name.clone(),
                    error_message: s.error_message.clone(),
                })
                .collect(),
        }
    }

    /// One-line cause: the failed subtask by name, or a count when several failed
    pub fn summary(&self) -> String {
        match self.failures.as_slice() {
            [] => format!("Build #{} failed", self.build_id),
            [only] => format!(
                "Build #{} failed because there was a problem\nbuilding {}",
                self.build_id, only.name
            ),
            many => format!(
                "Build #{} failed because there was a problem\nbuilding {} components",
                self.build_id,
                many.len()
            ),
        }
    }

    /// Events presenting the report
    pub fn events(&self) -> Vec<UiEvent> {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        let mut events = vec![
            UiEvent::info(separator.clone()),
            UiEvent::info(format!("{}\n", self.summary())),
            UiEvent::info("See below for a summary of errors."),
            UiEvent::info(separator),
        ];

        for failure in &self.failures {
            events.push(UiEvent::info(format!(
                "\n--- {} failed to build with the following error ---",
                failure.name
            )));
            events.push(UiEvent::error(
                failure
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "No error message was reported".to_string()),
            ));
        }

        events
    }
}
