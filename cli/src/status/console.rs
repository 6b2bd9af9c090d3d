//! Line-oriented terminal rendering of UI events

use colored::Colorize;

use crate::models::task::TaskStatus;
use crate::status::events::{EventSink, MessageLevel, UiEvent};

/// Prints UI events to the terminal
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    /// Render an event to a printable line, or `None` for silent events
    pub fn render(&self, event: &UiEvent) -> Option<String> {
        match event {
            UiEvent::TaskBegun {
                kind,
                task_name,
                build_id,
                subtask_count,
                ..
            } => {
                let mut text = kind
                    .profile()
                    .initialize_text(&task_name.bold().to_string(), *subtask_count);
                if let Some(build_id) = build_id {
                    text = format!("{}(build #{})\n", text, build_id);
                }
                Some(text)
            }
            UiEvent::SubtaskQueued {
                kind,
                name,
                task_id,
            } => Some(format!(
                "  {} {} #{} {}",
                "○".dimmed(),
                name.bold(),
                task_id,
                kind.profile().status_text(TaskStatus::Enqueued)
            )),
            UiEvent::SubtaskTransition {
                kind,
                name,
                status,
                task_id,
            } => {
                let marker = match status {
                    TaskStatus::Success => "✔".green(),
                    TaskStatus::Failure | TaskStatus::Error | TaskStatus::Reverted => "✖".red(),
                    _ => "›".cyan(),
                };
                Some(format!(
                    "  {} {} #{} {}",
                    marker,
                    name.bold(),
                    task_id,
                    kind.profile().status_text(*status)
                ))
            }
            UiEvent::SubtaskRemoved { .. } => None,
            UiEvent::TaskSucceeded { kind, task_name, .. } => Some(format!(
                "{} {}",
                "✔".green(),
                kind.profile().success_text(&task_name.bold().to_string())
            )),
            UiEvent::TaskFailed { kind, task_name, .. } => Some(format!(
                "{} {}",
                "✖".red(),
                kind.profile().fail_text(&task_name.bold().to_string())
            )),
            UiEvent::UploadStarted {
                project,
                account_id,
            } => Some(format!(
                "Uploading {} project files to {}",
                project.bold(),
                account_id.to_string().bold()
            )),
            UiEvent::UploadSucceeded {
                project,
                account_id,
                ..
            } => Some(format!(
                "{} Uploaded {} project files to {}",
                "✔".green(),
                project.bold(),
                account_id.to_string().bold()
            )),
            UiEvent::UploadFailed {
                project,
                account_id,
            } => Some(format!(
                "{} Failed to upload {} project files to {}",
                "✖".red(),
                project.bold(),
                account_id.to_string().bold()
            )),
            UiEvent::Warning { header, lines } => {
                let mut text = format!("\n{} {}", "[WARNING]".yellow().bold(), header);
                for line in lines {
                    text.push_str("\n  ");
                    text.push_str(line);
                }
                Some(text)
            }
            UiEvent::Message { level, text } => Some(match level {
                MessageLevel::Info => text.clone(),
                MessageLevel::Success => text.green().to_string(),
                MessageLevel::Warn => text.yellow().to_string(),
                MessageLevel::Error => text.red().to_string(),
            }),
        }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: UiEvent) {
        if let Some(line) = self.render(&event) {
            match event {
                UiEvent::Message {
                    level: MessageLevel::Error,
                    ..
                } => eprintln!("{}", line),
                _ => println!("{}", line),
            }
        }
    }
}
