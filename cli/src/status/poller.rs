//! Task status poller
//!
//! Polls a [`StatusFetcher`] on a fixed interval until the parent task reaches a
//! terminal status. Every subtask status change is reported to the event sink
//! exactly once; unchanged statuses across ticks produce no events.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::errors::CliError;
use crate::models::task::{TaskSnapshot, TaskStatus};
use crate::status::events::{EventSink, UiEvent};
use crate::status::fetcher::{PollTarget, StatusFetcher};
use crate::status::profile::TaskProfile;

/// Default delay between two status fetches
pub const POLLING_DELAY: Duration = Duration::from_millis(2000);

/// Shortest delay the poller accepts; shorter intervals are raised to it
pub const MIN_POLLING_DELAY: Duration = Duration::from_millis(1);

/// Poller options
#[derive(Debug, Clone)]
pub struct PollerOptions {
    /// Polling interval
    pub interval: Duration,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            interval: POLLING_DELAY,
        }
    }
}

/// Subtasks currently displayed as active, with the last status seen for each
#[derive(Debug, Default)]
struct PollSession {
    active: Vec<(String, TaskStatus)>,
}

impl PollSession {
    fn track(&mut self, name: &str, status: TaskStatus) {
        if !self.active.iter().any(|(n, _)| n == name) {
            self.active.push((name.to_string(), status));
        }
    }

    /// Record `status` for `name`; returns true when it differs from the last one seen
    fn observe(&mut self, name: &str, status: TaskStatus) -> bool {
        match self.active.iter_mut().find(|(n, _)| n == name) {
            Some((_, last)) if *last == status => false,
            Some((_, last)) => {
                *last = status;
                true
            }
            None => {
                self.active.push((name.to_string(), status));
                true
            }
        }
    }

    /// Stop tracking every subtask, in the order they were first seen
    fn drain(&mut self) -> Vec<String> {
        self.active.drain(..).map(|(name, _)| name).collect()
    }
}

/// Drives one polling session per call to [`TaskStatusPoller::poll`]
pub struct TaskStatusPoller {
    profile: &'static TaskProfile,
    fetcher: Arc<dyn StatusFetcher>,
    sink: Arc<dyn EventSink>,
    options: PollerOptions,
}

impl TaskStatusPoller {
    /// Create a poller for the task kind the fetcher is bound to
    pub fn new(
        fetcher: Arc<dyn StatusFetcher>,
        sink: Arc<dyn EventSink>,
        options: PollerOptions,
    ) -> Self {
        Self {
            profile: fetcher.kind().profile(),
            fetcher,
            sink,
            options,
        }
    }

    /// Poll until the task is terminal and return its final snapshot
    ///
    /// A failed fetch ends the session with that error. The interval timer is
    /// owned by this future, so no fetch is issued after it returns.
    pub async fn poll(&self, target: &PollTarget) -> Result<TaskSnapshot, CliError> {
        let kind = self.profile.kind;
        let mut session = PollSession::default();

        let initial = self.fetcher.fetch_status(target).await?;
        info!(
            "Polling {} #{} for {} ({} subtasks)",
            kind,
            target.task_id,
            target.task_name,
            initial.subtasks.len()
        );

        self.sink.emit(UiEvent::TaskBegun {
            kind,
            task_name: target.task_name.clone(),
            task_id: target.task_id.clone(),
            build_id: target.build_id.clone(),
            subtask_count: initial.subtasks.len(),
        });

        for subtask in &initial.subtasks {
            session.track(&subtask.name, TaskStatus::Enqueued);
            self.sink.emit(UiEvent::SubtaskQueued {
                kind,
                name: subtask.name.clone(),
                task_id: target.task_id.clone(),
            });
        }

        // Each tick awaits its fetch before the next tick is taken; ticks that
        // elapse while a slow fetch is in flight are skipped rather than queued.
        let period = self.options.interval.max(MIN_POLLING_DELAY);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let snapshot = self.fetcher.fetch_status(target).await?;
            debug!("{} #{} status: {}", kind, target.task_id, snapshot.status);

            for subtask in &snapshot.subtasks {
                if session.observe(&subtask.name, subtask.status) {
                    self.sink.emit(UiEvent::SubtaskTransition {
                        kind,
                        name: subtask.name.clone(),
                        status: subtask.status,
                        task_id: target.task_id.clone(),
                    });
                }
            }

            if self.profile.is_terminal(snapshot.status) {
                for name in session.drain() {
                    self.sink.emit(UiEvent::SubtaskRemoved { kind, name });
                }

                if snapshot.status == TaskStatus::Success {
                    self.sink.emit(UiEvent::TaskSucceeded {
                        kind,
                        task_name: target.task_name.clone(),
                        task_id: target.task_id.clone(),
                    });
                } else {
                    self.sink.emit(UiEvent::TaskFailed {
                        kind,
                        task_name: target.task_name.clone(),
                        task_id: target.task_id.clone(),
                        status: snapshot.status,
                    });
                }

                info!("{} #{} finished with {}", kind, target.task_id, snapshot.status);
                return Ok(snapshot);
            }
        }
    }
}
