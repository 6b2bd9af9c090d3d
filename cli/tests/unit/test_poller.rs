//! Task status poller tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use deckhand::errors::{ApiError, CliError};
use deckhand::models::task::{TaskKind, TaskSnapshot, TaskStatus};
use deckhand::status::events::UiEvent;
use deckhand::status::fetcher::{PollTarget, StatusFetcher};
use deckhand::status::poller::{PollerOptions, TaskStatusPoller};

use crate::support::{snapshot, RecordingSink, ScriptedFetcher};

fn target() -> PollTarget {
    PollTarget {
        account_id: 42,
        task_name: "demo".to_string(),
        task_id: "7".to_string(),
        build_id: None,
    }
}

fn poller(fetcher: Arc<ScriptedFetcher>, sink: Arc<RecordingSink>) -> TaskStatusPoller {
    TaskStatusPoller::new(fetcher, sink, PollerOptions::default())
}

fn subtask_events(events: &[UiEvent], subtask: &str) -> Vec<UiEvent> {
    events
        .iter()
        .filter(|e| match e {
            UiEvent::SubtaskQueued { name, .. }
            | UiEvent::SubtaskTransition { name, .. }
            | UiEvent::SubtaskRemoved { name, .. } => name == subtask,
            _ => false,
        })
        .cloned()
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_one_event_per_distinct_status() {
    use TaskStatus::*;
    let fetcher = Arc::new(ScriptedFetcher::new(
        TaskKind::Build,
        vec![
            Ok(snapshot(TaskKind::Build, "7", Enqueued, &[("app", Enqueued)])),
            Ok(snapshot(TaskKind::Build, "7", Building, &[("app", Building)])),
            Ok(snapshot(TaskKind::Build, "7", Building, &[("app", Building)])),
            Ok(snapshot(TaskKind::Build, "7", Success, &[("app", Success)])),
        ],
    ));
    let sink = Arc::new(RecordingSink::default());

    let result = poller(fetcher.clone(), sink.clone()).poll(&target()).await.unwrap();
    assert_eq!(result.status, Success);
    assert_eq!(fetcher.calls(), 4);

    let events = sink.events();
    let app = subtask_events(&events, "app");
    assert_eq!(
        app,
        vec![
            UiEvent::SubtaskQueued {
                kind: TaskKind::Build,
                name: "app".to_string(),
                task_id: "7".to_string(),
            },
            UiEvent::SubtaskTransition {
                kind: TaskKind::Build,
                name: "app".to_string(),
                status: Building,
                task_id: "7".to_string(),
            },
            UiEvent::SubtaskTransition {
                kind: TaskKind::Build,
                name: "app".to_string(),
                status: Success,
                task_id: "7".to_string(),
            },
            UiEvent::SubtaskRemoved {
                kind: TaskKind::Build,
                name: "app".to_string(),
            },
        ]
    );

    assert!(matches!(events.first(), Some(UiEvent::TaskBegun { subtask_count: 1, .. })));
    assert!(matches!(events.last(), Some(UiEvent::TaskSucceeded { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_removals_precede_overall_failure() {
    use TaskStatus::*;
    let fetcher = Arc::new(ScriptedFetcher::new(
        TaskKind::Build,
        vec![
            Ok(snapshot(TaskKind::Build, "7", Enqueued, &[("a", Enqueued), ("b", Enqueued)])),
            Ok(snapshot(TaskKind::Build, "7", Failure, &[("a", Success), ("b", Failure)])),
        ],
    ));
    let sink = Arc::new(RecordingSink::default());

    let result = poller(fetcher, sink.clone()).poll(&target()).await.unwrap();
    assert_eq!(result.status, Failure);

    let events = sink.events();
    let removed: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, UiEvent::SubtaskRemoved { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(removed.len(), 2);

    let failed = events
        .iter()
        .position(|e| matches!(e, UiEvent::TaskFailed { status: Failure, .. }))
        .unwrap();
    assert!(removed.iter().all(|i| *i < failed));
    assert_eq!(failed, events.len() - 1);
}

#[tokio::test(start_paused = true)]
async fn test_resolves_once_terminal() {
    use TaskStatus::*;
    let fetcher = Arc::new(ScriptedFetcher::new(
        TaskKind::Build,
        vec![
            Ok(snapshot(TaskKind::Build, "7", Building, &[])),
            Ok(snapshot(TaskKind::Build, "7", Success, &[])),
            Ok(snapshot(TaskKind::Build, "7", Success, &[])),
        ],
    ));
    let sink = Arc::new(RecordingSink::default());

    poller(fetcher.clone(), sink.clone()).poll(&target()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(fetcher.calls(), 2);
    let overall = sink
        .events()
        .iter()
        .filter(|e| matches!(e, UiEvent::TaskSucceeded { .. } | UiEvent::TaskFailed { .. }))
        .count();
    assert_eq!(overall, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_ends_session() {
    use TaskStatus::*;
    let fetcher = Arc::new(ScriptedFetcher::new(
        TaskKind::Build,
        vec![
            Ok(snapshot(TaskKind::Build, "7", Building, &[("app", Building)])),
            Err(CliError::Api(ApiError::new(500, "boom"))),
            Ok(snapshot(TaskKind::Build, "7", Success, &[("app", Success)])),
        ],
    ));
    let sink = Arc::new(RecordingSink::default());

    let err = poller(fetcher.clone(), sink.clone())
        .poll(&target())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(500));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(fetcher.calls(), 2);
    assert!(!sink
        .events()
        .iter()
        .any(|e| matches!(e, UiEvent::TaskSucceeded { .. } | UiEvent::TaskFailed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_deploy_statuses_are_terminal_for_deploys() {
    use TaskStatus::*;
    let fetcher = Arc::new(ScriptedFetcher::new(
        TaskKind::Deploy,
        vec![
            Ok(snapshot(TaskKind::Deploy, "9", Deploying, &[("app", Deploying)])),
            Ok(snapshot(TaskKind::Deploy, "9", Reverted, &[("app", Failure)])),
        ],
    ));
    let sink = Arc::new(RecordingSink::default());

    let result = poller(fetcher, sink.clone()).poll(&target()).await.unwrap();
    assert_eq!(result.status, Reverted);
    assert!(matches!(
        sink.events().last(),
        Some(UiEvent::TaskFailed {
            kind: TaskKind::Deploy,
            status: Reverted,
            ..
        })
    ));
}

/// Fetcher taking longer than the poll interval to answer
struct SlowFetcher {
    delay: Duration,
    script: Mutex<Vec<TaskSnapshot>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl StatusFetcher for SlowFetcher {
    fn kind(&self) -> TaskKind {
        TaskKind::Build
    }

    async fn fetch_status(&self, _target: &PollTarget) -> Result<TaskSnapshot, CliError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.script.lock().unwrap().remove(0))
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetches_never_overlap() {
    use TaskStatus::*;
    let fetcher = Arc::new(SlowFetcher {
        delay: Duration::from_secs(5),
        script: Mutex::new(vec![
            snapshot(TaskKind::Build, "7", Enqueued, &[("app", Enqueued)]),
            snapshot(TaskKind::Build, "7", Building, &[("app", Building)]),
            snapshot(TaskKind::Build, "7", Building, &[("app", Building)]),
            snapshot(TaskKind::Build, "7", Success, &[("app", Success)]),
        ]),
        in_flight: AtomicUsize::new(0),
        max_in_flight: AtomicUsize::new(0),
        calls: AtomicUsize::new(0),
    });
    let sink = Arc::new(RecordingSink::default());

    let result = TaskStatusPoller::new(fetcher.clone(), sink, PollerOptions::default())
        .poll(&target())
        .await
        .unwrap();

    assert_eq!(result.status, Success);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    assert_eq!(fetcher.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_still_polls() {
    use TaskStatus::*;
    let fetcher = Arc::new(ScriptedFetcher::new(
        TaskKind::Build,
        vec![
            Ok(snapshot(TaskKind::Build, "7", Building, &[("app", Building)])),
            Ok(snapshot(TaskKind::Build, "7", Success, &[("app", Success)])),
        ],
    ));
    let sink = Arc::new(RecordingSink::default());
    let options = PollerOptions {
        interval: Duration::ZERO,
    };

    let result = TaskStatusPoller::new(fetcher.clone(), sink, options)
        .poll(&target())
        .await
        .unwrap();
    assert_eq!(result.status, Success);
    assert_eq!(fetcher.calls(), 2);
}
