//! Upload pipeline tests

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use deckhand::errors::{ApiError, CliError};
use deckhand::models::task::{TaskKind, TaskSnapshot, TaskStatus};
use deckhand::pipeline::orchestrator::{PipelineOrchestrator, PipelineOutcome};
use deckhand::project::archive::ZipArchiver;
use deckhand::project::config::{Project, ProjectConfig};
use deckhand::status::events::UiEvent;
use deckhand::status::poller::PollerOptions;

use crate::support::{snapshot, FakeProjectApi, RecordingSink, ScriptedFetcher};

const ACCOUNT: u64 = 42;

fn project() -> (TempDir, Project) {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("src/app")).unwrap();
    fs::write(temp.path().join("src/app/app.json"), r#"{"name":"AppOne"}"#).unwrap();

    let project = Project {
        config: ProjectConfig {
            name: "demo".to_string(),
            src_dir: "src".to_string(),
        },
        dir: temp.path().to_path_buf(),
    };
    (temp, project)
}

struct Harness {
    api: Arc<FakeProjectApi>,
    build: Arc<ScriptedFetcher>,
    deploy: Arc<ScriptedFetcher>,
    sink: Arc<RecordingSink>,
    orchestrator: PipelineOrchestrator,
}

fn harness(api: FakeProjectApi, builds: Vec<TaskSnapshot>, deploys: Vec<TaskSnapshot>) -> Harness {
    let api = Arc::new(api);
    let build = Arc::new(ScriptedFetcher::new(
        TaskKind::Build,
        builds.into_iter().map(Ok).collect(),
    ));
    let deploy = Arc::new(ScriptedFetcher::new(
        TaskKind::Deploy,
        deploys.into_iter().map(Ok).collect(),
    ));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = PipelineOrchestrator::new(
        api.clone(),
        Arc::new(ZipArchiver),
        build.clone(),
        deploy.clone(),
        sink.clone(),
        PollerOptions::default(),
    );
    Harness {
        api,
        build,
        deploy,
        sink,
        orchestrator,
    }
}

fn three_subtasks(status: TaskStatus, subtask_status: [TaskStatus; 3]) -> TaskSnapshot {
    snapshot(
        TaskKind::Build,
        "12",
        status,
        &[
            ("app", subtask_status[0]),
            ("card-app", subtask_status[1]),
            ("functions", subtask_status[2]),
        ],
    )
}

fn messages(events: &[UiEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            UiEvent::Message { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_successful_build_without_auto_deploy() {
    use TaskStatus::*;
    let (_temp, project) = project();
    let h = harness(
        FakeProjectApi::uploading("12"),
        vec![
            three_subtasks(Enqueued, [Enqueued; 3]),
            three_subtasks(Success, [Success; 3]),
        ],
        vec![],
    );

    let outcome = h.orchestrator.run(ACCOUNT, &project).await.unwrap();
    assert_eq!(
        outcome,
        PipelineOutcome::ReadyToDeploy {
            build_id: "12".to_string()
        }
    );
    assert!(outcome.is_success());
    assert_eq!(h.deploy.calls(), 0);

    let events = h.sink.events();
    assert!(events.iter().any(|e| matches!(e, UiEvent::TaskSucceeded { .. })));
    let messages = messages(&events);
    assert!(!messages.iter().any(|m| m.contains("See below for a summary of errors")));
    assert!(messages.contains(&"Run `deckhand project deploy --build-id 12`".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_failed_build_reports_subtask_and_skips_deploy() {
    use TaskStatus::*;
    let (_temp, project) = project();
    let mut failed = three_subtasks(Failure, [Success, Failure, Success]);
    failed.subtasks[1].error_message = Some("compile error".to_string());
    failed.auto_deploy_enabled = true;
    failed.deploy_locator = Some("loc-123".to_string());

    let h = harness(
        FakeProjectApi::uploading("12"),
        vec![three_subtasks(Building, [Building; 3]), failed],
        vec![],
    );

    let outcome = h.orchestrator.run(ACCOUNT, &project).await.unwrap();
    assert!(!outcome.is_success());
    let PipelineOutcome::BuildFailed { report, .. } = outcome else {
        panic!("expected a failed build");
    };
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "card-app");

    assert_eq!(h.deploy.calls(), 0);
    let events = h.sink.events();
    assert!(events.contains(&UiEvent::error("compile error")));
    assert!(messages(&events)
        .iter()
        .any(|m| m.contains("building card-app")));
}

#[tokio::test(start_paused = true)]
async fn test_auto_deploy_polls_locator_with_build_id() {
    use TaskStatus::*;
    let (_temp, project) = project();
    let mut built = three_subtasks(Success, [Success; 3]);
    built.auto_deploy_enabled = true;
    built.deploy_locator = Some("loc-123".to_string());

    let h = harness(
        FakeProjectApi::uploading("12"),
        vec![three_subtasks(Building, [Building; 3]), built],
        vec![
            snapshot(TaskKind::Deploy, "loc-123", Deploying, &[("app", Deploying)]),
            snapshot(TaskKind::Deploy, "loc-123", Success, &[("app", Success)]),
        ],
    );

    let outcome = h.orchestrator.run(ACCOUNT, &project).await.unwrap();
    assert!(outcome.is_success());
    assert!(matches!(outcome, PipelineOutcome::Deployed { .. }));

    let targets = h.deploy.targets();
    assert!(!targets.is_empty());
    assert!(targets
        .iter()
        .all(|t| t.task_id == "loc-123" && t.build_id.as_deref() == Some("12")));
    assert!(h.api.deploys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_upload_not_found_is_project_not_found() {
    let (_temp, project) = project();
    let h = harness(
        FakeProjectApi::failing_upload(CliError::Api(ApiError::new(404, "not found"))),
        vec![],
        vec![],
    );

    let err = h.orchestrator.run(ACCOUNT, &project).await.unwrap_err();
    assert!(matches!(err, CliError::ProjectNotFound { .. }));
    assert!(err.to_string().starts_with("Project 'demo' does not exist"));
    assert_eq!(h.build.calls(), 0);
    assert!(!h
        .sink
        .events()
        .iter()
        .any(|e| matches!(e, UiEvent::UploadFailed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_upload_failure_carries_context() {
    let (_temp, project) = project();
    let h = harness(
        FakeProjectApi::failing_upload(CliError::Api(ApiError::new(500, "down"))),
        vec![],
        vec![],
    );

    let err = h.orchestrator.run(ACCOUNT, &project).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("demo"));
    assert!(message.contains("42"));
    assert!(message.contains("500"));
    assert_eq!(h.build.calls(), 0);
    assert!(h
        .sink
        .events()
        .contains(&UiEvent::UploadFailed {
            project: "demo".to_string(),
            account_id: ACCOUNT,
        }));
}

#[tokio::test(start_paused = true)]
async fn test_archive_released_after_run() {
    use TaskStatus::*;
    let (_temp, project) = project();
    let h = harness(
        FakeProjectApi::uploading("12"),
        vec![
            three_subtasks(Building, [Building; 3]),
            three_subtasks(Failure, [Failure; 3]),
        ],
        vec![],
    );

    h.orchestrator.run(ACCOUNT, &project).await.unwrap();

    let uploads = h.api.uploads();
    assert_eq!(uploads.len(), 1);
    let (path, existed) = &uploads[0];
    assert!(existed);
    assert!(!path.exists());
}

#[tokio::test(start_paused = true)]
async fn test_missing_project_stops_before_upload() {
    let (_temp, project) = project();
    let mut api = FakeProjectApi::uploading("12");
    api.exists = false;
    let h = harness(api, vec![], vec![]);

    let err = h.orchestrator.run(ACCOUNT, &project).await.unwrap_err();
    assert!(matches!(err, CliError::ProjectNotFound { .. }));
    assert!(h.api.uploads().is_empty());
    assert!(h.sink.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_manual_deploy_requests_and_polls_deploy() {
    use TaskStatus::*;
    let h = harness(
        FakeProjectApi::uploading("12"),
        vec![],
        vec![
            snapshot(TaskKind::Deploy, "deploy-12", Deploying, &[]),
            snapshot(TaskKind::Deploy, "deploy-12", Success, &[]),
        ],
    );

    let deploy = h.orchestrator.deploy_build(ACCOUNT, "demo", "12").await.unwrap();
    assert_eq!(deploy.status, Success);
    assert_eq!(h.api.deploys(), vec!["12".to_string()]);
    assert_eq!(h.deploy.targets()[0].task_id, "deploy-12");
}
