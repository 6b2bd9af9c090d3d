//! Local/deployed component reconciliation tests

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use deckhand::local_dev::manager::{LocalDevManager, LocalDevOptions, Preflight};
use deckhand::local_dev::reconcile::{find_missing_components, reconcile};
use deckhand::models::component::{Component, ComponentType};
use deckhand::models::task::{TaskKind, TaskStatus};
use deckhand::project::config::{Project, ProjectConfig};
use deckhand::status::events::UiEvent;

use crate::support::{snapshot, FakeProjectApi, RecordingSink};

fn application(name: &str) -> Component {
    Component {
        component_type: ComponentType::Application,
        config: serde_json::json!({ "name": name }),
        path: PathBuf::from("/src/app"),
        cards: Vec::new(),
        runnable: true,
    }
}

#[test]
fn test_missing_application_is_labelled() {
    let missing = find_missing_components(&[application("AppOne")], &["AppTwo".to_string()]);
    assert_eq!(missing, vec!["application: AppOne".to_string()]);
}

#[test]
fn test_single_aggregated_warning() {
    let components = vec![application("AppOne"), application("AppThree")];
    let deployed = vec!["AppTwo".to_string()];

    let warning = reconcile(&components, &deployed, 42, Some(42)).unwrap();
    assert!(warning.header.contains("application: AppOne, application: AppThree"));
    assert_eq!(warning.lines.len(), 3);
}

#[test]
fn test_reconcile_is_pure() {
    let components = vec![application("AppOne")];
    let deployed = vec!["AppTwo".to_string()];

    assert_eq!(
        reconcile(&components, &deployed, 7, Some(42)),
        reconcile(&components, &deployed, 7, Some(42))
    );
}

fn project_with_app(app_json: &str) -> (tempfile::TempDir, Project) {
    let temp = tempfile::tempdir().unwrap();
    let app_dir = temp.path().join("src/app");
    fs::create_dir_all(app_dir.join("cards")).unwrap();
    fs::write(app_dir.join("app.json"), app_json).unwrap();
    fs::write(
        app_dir.join("cards/deals.json"),
        r#"{"data":{"title":"Deals"}}"#,
    )
    .unwrap();

    let project = Project {
        config: ProjectConfig {
            name: "demo".to_string(),
            src_dir: "src".to_string(),
        },
        dir: temp.path().to_path_buf(),
    };
    (temp, project)
}

fn manager(api: FakeProjectApi, sink: Arc<RecordingSink>, target: u64) -> LocalDevManager {
    LocalDevManager::new(
        Arc::new(api),
        sink,
        LocalDevOptions {
            target_account: target,
            default_account: Some(42),
        },
    )
}

#[tokio::test]
async fn test_preflight_warns_once_for_missing_components() {
    let (_temp, project) = project_with_app(
        r#"{"name":"AppOne","extensions":{"crm":{"cards":[{"file":"cards/deals.json"}]}}}"#,
    );
    let deployed = snapshot(
        TaskKind::Build,
        "3",
        TaskStatus::Success,
        &[("AppTwo", TaskStatus::Success)],
    );
    let sink = Arc::new(RecordingSink::default());

    let preflight = manager(FakeProjectApi::with_deployed(Some(deployed)), sink.clone(), 7)
        .preflight(&project)
        .await
        .unwrap();
    assert!(preflight.is_ready());

    let warnings: Vec<UiEvent> = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, UiEvent::Warning { .. }))
        .collect();
    assert_eq!(warnings.len(), 1);
    let UiEvent::Warning { header, lines } = &warnings[0] else {
        unreachable!()
    };
    assert!(header.contains("application: AppOne, card: Deals"));
    assert!(lines.iter().any(|l| l.contains("deckhand project upload --account=7")));
}

#[tokio::test]
async fn test_preflight_up_to_date_has_no_warning() {
    let (_temp, project) = project_with_app(
        r#"{"name":"AppOne","extensions":{"crm":{"cards":[{"file":"cards/deals.json"}]}}}"#,
    );
    let deployed = snapshot(
        TaskKind::Build,
        "3",
        TaskStatus::Success,
        &[("AppOne", TaskStatus::Success), ("Deals", TaskStatus::Success)],
    );
    let sink = Arc::new(RecordingSink::default());

    let preflight = manager(FakeProjectApi::with_deployed(Some(deployed)), sink.clone(), 42)
        .preflight(&project)
        .await
        .unwrap();
    assert!(matches!(preflight, Preflight::Ready { warning: None, .. }));
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_preflight_without_deployed_build() {
    let (_temp, project) = project_with_app(r#"{"name":"AppOne"}"#);
    let sink = Arc::new(RecordingSink::default());

    let preflight = manager(FakeProjectApi::with_deployed(None), sink.clone(), 42)
        .preflight(&project)
        .await
        .unwrap();
    assert_eq!(preflight, Preflight::NoDeployedBuild);
    assert_eq!(sink.events().len(), 1);
}

#[tokio::test]
async fn test_preflight_without_runnable_components() {
    let temp = tempfile::tempdir().unwrap();
    let fn_dir = temp.path().join("src/app.functions");
    fs::create_dir_all(&fn_dir).unwrap();
    fs::write(fn_dir.join("serverless.json"), r#"{"name":"fn"}"#).unwrap();
    let project = Project {
        config: ProjectConfig {
            name: "demo".to_string(),
            src_dir: "src".to_string(),
        },
        dir: temp.path().to_path_buf(),
    };
    let deployed = snapshot(TaskKind::Build, "3", TaskStatus::Success, &[]);
    let sink = Arc::new(RecordingSink::default());

    let preflight = manager(FakeProjectApi::with_deployed(Some(deployed)), sink, 42)
        .preflight(&project)
        .await
        .unwrap();
    assert_eq!(preflight, Preflight::NoRunnableComponents);
}
