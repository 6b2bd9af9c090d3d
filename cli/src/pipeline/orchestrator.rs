//! Upload pipeline: package, upload, poll the build, then poll the deploy when
//! the platform chains one

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::CliError;
use crate::http::projects::ProjectApi;
use crate::models::task::{TaskSnapshot, TaskStatus};
use crate::pipeline::report::BuildFailureReport;
use crate::project::archive::Archiver;
use crate::project::config::Project;
use crate::project::ignore::IgnoreRules;
use crate::status::events::{EventSink, UiEvent};
use crate::status::fetcher::{PollTarget, StatusFetcher};
use crate::status::poller::{PollerOptions, TaskStatusPoller};

const SEPARATOR_WIDTH: usize = 50;

/// How an upload ended, once the build reached a terminal status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The build failed; nothing was deployed
    BuildFailed {
        build_id: String,
        report: BuildFailureReport,
    },

    /// The build succeeded and the platform deployed it automatically
    Deployed {
        build_id: String,
        deploy: TaskSnapshot,
    },

    /// The build succeeded and waits for a manual deploy
    ReadyToDeploy { build_id: String },
}

impl PipelineOutcome {
    pub fn build_id(&self) -> &str {
        match self {
            PipelineOutcome::BuildFailed { build_id, .. }
            | PipelineOutcome::Deployed { build_id, .. }
            | PipelineOutcome::ReadyToDeploy { build_id } => build_id,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            PipelineOutcome::BuildFailed { .. } => false,
            PipelineOutcome::Deployed { deploy, .. } => deploy.status == TaskStatus::Success,
            PipelineOutcome::ReadyToDeploy { .. } => true,
        }
    }
}

/// Sequences one upload invocation
pub struct PipelineOrchestrator {
    api: Arc<dyn ProjectApi>,
    archiver: Arc<dyn Archiver>,
    build_poller: TaskStatusPoller,
    deploy_poller: TaskStatusPoller,
    sink: Arc<dyn EventSink>,
}

impl PipelineOrchestrator {
    pub fn new(
        api: Arc<dyn ProjectApi>,
        archiver: Arc<dyn Archiver>,
        build_fetcher: Arc<dyn StatusFetcher>,
        deploy_fetcher: Arc<dyn StatusFetcher>,
        sink: Arc<dyn EventSink>,
        poller_options: PollerOptions,
    ) -> Self {
        Self {
            api,
            archiver,
            build_poller: TaskStatusPoller::new(build_fetcher, sink.clone(), poller_options.clone()),
            deploy_poller: TaskStatusPoller::new(deploy_fetcher, sink.clone(), poller_options),
            sink,
        }
    }

    /// Package and upload `project`, then follow its build (and deploy)
    ///
    /// Errors before the build poll starts abort the run. A failed build is an
    /// outcome, not an error. The temporary archive is released on every path.
    pub async fn run(&self, account_id: u64, project: &Project) -> Result<PipelineOutcome, CliError> {
        self.api.ensure_exists(account_id, project.name()).await?;

        let ignore = IgnoreRules::load(&project.dir)?;
        let archive = self.archiver.archive(&project.source_dir(), &ignore).await?;
        debug!(
            "Packaged {} into {} ({} bytes)",
            project.name(),
            archive.path().display(),
            archive.byte_count()
        );

        let result = self
            .upload_and_track(account_id, project.name(), archive.path())
            .await;

        match archive.release() {
            Ok(path) => debug!("Cleaned up temporary file {}", path.display()),
            Err(e) => warn!("Failed to clean up temporary archive: {}", e),
        }

        result
    }

    /// Request a deploy of an existing build and follow it to a terminal status
    pub async fn deploy_build(
        &self,
        account_id: u64,
        project_name: &str,
        build_id: &str,
    ) -> Result<TaskSnapshot, CliError> {
        self.api.ensure_exists(account_id, project_name).await?;

        let deploy_id = self.api.deploy(account_id, project_name, build_id).await?;
        info!("Deploy #{} started for build #{}", deploy_id, build_id);

        self.deploy_poller
            .poll(&PollTarget {
                account_id,
                task_name: project_name.to_string(),
                task_id: deploy_id,
                build_id: Some(build_id.to_string()),
            })
            .await
    }

    async fn upload(
        &self,
        account_id: u64,
        project_name: &str,
        archive_path: &std::path::Path,
    ) -> Result<String, CliError> {
        self.sink.emit(UiEvent::UploadStarted {
            project: project_name.to_string(),
            account_id,
        });

        match self.api.upload(account_id, project_name, archive_path).await {
            Ok(build_id) => {
                self.sink.emit(UiEvent::UploadSucceeded {
                    project: project_name.to_string(),
                    account_id,
                    build_id: build_id.clone(),
                });
                debug!(
                    "Project \"{}\" uploaded and build #{} created",
                    project_name, build_id
                );
                Ok(build_id)
            }
            Err(e) if e.status_code() == Some(404) => Err(CliError::ProjectNotFound {
                project: project_name.to_string(),
                account_id,
            }),
            Err(e) => {
                self.sink.emit(UiEvent::UploadFailed {
                    project: project_name.to_string(),
                    account_id,
                });
                Err(e.with_api_context(account_id, project_name))
            }
        }
    }

    async fn upload_and_track(
        &self,
        account_id: u64,
        project_name: &str,
        archive_path: &std::path::Path,
    ) -> Result<PipelineOutcome, CliError> {
        let build_id = self.upload(account_id, project_name, archive_path).await?;

        let build = self
            .build_poller
            .poll(&PollTarget {
                account_id,
                task_name: project_name.to_string(),
                task_id: build_id.clone(),
                build_id: None,
            })
            .await?;

        // Deploy chaining is gated on the build itself succeeding, whatever the
        // auto-deploy flag says.
        if build.status != TaskStatus::Success {
            let report = BuildFailureReport::from_snapshot(&build_id, &build);
            for event in report.events() {
                self.sink.emit(event);
            }
            return Ok(PipelineOutcome::BuildFailed { build_id, report });
        }

        match (build.auto_deploy_enabled, build.deploy_locator) {
            (true, Some(locator)) => {
                self.sink.emit(UiEvent::info(format!(
                    "Build #{} succeeded. Automatically deploying to {}",
                    build_id, account_id
                )));

                let deploy = self
                    .deploy_poller
                    .poll(&PollTarget {
                        account_id,
                        task_name: project_name.to_string(),
                        task_id: locator,
                        build_id: Some(build_id.clone()),
                    })
                    .await?;

                Ok(PipelineOutcome::Deployed { build_id, deploy })
            }
            _ => {
                let separator = "-".repeat(SEPARATOR_WIDTH);
                self.sink.emit(UiEvent::info(separator.clone()));
                self.sink
                    .emit(UiEvent::success(format!("Build #{} succeeded\n", build_id)));
                self.sink.emit(UiEvent::info("🚀 Ready to take your project live?"));
                self.sink.emit(UiEvent::info(format!(
                    "Run `deckhand project deploy --build-id {}`",
                    build_id
                )));
                self.sink.emit(UiEvent::info(separator));

                Ok(PipelineOutcome::ReadyToDeploy { build_id })
            }
        }
    }
}
