//! Local dev session pre-flight

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::CliError;
use crate::http::projects::ProjectApi;
use crate::local_dev::reconcile::{reconcile, UploadWarning};
use crate::models::component::Component;
use crate::project::components::find_project_components;
use crate::project::config::Project;
use crate::status::events::{EventSink, UiEvent};

/// Accounts involved in a dev session
#[derive(Debug, Clone, Copy)]
pub struct LocalDevOptions {
    pub target_account: u64,
    pub default_account: Option<u64>,
}

/// Result of the pre-flight checks
#[derive(Debug, Clone, PartialEq)]
pub enum Preflight {
    NoDeployedBuild,
    NoComponents,
    NoRunnableComponents,
    Ready {
        runnable: Vec<Component>,
        warning: Option<UploadWarning>,
    },
}

impl Preflight {
    pub fn is_ready(&self) -> bool {
        matches!(self, Preflight::Ready { .. })
    }
}

/// Checks a project before a local dev session against what is deployed
pub struct LocalDevManager {
    api: Arc<dyn ProjectApi>,
    sink: Arc<dyn EventSink>,
    options: LocalDevOptions,
}

impl LocalDevManager {
    pub fn new(api: Arc<dyn ProjectApi>, sink: Arc<dyn EventSink>, options: LocalDevOptions) -> Self {
        Self { api, sink, options }
    }

    /// Load the deployed build, discover local components and warn about any
    /// runnable component the deployed build lacks
    pub async fn preflight(&self, project: &Project) -> Result<Preflight, CliError> {
        let account_id = self.options.target_account;

        let Some(deployed) = self.api.deployed_build(account_id, project.name()).await? else {
            self.sink.emit(UiEvent::error(format!(
                "There is no deployed build of '{}' in account {}. Run `deckhand project upload` before starting a dev session.",
                project.name(),
                account_id
            )));
            return Ok(Preflight::NoDeployedBuild);
        };
        debug!("Deployed build #{} of {}", deployed.id, project.name());

        let components = find_project_components(&project.source_dir()).await?;
        if components.is_empty() {
            self.sink.emit(UiEvent::error(
                "Unable to find any components in your project to run locally.",
            ));
            return Ok(Preflight::NoComponents);
        }

        let runnable: Vec<Component> = components.into_iter().filter(|c| c.runnable).collect();
        if runnable.is_empty() {
            self.sink.emit(UiEvent::error(
                "Unable to find any runnable components in your project.",
            ));
            return Ok(Preflight::NoRunnableComponents);
        }
        info!("{} runnable components in {}", runnable.len(), project.name());

        let warning = reconcile(
            &runnable,
            &deployed.subtask_names(),
            account_id,
            self.options.default_account,
        );
        if let Some(warning) = &warning {
            self.sink.emit(warning.clone().into_event());
        }

        Ok(Preflight::Ready { runnable, warning })
    }
}
