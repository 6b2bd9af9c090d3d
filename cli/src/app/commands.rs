//! Command line interface

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::app::context::AppContext;
use crate::errors::CliError;
use crate::filesys::dir::Dir;
use crate::http::projects::ProjectApi;
use crate::local_dev::manager::{LocalDevManager, LocalDevOptions};
use crate::models::task::TaskStatus;
use crate::pipeline::orchestrator::{PipelineOrchestrator, PipelineOutcome};
use crate::project::archive::ZipArchiver;
use crate::project::config::{load_project, write_project_config, ProjectConfig, PROJECT_CONFIG_FILE};
use crate::status::events::UiEvent;
use crate::utils::LONG_VERSION;

#[derive(Debug, Parser)]
#[command(name = "deckhand", version, long_version = LONG_VERSION, about)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "DECKHAND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Target account id or name
    #[arg(long, global = true)]
    pub account: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Work with projects
    #[command(subcommand)]
    Project(ProjectCommand),
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Upload the project, then follow its build and deploy
    Upload(PathArgs),

    /// Deploy an existing build
    Deploy {
        #[command(flatten)]
        path: PathArgs,

        /// Build to deploy
        #[arg(long)]
        build_id: u64,
    },

    /// Check the project before a local dev session
    Dev(PathArgs),

    /// Create a project config and the remote project
    Init {
        /// Project name
        name: String,

        /// Source directory, relative to the project directory
        #[arg(long, default_value = "src")]
        src_dir: String,

        #[command(flatten)]
        path: PathArgs,
    },
}

#[derive(Debug, Args)]
pub struct PathArgs {
    /// Project directory (defaults to the current directory)
    pub path: Option<PathBuf>,
}

impl PathArgs {
    fn resolve(&self) -> Result<PathBuf, CliError> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

/// Run a command and map its result to a process exit code
pub async fn execute(command: Command, ctx: AppContext) -> Result<ExitCode, CliError> {
    match command {
        Command::Project(ProjectCommand::Upload(args)) => upload(&ctx, &args.resolve()?).await,
        Command::Project(ProjectCommand::Deploy { path, build_id }) => {
            deploy(&ctx, &path.resolve()?, build_id).await
        }
        Command::Project(ProjectCommand::Dev(args)) => dev(&ctx, &args.resolve()?).await,
        Command::Project(ProjectCommand::Init {
            name,
            src_dir,
            path,
        }) => init(&ctx, &path.resolve()?, name, src_dir).await,
    }
}

fn orchestrator(ctx: &AppContext) -> PipelineOrchestrator {
    let (build_fetcher, deploy_fetcher) = ctx.status_fetchers();
    PipelineOrchestrator::new(
        Arc::new(ctx.platform_api()),
        Arc::new(ZipArchiver),
        build_fetcher,
        deploy_fetcher,
        ctx.sink.clone(),
        ctx.poller_options(),
    )
}

async fn upload(ctx: &AppContext, path: &Path) -> Result<ExitCode, CliError> {
    let project = load_project(path).await?;
    let outcome = orchestrator(ctx).run(ctx.account_id, &project).await?;
    info!("Upload of build #{} finished", outcome.build_id());

    if !outcome.is_success() {
        return Ok(ExitCode::FAILURE);
    }
    if matches!(outcome, PipelineOutcome::Deployed { .. }) {
        ctx.sink.emit(UiEvent::info(format!(
            "View project details: {}",
            ctx.project_detail_url(project.name())
        )));
    }
    Ok(ExitCode::SUCCESS)
}

async fn deploy(ctx: &AppContext, path: &Path, build_id: u64) -> Result<ExitCode, CliError> {
    let project = load_project(path).await?;
    let deploy = orchestrator(ctx)
        .deploy_build(ctx.account_id, project.name(), &build_id.to_string())
        .await?;

    if deploy.status != TaskStatus::Success {
        return Ok(ExitCode::FAILURE);
    }
    ctx.sink.emit(UiEvent::info(format!(
        "View project details: {}",
        ctx.project_detail_url(project.name())
    )));
    Ok(ExitCode::SUCCESS)
}

async fn dev(ctx: &AppContext, path: &Path) -> Result<ExitCode, CliError> {
    let project = load_project(path).await?;
    let manager = LocalDevManager::new(
        Arc::new(ctx.platform_api()),
        ctx.sink.clone(),
        LocalDevOptions {
            target_account: ctx.account_id,
            default_account: ctx.settings.default_account,
        },
    );

    if manager.preflight(&project).await?.is_ready() {
        ctx.sink.emit(UiEvent::info(format!(
            "View project details: {}",
            ctx.project_detail_url(project.name())
        )));
    }
    Ok(ExitCode::SUCCESS)
}

async fn init(ctx: &AppContext, path: &Path, name: String, src_dir: String) -> Result<ExitCode, CliError> {
    let dir = Dir::new(path);
    let config_file = dir.file(PROJECT_CONFIG_FILE);
    if config_file.exists().await {
        ctx.sink.emit(UiEvent::error(format!(
            "A project config already exists at {}",
            config_file.path().display()
        )));
        return Ok(ExitCode::FAILURE);
    }

    let config = ProjectConfig {
        name: name.clone(),
        src_dir,
    };
    dir.create().await?;
    dir.subdir(&config.src_dir).create().await?;
    write_project_config(dir.path(), &config).await?;

    ctx.platform_api().create_project(ctx.account_id, &name).await?;
    ctx.sink.emit(UiEvent::success(format!(
        "Created project '{}' in account {}",
        name, ctx.account_id
    )));
    Ok(ExitCode::SUCCESS)
}
