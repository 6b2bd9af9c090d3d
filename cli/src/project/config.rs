//! Project configuration (`deckhand.json`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CliError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

pub const PROJECT_CONFIG_FILE: &str = "deckhand.json";

/// Contents of the project config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,

    /// Source directory, relative to the project directory
    #[serde(default)]
    pub src_dir: String,
}

/// A validated project on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub config: ProjectConfig,

    /// Directory holding the project config file
    pub dir: PathBuf,
}

impl Project {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn source_dir(&self) -> PathBuf {
        self.dir.join(&self.config.src_dir)
    }
}

/// Find the project config in `start` or any ancestor directory
pub async fn find_project_config(start: &Path) -> Result<Option<(ProjectConfig, PathBuf)>, CliError> {
    let Some(file) = Dir::new(start).find_up(PROJECT_CONFIG_FILE).await else {
        return Ok(None);
    };

    let config: ProjectConfig = file.read_json().await.map_err(|e| {
        CliError::ProjectConfig(format!(
            "Could not read project config {}: {}",
            file.path().display(),
            e
        ))
    })?;
    let dir = file
        .path()
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| start.to_path_buf());

    debug!("Found project config for '{}' in {}", config.name, dir.display());
    Ok(Some((config, dir)))
}

/// Load and validate the project containing `start`
pub async fn load_project(start: &Path) -> Result<Project, CliError> {
    let Some((config, dir)) = find_project_config(start).await? else {
        return Err(CliError::ProjectConfig(
            "Project config not found. Try running 'deckhand project init' first.".to_string(),
        ));
    };

    if config.name.trim().is_empty() || config.src_dir.trim().is_empty() {
        return Err(CliError::ProjectConfig(
            "Project config is missing required fields. Try running 'deckhand project init'."
                .to_string(),
        ));
    }

    let project = Project { config, dir };
    if !Dir::new(project.source_dir()).exists().await {
        return Err(CliError::ProjectConfig(format!(
            "Project source directory '{}' does not exist.",
            project.config.src_dir
        )));
    }

    Ok(project)
}

/// Write a project config into `dir`
pub async fn write_project_config(dir: &Path, config: &ProjectConfig) -> Result<File, CliError> {
    let file = Dir::new(dir).file(PROJECT_CONFIG_FILE);
    file.write_json(config).await?;
    debug!("Wrote project config at {}", file.path().display());
    Ok(file)
}
