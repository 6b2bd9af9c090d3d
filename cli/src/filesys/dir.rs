//! Directory operations

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::CliError;
use crate::filesys::file::File;

/// A directory wrapper with path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    path: PathBuf,
}

impl Dir {
    /// Create a new directory reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the directory exists
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Create the directory (and parents)
    pub async fn create(&self) -> Result<(), CliError> {
        fs::create_dir_all(&self.path).await?;
        Ok(())
    }

    /// Get a file within this directory
    pub fn file(&self, name: &str) -> File {
        File::new(self.path.join(name))
    }

    /// Get a subdirectory
    pub fn subdir(&self, name: &str) -> Dir {
        Dir::new(self.path.join(name))
    }

    /// Find the closest file named `name` in this directory or any ancestor
    pub async fn find_up(&self, name: &str) -> Option<File> {
        let mut current = Some(self.path.as_path());
        while let Some(dir) = current {
            let candidate = File::new(dir.join(name));
            if candidate.exists().await {
                return Some(candidate);
            }
            current = dir.parent();
        }
        None
    }
}
