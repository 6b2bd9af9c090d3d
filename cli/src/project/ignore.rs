//! Ignore rules for project packaging
//!
//! Gitignore semantics via the `ignore` crate: built-in defaults plus an
//! optional `.deckhandignore` at the project root.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::debug;

use crate::errors::CliError;

pub const IGNORE_FILE: &str = ".deckhandignore";

/// Patterns that are never packaged
const DEFAULT_PATTERNS: &[&str] = &[
    ".DS_Store",
    "node_modules/",
    ".git/",
    "*.log",
    ".env",
    ".vscode/",
    ".idea/",
];

/// Compiled ignore matcher
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    matcher: Gitignore,
}

impl IgnoreRules {
    /// Built-in defaults only
    pub fn defaults(root: &Path) -> Result<Self, CliError> {
        Self::build(root, None)
    }

    /// Built-in defaults plus `.deckhandignore` in `root`, when present
    pub fn load(root: &Path) -> Result<Self, CliError> {
        let ignore_file = root.join(IGNORE_FILE);
        if ignore_file.is_file() {
            debug!("Loading ignore rules from {}", ignore_file.display());
            Self::build(root, Some(&ignore_file))
        } else {
            Self::build(root, None)
        }
    }

    /// Defaults plus extra pattern lines
    pub fn with_patterns(root: &Path, patterns: &[&str]) -> Result<Self, CliError> {
        let mut builder = Self::builder(root)?;
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| CliError::IgnoreError(e.to_string()))?;
        }
        Self::finish(builder)
    }

    fn builder(root: &Path) -> Result<GitignoreBuilder, CliError> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in DEFAULT_PATTERNS {
            builder
                .add_line(None, pattern)
                .map_err(|e| CliError::IgnoreError(e.to_string()))?;
        }
        Ok(builder)
    }

    fn build(root: &Path, ignore_file: Option<&Path>) -> Result<Self, CliError> {
        let mut builder = Self::builder(root)?;
        if let Some(path) = ignore_file {
            if let Some(e) = builder.add(path) {
                return Err(CliError::IgnoreError(format!(
                    "Invalid {}: {}",
                    path.display(),
                    e
                )));
            }
        }
        Self::finish(builder)
    }

    fn finish(builder: GitignoreBuilder) -> Result<Self, CliError> {
        let matcher = builder
            .build()
            .map_err(|e| CliError::IgnoreError(e.to_string()))?;
        Ok(Self { matcher })
    }

    /// Whether `path` (or any directory above it) is ignored
    ///
    /// Paths outside the rules' root never match.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        if !path.starts_with(self.matcher.path()) {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
    }
}
