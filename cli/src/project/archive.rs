//! Project packaging
//!
//! Compresses a project's source directory into a single zip archive held in a
//! temporary file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, trace};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::CliError;
use crate::project::ignore::IgnoreRules;

/// A finished archive
///
/// The temporary file is removed by [`Archive::release`], or on drop if the
/// archive is abandoned (panic, interrupted command).
#[derive(Debug)]
pub struct Archive {
    file: NamedTempFile,
    byte_count: u64,
}

impl Archive {
    pub fn new(file: NamedTempFile, byte_count: u64) -> Self {
        Self { file, byte_count }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Size of the compressed archive
    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    /// Remove the temporary file
    pub fn release(self) -> Result<PathBuf, CliError> {
        let path = self.file.path().to_path_buf();
        self.file.close()?;
        Ok(path)
    }
}

/// Produces an archive of a source directory
#[async_trait]
pub trait Archiver: Send + Sync {
    async fn archive(&self, source_dir: &Path, ignore: &IgnoreRules) -> Result<Archive, CliError>;
}

/// Zip archiver writing to a temporary `.zip` file
#[derive(Debug, Default, Clone)]
pub struct ZipArchiver;

#[async_trait]
impl Archiver for ZipArchiver {
    async fn archive(&self, source_dir: &Path, ignore: &IgnoreRules) -> Result<Archive, CliError> {
        let source_dir = source_dir.to_path_buf();
        let ignore = ignore.clone();

        let result = tokio::task::spawn_blocking(move || write_zip(&source_dir, &ignore))
            .await
            .map_err(|e| CliError::Internal(format!("Archive task failed: {}", e)))?;

        result.map_err(|e| match e {
            CliError::ArchiveError(_) => e,
            other => CliError::ArchiveError(other.to_string()),
        })
    }
}

fn write_zip(source_dir: &Path, ignore: &IgnoreRules) -> Result<Archive, CliError> {
    if !source_dir.is_dir() {
        return Err(CliError::ArchiveError(format!(
            "Source directory {} does not exist",
            source_dir.display()
        )));
    }

    let temp = tempfile::Builder::new()
        .prefix("deckhand-")
        .suffix(".zip")
        .tempfile()?;
    debug!("Compressing build files to '{}'", temp.path().display());

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(temp.as_file());
    add_dir(&mut zip, source_dir, source_dir, ignore, options)?;
    let file = zip.finish()?;
    let byte_count = file.metadata()?.len();

    debug!("Project files compressed: {} bytes", byte_count);
    Ok(Archive::new(temp, byte_count))
}

/// Entry name of `path` inside the archive: relative to `root`, `/`-separated
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn add_dir<W: io::Write + io::Seek>(
    zip: &mut ZipWriter<W>,
    root: &Path,
    dir: &Path,
    ignore: &IgnoreRules,
    options: SimpleFileOptions,
) -> Result<(), CliError> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        let is_dir = path.is_dir();
        if ignore.is_ignored(&path, is_dir) {
            trace!("Ignoring {}", path.display());
            continue;
        }
        let Some(name) = entry_name(root, &path) else {
            continue;
        };

        if is_dir {
            zip.add_directory(format!("{}/", name), options)?;
            add_dir(zip, root, &path, ignore, options)?;
        } else if path.is_file() {
            zip.start_file(name, options)?;
            let mut file = fs::File::open(&path)?;
            io::copy(&mut file, zip)?;
        }
    }

    Ok(())
}
