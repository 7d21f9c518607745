//! File discovery module for FLIM exports
//!
//! Lists matching files directly in the scan root and falls back to a
//! recursive walk when the root itself holds none, which is the layout left
//! behind by an earlier run that moved files into channel/variable folders.

use crate::error::{FlimError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File discovery component for a FLIM export directory
#[derive(Debug)]
pub struct FileDiscovery {
    root: PathBuf,
    extension: String,
    used_subdirectories: bool,
}

impl FileDiscovery {
    /// Create a new file discovery instance; an empty `extension` matches all files
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            used_subdirectories: false,
        }
    }

    /// Whether the last discovery had to walk subdirectories
    pub fn used_subdirectories(&self) -> bool {
        self.used_subdirectories
    }

    /// Discover matching files, sorted by path.
    ///
    /// An empty result is not an error. Only a missing or non-directory
    /// root is.
    pub fn discover_files(&mut self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Err(FlimError::RootNotFound {
                path: self.root.clone(),
            });
        }
        if !self.root.is_dir() {
            return Err(FlimError::NotADirectory {
                path: self.root.clone(),
            });
        }

        self.used_subdirectories = false;

        debug!(
            "Searching for '{}' files in: {}",
            self.extension,
            self.root.display()
        );
        let files = self.discover_root_files();
        if !files.is_empty() {
            debug!("Found {} files in root directory", files.len());
            return Ok(files);
        }

        debug!("No files in root directory, searching subdirectories");
        let files = self.discover_nested_files();
        if !files.is_empty() {
            self.used_subdirectories = true;
            debug!("Found {} files in subdirectories", files.len());
        }

        Ok(files)
    }

    /// Files directly inside the root, symlinks resolved
    fn discover_root_files(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not list {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if path.is_file() && matches_extension(&path, &self.extension) {
                files.push(path);
            }
        }

        files.sort();
        files
    }

    /// Matching files at any depth below the root
    fn discover_nested_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.path().is_file() && matches_extension(entry.path(), &self.extension) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        files
    }
}

/// Case-sensitive suffix match on the file name
fn matches_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(extension))
        .unwrap_or(false)
}
