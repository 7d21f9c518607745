//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then command-line overrides applied by the CLI.

use crate::constants::{APP_CONFIG_DIR, CONFIG_FILENAME, DEFAULT_EXTENSION, DEFAULT_ROOT};
use crate::error::{FlimError, Result};
use crate::models::Statistic;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Global configuration for a FLIM summary run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlimConfig {
    /// Directory scanned for exports
    pub root_path: PathBuf,

    /// File suffix filter; empty matches every file
    pub extension: String,

    /// Move files into `<root>/<channel>/<variable>/` while importing
    pub move_files: bool,

    /// Directory receiving `export.xlsx`; defaults to the scan root
    pub output_dir: Option<PathBuf>,

    /// Statistic exported per measurement
    pub statistic: Statistic,

    /// Drop zero and saturated samples before computing statistics
    pub clean_samples: bool,

    /// Import and report only, no export
    pub scan_only: bool,
}

impl Default for FlimConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from(DEFAULT_ROOT),
            extension: DEFAULT_EXTENSION.to_string(),
            move_files: false,
            output_dir: None,
            statistic: Statistic::Mean,
            clean_samples: true,
            scan_only: false,
        }
    }
}

impl FlimConfig {
    pub fn with_root_path(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = root_path.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_move_files(mut self, move_files: bool) -> Self {
        self.move_files = move_files;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }

    /// Compute statistics over the samples as loaded, without cleaning
    pub fn with_raw_samples(mut self) -> Self {
        self.clean_samples = false;
        self
    }

    pub fn with_scan_only(mut self, scan_only: bool) -> Self {
        self.scan_only = scan_only;
        self
    }

    /// Directory the export is written to
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.root_path.clone())
    }

    /// `<user config dir>/flim-summary/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_CONFIG_DIR).join(CONFIG_FILENAME))
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FlimError::configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: FlimConfig = toml::from_str(&content).map_err(|e| {
            FlimError::configuration(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, else from the default location when it
    /// exists, else fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_config_path() {
            Some(default_path) if default_path.exists() => Self::from_file(&default_path),
            _ => Ok(Self::default()),
        }
    }

    /// Check settings for consistency
    pub fn validate(&self) -> Result<()> {
        if self
            .extension
            .contains(|c: char| c == '/' || c == std::path::MAIN_SEPARATOR)
        {
            return Err(FlimError::configuration(format!(
                "Extension filter must not contain a path separator: '{}'",
                self.extension
            )));
        }

        if let Some(output_dir) = &self.output_dir {
            if output_dir.exists() && !output_dir.is_dir() {
                return Err(FlimError::configuration(format!(
                    "Output path is not a directory: {}",
                    output_dir.display()
                )));
            }
        }

        Ok(())
    }
}
