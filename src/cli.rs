//! Command-line interface components.

pub mod commands;

use crate::config::FlimConfig;
use crate::models::Statistic;

use clap::Parser;
use std::path::PathBuf;

/// Summarize FLIM ASCII exports per channel and variable into an Excel table
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flim-summary",
    version,
    about = "Summarize FLIM ASCII exports per channel and variable into an Excel table",
    long_about = "Scans a directory of FLIM ASCII exports named <prefix>_<channel>_<variable>.asc, \
                  groups them by channel and variable, optionally moves them into \
                  <root>/<channel>/<variable>/ folders, and writes one summary value per \
                  measurement to export.xlsx."
)]
pub struct Args {
    /// Directory containing the exported files (defaults to the config value, else ".")
    #[arg(value_name = "ROOT")]
    pub root_path: Option<PathBuf>,

    /// File suffix filter; an empty string matches every file
    #[arg(short, long, value_name = "SUFFIX", allow_hyphen_values = true)]
    pub extension: Option<String>,

    /// Move files into <root>/<channel>/<variable>/ folders
    #[arg(short, long)]
    pub move_files: bool,

    /// Directory for export.xlsx (defaults to ROOT)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Statistic exported per measurement
    #[arg(short, long, value_enum)]
    pub statistic: Option<Statistic>,

    /// Keep zero and saturated samples when computing statistics
    #[arg(long)]
    pub raw: bool,

    /// Import and print the scan summary without exporting
    #[arg(long)]
    pub scan_only: bool,

    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report warnings and errors, hide progress bars
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Log level derived from the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Overlay the flags that were given on top of `config`
    pub fn apply_to(&self, config: &mut FlimConfig) {
        if let Some(root_path) = &self.root_path {
            config.root_path = root_path.clone();
        }
        if let Some(extension) = &self.extension {
            config.extension = extension.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = Some(output.clone());
        }
        if let Some(statistic) = self.statistic {
            config.statistic = statistic;
        }
        if self.move_files {
            config.move_files = true;
        }
        if self.raw {
            config.clean_samples = false;
        }
        if self.scan_only {
            config.scan_only = true;
        }
    }
}
