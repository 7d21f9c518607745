//! Main processing engine.
//!
//! Orchestrates the FLIM summary workflow: file discovery, filename
//! parsing, project construction (with optional reorganization on disk),
//! per-variable aggregation and Excel export.

pub mod discovery;
pub mod filename;
pub mod import;
pub mod loader;
pub mod stats;
pub mod summary;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::summary::{SummaryTable, collect_columns};
use self::writer::ExcelWriter;

use crate::config::FlimConfig;
use crate::error::Result;
use crate::models::{ProcessingStats, Project};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::{debug, error, info};

/// Runs the import → aggregate → export pipeline for one directory
#[derive(Debug)]
pub struct SummaryProcessor {
    config: FlimConfig,
    show_progress: bool,
}

impl SummaryProcessor {
    /// Create a new processor
    pub fn new(config: FlimConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    /// Show a progress bar while summarizing variables
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &FlimConfig {
        &self.config
    }

    /// Main processing entry point.
    ///
    /// Only a missing or unreadable scan root is returned as an error. An
    /// empty directory, failed moves, unloadable files, an inconsistent
    /// table and a failed export are all reported and reflected in the
    /// returned statistics instead.
    pub fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        println!("{}", "Starting FLIM summary".bright_green().bold());
        println!(
            "  {} {}",
            "Root:".bright_cyan(),
            self.config.root_path.display()
        );
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            self.config.output_dir().display()
        );

        // Step 1: Discover, parse and build the project tree
        println!("\n{}", "Scanning files...".bright_yellow());
        let (mut project, report) = import::import_project(&self.config)?;
        debug!("Import report: {:?}", report);

        let mut stats = ProcessingStats {
            measurements: project.measurement_count(),
            channels: project.channels().len(),
            variables: project.variable_count(),
            files_moved: report.files_moved,
            moves_failed: report.moves_failed,
            ..Default::default()
        };

        print_project_summary(&project);

        if project.is_empty() {
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        if self.config.scan_only {
            info!("Scan only - skipping summary export");
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        // Step 2: Reduce every variable to a summary column
        println!("\n{}", "Loading measurements...".bright_yellow());
        let progress_bar = self.progress_bar(project.variable_count());
        let collected = collect_columns(
            &mut project,
            self.config.statistic,
            self.config.clean_samples,
            progress_bar.as_ref(),
        );
        if let Some(pb) = &progress_bar {
            pb.finish_with_message("Loading complete");
        }
        stats.load_failures = collected.load_failures;
        debug!("Highest number of columns: {}", collected.columns.len());

        // Step 3: Pivot into the summary table
        let table = match SummaryTable::from_columns(&collected.columns, self.config.statistic) {
            Ok(table) => table,
            Err(e) => {
                error!(
                    "Index does not match number of measurements. Check for ambiguous file naming, such as \"-Ch1-Ch2-\" ({})",
                    e
                );
                stats.export_aborted = true;
                stats.processing_time_ms = start_time.elapsed().as_millis();
                return Ok(stats);
            }
        };

        println!("\n{}", "Summary Table created:".bright_green());
        println!("{}", table.frame());

        // Step 4: Export
        println!("\n{}", "Exporting to Excel File...".bright_yellow());
        let writer = ExcelWriter::new(self.config.output_dir());
        match writer.write(&table) {
            Ok(path) => {
                println!(
                    "  {} {}",
                    "Successfully exported to:".bright_green(),
                    path.display()
                );
                stats.export_path = Some(path);
            }
            Err(e) => {
                println!("  {}", "FAILED".bright_red().bold());
                error!(
                    "Could not write {}: {}",
                    writer.target_path().display(),
                    e
                );
                stats.export_failed = true;
            }
        }

        stats.processing_time_ms = start_time.elapsed().as_millis();
        print_processing_summary(&stats);
        Ok(stats)
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    }
}

/// Print the scan summary: measurement count and variables per channel
pub fn print_project_summary(project: &Project) {
    let mut lines = project.summary_lines().into_iter();
    if let Some(count) = lines.next() {
        println!("  {}", count.bright_white().bold());
    }
    for line in lines {
        println!("  {}", line);
    }
}

fn print_processing_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Measurements:".bright_cyan(),
        stats.measurements.to_string().bright_white()
    );
    if stats.files_moved > 0 {
        println!(
            "  {} {}",
            "Files moved:".bright_cyan(),
            stats.files_moved.to_string().bright_white()
        );
    }
    if stats.moves_failed > 0 {
        println!(
            "  {} {}",
            "Moves failed:".bright_red(),
            stats.moves_failed.to_string().bright_red().bold()
        );
    }
    if stats.load_failures > 0 {
        println!(
            "  {} {}",
            "Files failed to load:".bright_red(),
            stats.load_failures.to_string().bright_red().bold()
        );
    }
}
