//! Project import: discovery, parsing and tree construction
//!
//! Builds the Channel → Variable → Measurement tree from parsed files and,
//! when requested, mirrors it onto disk as `<root>/<channel>/<variable>/`
//! folders. Moving files is best effort: a file that cannot be moved keeps
//! its original path and the import carries on.

use super::discovery::FileDiscovery;
use super::filename::{ParsedFile, parse_filenames};
use crate::config::FlimConfig;
use crate::error::Result;
use crate::models::{Channel, ImportReport, Measurement, Project, Variable};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Discover, parse and assemble a project according to `config`
pub fn import_project(config: &FlimConfig) -> Result<(Project, ImportReport)> {
    let root = config.root_path.clone();
    let mut discovery = FileDiscovery::new(&root, config.extension.as_str());
    let files = discovery.discover_files()?;

    let mut report = ImportReport {
        files_found: files.len(),
        used_subdirectories: discovery.used_subdirectories(),
        ..Default::default()
    };

    if files.is_empty() {
        warn!("No files were found.");
        return Ok((Project::new(root), report));
    }

    if report.used_subdirectories {
        info!("No files in root directory, using files from subdirectories");
    }

    let parsed = parse_filenames(&files, &config.extension);
    report.files_rejected = files.len() - parsed.len();

    let channels = build_channels(&root, parsed, config.move_files, &mut report);
    report.measurements = channels
        .iter()
        .flat_map(|c| c.variables())
        .map(|v| v.measurements().len())
        .sum();

    info!(
        "Imported {} measurements in {} channels",
        report.measurements,
        channels.len()
    );

    let project = Project::from_parts(root, channels, files, report.used_subdirectories);
    Ok((project, report))
}

/// Group parsed files into channels and variables.
///
/// Channels and variables come out sorted by name and each distinct
/// variable name yields exactly one `Variable` per channel. With
/// `move_files` set every file is moved to `<root>/<channel>/<variable>/`.
pub fn build_channels(
    root: &Path,
    parsed: Vec<ParsedFile>,
    move_files: bool,
    report: &mut ImportReport,
) -> Vec<Channel> {
    let mut grouped: BTreeMap<String, BTreeMap<String, Vec<PathBuf>>> = BTreeMap::new();
    for file in parsed {
        grouped
            .entry(file.channel)
            .or_default()
            .entry(file.variable)
            .or_default()
            .push(file.path);
    }

    let mut channels = Vec::with_capacity(grouped.len());

    for (channel_index, (channel_name, variables)) in grouped.into_iter().enumerate() {
        let mut channel = Channel::new(channel_name.as_str());

        let channel_dir = root.join(&channel_name);
        if move_files {
            debug!("Creating directory for channel: {}", channel_name);
            ensure_directory(&channel_dir);
        }

        for (variable_name, paths) in variables {
            let mut variable = Variable::new(variable_name.as_str(), channel_index);

            let variable_dir = channel_dir.join(&variable_name);
            if move_files {
                ensure_directory(&variable_dir);
            }

            for path in paths {
                let path = if move_files {
                    relocate(path, &variable_dir, report)
                } else {
                    path
                };
                variable.push_measurement(Measurement::new(path));
            }

            channel.push_variable(variable);
        }

        channels.push(channel);
    }

    channels
}

/// Create `dir` when missing; failures only log, the moves into it will
/// then fail one by one
fn ensure_directory(dir: &Path) {
    if dir.is_dir() {
        return;
    }

    if let Err(e) = fs::create_dir_all(dir) {
        warn!("Could not create directory {}: {}", dir.display(), e);
    }
}

/// Move `path` into `target_dir`, returning the path the file ends up at
fn relocate(path: PathBuf, target_dir: &Path, report: &mut ImportReport) -> PathBuf {
    let Some(file_name) = path.file_name() else {
        warn!("Could not move file: {}", path.display());
        report.moves_failed += 1;
        return path;
    };
    let target = target_dir.join(file_name);

    if target == path {
        return path;
    }

    if target.exists() {
        warn!(
            "Could not move file: {} ({} already exists)",
            path.display(),
            target.display()
        );
        report.moves_failed += 1;
        return path;
    }

    match fs::rename(&path, &target) {
        Ok(()) => {
            debug!("Moved {} -> {}", path.display(), target.display());
            report.files_moved += 1;
            target
        }
        Err(e) => {
            warn!("Could not move file: {} ({})", path.display(), e);
            report.moves_failed += 1;
            path
        }
    }
}
