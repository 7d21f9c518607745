//! Core data structures and types for FLIM summaries.
//!
//! Defines the Project → Channel → Variable → Measurement tree, the summary
//! statistics that can be exported, and processing statistics reported by
//! the pipeline.
//!
//! The tree uses plain ownership downwards and indices upwards: a `Variable`
//! knows the index of its owning `Channel` inside the `Project`, nothing
//! holds a reference to its parent.

use crate::constants::{IDENTIFIER_TOKENS, LABEL_SEPARATOR, TOKEN_SEPARATOR};
use crate::error::Result;
use crate::processor::{loader, stats};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Per-measurement statistic exported to the summary table
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// Arithmetic mean
    #[default]
    Mean,
    /// Population standard deviation
    Std,
    /// Smallest value
    Min,
    /// Largest value
    Max,
}

impl Statistic {
    /// Worksheet name used when exporting this statistic
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Statistic::Mean => "Averages",
            Statistic::Std => "StandardDeviations",
            Statistic::Min => "Minimums",
            Statistic::Max => "Maximums",
        }
    }

    /// Compute the statistic over a sample buffer.
    ///
    /// With `clean` set, zeros and the buffer maximum are treated as missing
    /// before computing. Missing values are always ignored.
    pub fn compute(&self, samples: &[f64], clean: bool) -> Option<f64> {
        let view = if clean {
            stats::clean(samples)
        } else {
            stats::raw(samples)
        };

        match self {
            Statistic::Mean => stats::nan_mean(&view),
            Statistic::Std => stats::nan_std(&view),
            Statistic::Min => stats::nan_min(&view),
            Statistic::Max => stats::nan_max(&view),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Statistic::Mean => "mean",
            Statistic::Std => "std",
            Statistic::Min => "min",
            Statistic::Max => "max",
        };
        f.write_str(name)
    }
}

/// One data file's worth of samples for a channel/variable pair
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    path: PathBuf,
    data: Option<Vec<f64>>,
}

impl Measurement {
    /// Create an unloaded measurement backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last component of the measurement path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name with the trailing channel and variable tokens removed.
    ///
    /// `A_Ch1_int.asc` becomes `A`; names with fewer than three tokens give
    /// an empty string.
    pub fn base_name(&self) -> String {
        let file_name = self.file_name();
        let tokens: Vec<&str> = file_name.split(TOKEN_SEPARATOR).collect();
        let keep = tokens.len().saturating_sub(IDENTIFIER_TOKENS);
        let separator = TOKEN_SEPARATOR.to_string();
        tokens[..keep].join(separator.as_str())
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Loaded samples, if any
    pub fn data(&self) -> Option<&[f64]> {
        self.data.as_deref()
    }

    /// Read the sample buffer from disk. Does nothing when already loaded.
    pub fn load_data(&mut self) -> Result<()> {
        if self.data.is_some() {
            return Ok(());
        }

        let samples = loader::load_samples(&self.path)?;
        debug!("Read {} samples from {}", samples.len(), self.path.display());
        self.data = Some(samples);
        Ok(())
    }

    /// Drop the sample buffer; the measurement can be loaded again later
    pub fn unload_data(&mut self) {
        self.data = None;
    }

    /// Samples with zeros and the maximum value replaced by `None`
    pub fn clean_data(&self) -> Option<Vec<Option<f64>>> {
        self.data.as_deref().map(stats::clean)
    }

    pub fn max(&self) -> Option<f64> {
        self.statistic(Statistic::Max, true)
    }

    pub fn min(&self) -> Option<f64> {
        self.statistic(Statistic::Min, true)
    }

    pub fn mean(&self) -> Option<f64> {
        self.statistic(Statistic::Mean, true)
    }

    pub fn std(&self) -> Option<f64> {
        self.statistic(Statistic::Std, true)
    }

    /// Compute `statistic` over the loaded samples; `None` when unloaded
    pub fn statistic(&self, statistic: Statistic, clean: bool) -> Option<f64> {
        self.data
            .as_deref()
            .and_then(|samples| statistic.compute(samples, clean))
    }
}

/// A named quantity (intensity, lifetime, ...) measured within a channel
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    channel: usize,
    measurements: Vec<Measurement>,
}

impl Variable {
    /// Create an empty variable owned by the channel at index `channel`
    pub fn new(name: impl Into<String>, channel: usize) -> Self {
        Self {
            name: name.into(),
            channel,
            measurements: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the owning channel in its project
    pub fn channel_index(&self) -> usize {
        self.channel
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn push_measurement(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    /// Load every measurement, logging and counting failures
    pub fn load_data(&mut self, channel_name: &str) -> usize {
        self.load_missing(channel_name).1
    }

    /// Load the measurements not yet in memory.
    ///
    /// Returns the indices that were loaded by this call and the failure count.
    fn load_missing(&mut self, channel_name: &str) -> (Vec<usize>, usize) {
        let mut loaded = Vec::new();
        let mut failures = 0;

        for (index, measurement) in self.measurements.iter_mut().enumerate() {
            if measurement.is_loaded() {
                continue;
            }

            match measurement.load_data() {
                Ok(()) => {
                    info!(
                        "Loaded ({}) ({}) ({})",
                        channel_name,
                        self.name,
                        measurement.file_name()
                    );
                    loaded.push(index);
                }
                Err(e) => {
                    error!("Failed to load {}: {}", measurement.path().display(), e);
                    failures += 1;
                }
            }
        }

        (loaded, failures)
    }

    pub fn unload_data(&mut self) {
        for measurement in &mut self.measurements {
            measurement.unload_data();
        }
    }

    /// Load all measurements for the lifetime of the returned guard.
    ///
    /// When the guard is dropped, the measurements it loaded are unloaded
    /// again. Measurements that were already loaded stay loaded.
    pub fn acquire(&mut self, channel_name: &str) -> LoadedVariable<'_> {
        let (loaded, failures) = self.load_missing(channel_name);
        LoadedVariable {
            variable: self,
            loaded,
            failures,
        }
    }

    /// Run `f` with all measurements loaded, unloading afterwards
    pub fn with_loaded<T>(&mut self, channel_name: &str, f: impl FnOnce(&Variable) -> T) -> T {
        let loaded = self.acquire(channel_name);
        f(&loaded)
    }

    /// `(base name, value)` for every measurement, in order.
    ///
    /// Only loaded measurements produce a value.
    pub fn values(&self, statistic: Statistic, clean: bool) -> Vec<(String, Option<f64>)> {
        self.measurements
            .iter()
            .map(|m| (m.base_name(), m.statistic(statistic, clean)))
            .collect()
    }

    /// Cleaned mean of each measurement, loading and unloading around it
    pub fn means(&mut self, channel_name: &str) -> Vec<Option<f64>> {
        self.with_loaded(channel_name, |variable| {
            variable.measurements.iter().map(Measurement::mean).collect()
        })
    }

    /// Cleaned standard deviation of each measurement
    pub fn stds(&mut self, channel_name: &str) -> Vec<Option<f64>> {
        self.with_loaded(channel_name, |variable| {
            variable.measurements.iter().map(Measurement::std).collect()
        })
    }
}

/// Scoped acquisition of a variable's samples
#[derive(Debug)]
pub struct LoadedVariable<'a> {
    variable: &'a mut Variable,
    loaded: Vec<usize>,
    failures: usize,
}

impl LoadedVariable<'_> {
    /// Number of measurements that could not be loaded
    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl Deref for LoadedVariable<'_> {
    type Target = Variable;

    fn deref(&self) -> &Variable {
        self.variable
    }
}

impl Drop for LoadedVariable<'_> {
    fn drop(&mut self) {
        for &index in &self.loaded {
            if let Some(measurement) = self.variable.measurements.get_mut(index) {
                measurement.unload_data();
            }
        }
    }
}

/// An acquisition channel tag such as `Ch1`
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    name: String,
    variables: Vec<Variable>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn push_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    /// Column label `<channel>-<variable>` used in the summary table
    pub fn label(&self, variable: &Variable) -> String {
        format!("{}{}{}", self.name, LABEL_SEPARATOR, variable.name)
    }

    /// Mutable access to the name and variables at once
    pub fn split_mut(&mut self) -> (&str, &mut [Variable]) {
        (&self.name, &mut self.variables)
    }
}

/// Root aggregate of an import
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Project {
    root: PathBuf,
    channels: Vec<Channel>,
    files: Vec<PathBuf>,
    used_subdirectories: bool,
}

impl Project {
    /// Create an empty project rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Assemble a project from already built parts
    pub fn from_parts(
        root: impl Into<PathBuf>,
        channels: Vec<Channel>,
        files: Vec<PathBuf>,
        used_subdirectories: bool,
    ) -> Self {
        Self {
            root: root.into(),
            channels,
            files,
            used_subdirectories,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut [Channel] {
        &mut self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn channel_by_name(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Owning channel of a variable
    pub fn channel_of(&self, variable: &Variable) -> Option<&Channel> {
        self.channel(variable.channel)
    }

    /// Files matched by discovery, as found before any move
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Whether discovery had to fall back to a recursive walk
    pub fn used_subdirectories(&self) -> bool {
        self.used_subdirectories
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Every measurement, channel by channel and variable by variable
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        self.channels
            .iter()
            .flat_map(|c| c.variables.iter())
            .flat_map(|v| v.measurements.iter())
    }

    pub fn measurement_count(&self) -> usize {
        self.measurements().count()
    }

    pub fn variable_count(&self) -> usize {
        self.channels.iter().map(|c| c.variables.len()).sum()
    }

    /// Load every measurement of the project, returning the failure count
    pub fn load_data(&mut self) -> usize {
        let mut failures = 0;
        for channel in &mut self.channels {
            let (name, variables) = channel.split_mut();
            for variable in variables {
                failures += variable.load_data(name);
            }
        }
        failures
    }

    pub fn unload_data(&mut self) {
        for channel in &mut self.channels {
            for variable in &mut channel.variables {
                variable.unload_data();
            }
        }
    }

    /// Scan summary: measurement count, then one line per channel
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} measurements.", self.measurement_count())];
        for channel in &self.channels {
            let names: Vec<&str> = channel.variables.iter().map(|v| v.name()).collect();
            lines.push(format!("{} -- {}", channel.name, names.join(", ")));
        }
        lines
    }
}

/// Outcome of building a project from discovered files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub files_found: usize,
    pub files_rejected: usize,
    pub measurements: usize,
    pub files_moved: usize,
    pub moves_failed: usize,
    pub used_subdirectories: bool,
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub measurements: usize,
    pub channels: usize,
    pub variables: usize,
    pub files_moved: usize,
    pub moves_failed: usize,
    pub load_failures: usize,
    pub export_path: Option<PathBuf>,
    pub export_aborted: bool,
    pub export_failed: bool,
    pub processing_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_samples(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_base_name() {
        assert_eq!(Measurement::new("A_Ch1_int.asc").base_name(), "A");
        assert_eq!(
            Measurement::new("/data/x_y_Ch2_tau.asc").base_name(),
            "x_y"
        );
        assert_eq!(Measurement::new("Ch1_int.asc").base_name(), "");
    }

    #[test]
    fn test_load_unload_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_samples(&temp_dir, "A_Ch1_int.asc", "1 2 3\n4 5 6\n");

        let mut measurement = Measurement::new(&path);
        assert!(!measurement.is_loaded());

        measurement.load_data().unwrap();
        let first = measurement.data().unwrap().to_vec();
        assert_eq!(first, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        measurement.unload_data();
        assert!(measurement.data().is_none());

        measurement.load_data().unwrap();
        assert_eq!(measurement.data().unwrap(), first.as_slice());
    }

    #[test]
    fn test_load_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_samples(&temp_dir, "A_Ch1_int.asc", "1 2 3\n");

        let mut measurement = Measurement::new(&path);
        measurement.load_data().unwrap();

        // A second load must not touch the file again
        fs::remove_file(&path).unwrap();
        assert!(measurement.load_data().is_ok());
        assert_eq!(measurement.data().unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clean_data_and_statistics() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_samples(&temp_dir, "A_Ch1_int.asc", "0 2 4\n9 6 9\n");

        let mut measurement = Measurement::new(&path);
        measurement.load_data().unwrap();

        let cleaned = measurement.clean_data().unwrap();
        assert_eq!(
            cleaned,
            vec![None, Some(2.0), Some(4.0), None, Some(6.0), None]
        );

        assert_eq!(measurement.mean(), Some(4.0));
        assert_eq!(measurement.min(), Some(2.0));
        assert_eq!(measurement.max(), Some(6.0));
        let std = measurement.std().unwrap();
        assert!((std - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_statistics_require_loaded_data() {
        let measurement = Measurement::new("missing_Ch1_int.asc");
        assert!(measurement.clean_data().is_none());
        assert!(measurement.mean().is_none());
    }

    #[test]
    fn test_scoped_acquisition_unloads() {
        let temp_dir = TempDir::new().unwrap();
        let mut variable = Variable::new("int", 0);
        variable.push_measurement(Measurement::new(write_samples(
            &temp_dir,
            "A_Ch1_int.asc",
            "1 2 3\n",
        )));
        variable.push_measurement(Measurement::new(write_samples(
            &temp_dir,
            "B_Ch1_int.asc",
            "2 4 8\n",
        )));

        let means = variable.means("Ch1");
        assert_eq!(means, vec![Some(1.5), Some(3.0)]);
        assert!(variable.measurements().iter().all(|m| !m.is_loaded()));

        {
            let loaded = variable.acquire("Ch1");
            assert_eq!(loaded.failures(), 0);
            assert!(loaded.measurements().iter().all(|m| m.is_loaded()));
        }
        assert!(variable.measurements().iter().all(|m| !m.is_loaded()));
    }

    #[test]
    fn test_acquire_counts_failures() {
        let temp_dir = TempDir::new().unwrap();
        let mut variable = Variable::new("int", 0);
        variable.push_measurement(Measurement::new(write_samples(
            &temp_dir,
            "A_Ch1_int.asc",
            "1 2 3\n",
        )));
        variable.push_measurement(Measurement::new(temp_dir.path().join("gone_Ch1_int.asc")));

        let values = variable.with_loaded("Ch1", |v| v.values(Statistic::Mean, false));
        assert_eq!(
            values,
            vec![("A".to_string(), Some(2.0)), ("gone".to_string(), None)]
        );
    }

    #[test]
    fn test_project_summary_lines() {
        let mut ch1 = Channel::new("Ch1");
        let mut int = Variable::new("int", 0);
        int.push_measurement(Measurement::new("A_Ch1_int.asc"));
        let mut lifetime = Variable::new("lifetime", 0);
        lifetime.push_measurement(Measurement::new("A_Ch1_lifetime.asc"));
        ch1.push_variable(int);
        ch1.push_variable(lifetime);

        let project = Project::from_parts(".", vec![ch1], Vec::new(), false);

        assert_eq!(project.measurement_count(), 2);
        assert_eq!(
            project.summary_lines(),
            vec!["2 measurements.".to_string(), "Ch1 -- int, lifetime".to_string()]
        );

        let variable = &project.channels()[0].variables()[1];
        assert_eq!(project.channel_of(variable).unwrap().name(), "Ch1");
        assert_eq!(project.channels()[0].label(variable), "Ch1-lifetime");
    }

    #[test]
    fn test_acquire_keeps_preloaded_measurements() {
        let temp_dir = TempDir::new().unwrap();
        let mut variable = Variable::new("int", 0);
        variable.push_measurement(Measurement::new(write_samples(
            &temp_dir,
            "A_Ch1_int.asc",
            "1 2 3\n",
        )));
        variable.push_measurement(Measurement::new(write_samples(
            &temp_dir,
            "B_Ch1_int.asc",
            "2 4 8\n",
        )));
        variable.measurements[0].load_data().unwrap();

        {
            let loaded = variable.acquire("Ch1");
            assert!(loaded.measurements().iter().all(|m| m.is_loaded()));
        }

        // Only what the guard loaded is released
        assert!(variable.measurements()[0].is_loaded());
        assert!(!variable.measurements()[1].is_loaded());
    }

    #[test]
    fn test_variable_stds() {
        let temp_dir = TempDir::new().unwrap();
        let mut variable = Variable::new("int", 0);
        variable.push_measurement(Measurement::new(write_samples(
            &temp_dir,
            "A_Ch1_int.asc",
            "0 2 4 9\n",
        )));
        variable.push_measurement(Measurement::new(temp_dir.path().join("gone_Ch1_int.asc")));

        let stds = variable.stds("Ch1");
        assert_eq!(stds, vec![Some(1.0), None]);
        assert!(variable.measurements().iter().all(|m| !m.is_loaded()));
    }

    #[test]
    fn test_project_load_and_unload() {
        let temp_dir = TempDir::new().unwrap();

        let mut int = Variable::new("int", 0);
        int.push_measurement(Measurement::new(write_samples(
            &temp_dir,
            "A_Ch1_int.asc",
            "1 2 3\n",
        )));
        let mut lifetime = Variable::new("lifetime", 0);
        lifetime.push_measurement(Measurement::new(write_samples(
            &temp_dir,
            "A_Ch1_lifetime.asc",
            "4 5 6\n",
        )));
        lifetime.push_measurement(Measurement::new(temp_dir.path().join("gone_Ch1_lifetime.asc")));

        let mut ch1 = Channel::new("Ch1");
        ch1.push_variable(int);
        ch1.push_variable(lifetime);
        let mut project = Project::from_parts(temp_dir.path(), vec![ch1], Vec::new(), false);

        assert_eq!(project.load_data(), 1);
        let loaded: Vec<bool> = project.measurements().map(|m| m.is_loaded()).collect();
        assert_eq!(loaded, vec![true, true, false]);

        // Data loaded up front survives a scoped acquisition
        let (name, variables) = project.channels_mut()[0].split_mut();
        let values = variables[0].with_loaded(name, |v| v.values(Statistic::Mean, false));
        assert_eq!(values, vec![("A".to_string(), Some(2.0))]);
        assert!(project.measurements().next().unwrap().is_loaded());

        project.unload_data();
        assert!(project.measurements().all(|m| !m.is_loaded()));
    }

    #[test]
    fn test_statistic_sheet_names() {
        assert_eq!(Statistic::Mean.sheet_name(), "Averages");
        assert_eq!(Statistic::default(), Statistic::Mean);
        assert_eq!(Statistic::Std.to_string(), "std");
    }
}
