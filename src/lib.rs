//! FLIM Summary Library
//!
//! A Rust library for summarizing fluorescence-lifetime imaging (FLIM)
//! ASCII exports into a per-measurement Excel table.
//!
//! This library provides tools for:
//! - Discovering export files in a directory, with a recursive fallback
//! - Parsing channel and variable identifiers from filenames
//! - Building a Project → Channel → Variable → Measurement tree and
//!   optionally reorganizing the files on disk to match it
//! - Loading samples on demand and computing statistics that skip
//!   background and saturated pixels
//! - Pivoting the results and exporting them to `export.xlsx`

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod processor;

// Re-export commonly used types
pub use config::FlimConfig;
pub use error::{FlimError, Result};
pub use models::{Channel, Measurement, ProcessingStats, Project, Statistic, Variable};
pub use processor::SummaryProcessor;
