//! Summary aggregation into a pivoted table
//!
//! Each variable is loaded, reduced to one value per measurement and
//! unloaded again before moving on, so at most one variable's samples are
//! held in memory. The per-variable columns are then pivoted into a polars
//! `DataFrame` with one row per measurement base name.

use crate::constants::{INDEX_COLUMN, LABEL_SEPARATOR};
use crate::error::{FlimError, Result};
use crate::models::{Project, Statistic};

use indicatif::ProgressBar;
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Values of one `<channel>-<variable>` column before pivoting
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryColumn {
    pub label: String,
    pub entries: Vec<(String, Option<f64>)>,
}

/// Outcome of collecting the summary columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedColumns {
    pub columns: Vec<SummaryColumn>,
    pub load_failures: usize,
}

/// Reduce every variable of `project` to a summary column.
///
/// Variables are visited channel by channel, each inside its own scoped
/// load so samples never outlive the column they feed.
pub fn collect_columns(
    project: &mut Project,
    statistic: Statistic,
    clean: bool,
    progress: Option<&ProgressBar>,
) -> CollectedColumns {
    let mut collected = CollectedColumns::default();

    for channel in project.channels_mut() {
        let (channel_name, variables) = channel.split_mut();

        for variable in variables.iter_mut() {
            if let Some(pb) = progress {
                pb.set_message(format!("{} {}", channel_name, variable.name()));
            }

            let label = format!("{}{}{}", channel_name, LABEL_SEPARATOR, variable.name());

            let loaded = variable.acquire(channel_name);
            collected.load_failures += loaded.failures();
            let entries = loaded.values(statistic, clean);
            drop(loaded);

            debug!("Column {}: {} measurements", label, entries.len());
            collected.columns.push(SummaryColumn { label, entries });

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }
    }

    collected
}

/// Pivoted summary table: rows are measurement base names, columns are
/// `<channel>-<variable>` labels
#[derive(Debug, Clone)]
pub struct SummaryTable {
    frame: DataFrame,
    statistic: Statistic,
}

impl SummaryTable {
    /// Pivot `columns` into a table.
    ///
    /// Every column must map its entries one-to-one onto distinct base
    /// names; a repeated base name within a column means the filenames were
    /// ambiguous and yields `IndexMismatch`.
    pub fn from_columns(columns: &[SummaryColumn], statistic: Statistic) -> Result<Self> {
        let rows: Vec<String> = columns
            .iter()
            .flat_map(|c| c.entries.iter().map(|(name, _)| name.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        debug!("Index length: {}", rows.len());

        let mut frame_columns = Vec::with_capacity(columns.len() + 1);
        frame_columns.push(Column::new(INDEX_COLUMN.into(), rows.as_slice()));

        for column in columns {
            let distinct: HashSet<&str> = column.entries.iter().map(|(n, _)| n.as_str()).collect();
            if distinct.len() != column.entries.len() {
                return Err(FlimError::IndexMismatch {
                    label: column.label.clone(),
                    entries: column.entries.len(),
                    distinct: distinct.len(),
                });
            }

            let lookup: HashMap<&str, Option<f64>> = column
                .entries
                .iter()
                .map(|(name, value)| (name.as_str(), *value))
                .collect();
            let values: Vec<Option<f64>> = rows
                .iter()
                .map(|row| lookup.get(row.as_str()).copied().flatten())
                .collect();

            frame_columns.push(Column::new(column.label.as_str().into(), values));
        }

        let frame = DataFrame::new(frame_columns)?;
        Ok(Self { frame, statistic })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn statistic(&self) -> Statistic {
        self.statistic
    }

    /// Number of rows (distinct base names)
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Row labels in table order
    pub fn row_labels(&self) -> Result<Vec<String>> {
        let index = self.frame.column(INDEX_COLUMN)?.as_materialized_series().str()?;
        Ok(index
            .into_iter()
            .map(|label| label.unwrap_or_default().to_string())
            .collect())
    }

    /// Column labels, excluding the row-label column
    pub fn column_labels(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .skip(1)
            .map(|name| name.to_string())
            .collect()
    }

    /// Cell value at (`row`, `column`); `None` for empty cells or unknown labels
    pub fn value(&self, row: &str, column: &str) -> Option<f64> {
        let position = self.row_labels().ok()?.iter().position(|r| r == row)?;
        self.frame
            .column(column)
            .ok()?
            .as_materialized_series()
            .f64()
            .ok()?
            .get(position)
    }
}
