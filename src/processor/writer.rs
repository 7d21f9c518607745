//! Excel export of the summary table
//!
//! Writes the pivoted table to a single worksheet: header row with the
//! column labels, row labels in the first column, blank cells where a
//! measurement has no value.

use super::summary::SummaryTable;
use crate::constants::EXPORT_FILENAME;
use crate::error::{FlimError, Result};

use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Spreadsheet writer targeting `<output_dir>/export.xlsx`
#[derive(Debug, Clone)]
pub struct ExcelWriter {
    output_dir: PathBuf,
}

impl ExcelWriter {
    /// Create a new writer for the given output directory
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Full path of the exported workbook
    pub fn target_path(&self) -> PathBuf {
        self.output_dir.join(EXPORT_FILENAME)
    }

    /// Write `table` and return the path of the workbook
    pub fn write(&self, table: &SummaryTable) -> Result<PathBuf> {
        let target = self.target_path();
        let mut workbook = Workbook::new();

        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(table.statistic().sheet_name())?;

            let header = Format::new().set_bold();

            for (col_idx, column) in table.frame().get_columns().iter().enumerate() {
                let col = worksheet_column(col_idx)?;
                worksheet.write_string_with_format(0, col, column.name().as_str(), &header)?;

                let series = column.as_materialized_series();
                match series.dtype() {
                    DataType::String => {
                        for (row_idx, value) in series.str()?.into_iter().enumerate() {
                            if let Some(value) = value {
                                worksheet.write_string(worksheet_row(row_idx)?, col, value)?;
                            }
                        }
                    }
                    _ => {
                        for (row_idx, value) in series.f64()?.into_iter().enumerate() {
                            if let Some(value) = value.filter(|v| v.is_finite()) {
                                worksheet.write_number(worksheet_row(row_idx)?, col, value)?;
                            }
                        }
                    }
                }
            }

            worksheet.autofit();
        }

        ensure_parent(&target)?;
        workbook.save(&target)?;

        info!(
            "Wrote {} rows to sheet '{}' in {}",
            table.height(),
            table.statistic().sheet_name(),
            target.display()
        );
        Ok(target)
    }
}

/// Worksheet row for a table row; row 0 holds the header
fn worksheet_row(row_idx: usize) -> Result<u32> {
    u32::try_from(row_idx + 1).map_err(|_| {
        FlimError::configuration(format!("Summary table row {} exceeds worksheet limits", row_idx))
    })
}

fn worksheet_column(col_idx: usize) -> Result<u16> {
    u16::try_from(col_idx).map_err(|_| {
        FlimError::configuration(format!(
            "Summary table column {} exceeds worksheet limits",
            col_idx
        ))
    })
}

fn ensure_parent(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating output directory: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
