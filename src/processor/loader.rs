//! Sample loader for FLIM ASCII exports
//!
//! Reads whitespace-separated numeric rows into a flat, row-major buffer.
//! Blank lines and `#` comments are skipped; every data row must have the
//! same number of columns as the first one.

use crate::constants::COMMENT_PREFIX;
use crate::error::{FlimError, Result};
use std::fs;
use std::path::Path;

/// Load all samples from the file at `path`
pub fn load_samples(path: &Path) -> Result<Vec<f64>> {
    let content = fs::read_to_string(path)?;
    parse_samples(path, &content)
}

/// Parse sample text; `path` is only used for error context
pub fn parse_samples(path: &Path, content: &str) -> Result<Vec<f64>> {
    let mut samples = Vec::new();
    let mut columns: Option<usize> = None;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let row_start = samples.len();
        for token in trimmed.split_whitespace() {
            let value = token.parse::<f64>().map_err(|e| FlimError::InvalidSample {
                path: path.to_path_buf(),
                line: line_number,
                reason: format!("'{}': {}", token, e),
            })?;
            samples.push(value);
        }

        let found = samples.len() - row_start;
        match columns {
            None => columns = Some(found),
            Some(expected) if expected != found => {
                return Err(FlimError::RaggedRows {
                    path: path.to_path_buf(),
                    line: line_number,
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }
    }

    Ok(samples)
}
