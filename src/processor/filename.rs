//! Filename parsing for FLIM exports
//!
//! Exports are named `<prefix>_<channel-token>_<variable><extension>`. The
//! channel token is sometimes mangled by the acquisition software (for
//! example `-Ch1-Ch1-`), so the channel tag is taken as the three
//! characters starting at the first `Ch`.

use crate::constants::{CHANNEL_MARKER, CHANNEL_TAG_LEN, TOKEN_SEPARATOR};
use crate::error::{FlimError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Channel and variable identifiers extracted from one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub channel: String,
    pub variable: String,
    pub path: PathBuf,
}

/// Normalize a channel token to its tag.
///
/// Returns `None` when the token holds no `Ch` marker at all.
pub fn normalize_channel(token: &str) -> Option<String> {
    let start = token.find(CHANNEL_MARKER)?;
    Some(token[start..].chars().take(CHANNEL_TAG_LEN).collect())
}

/// File name without the extension suffix.
///
/// A non-empty `extension` is stripped as a literal suffix; an empty one
/// strips the conventional extension instead.
fn strip_extension(path: &Path, extension: &str) -> Option<String> {
    if extension.is_empty() {
        return path.file_stem().map(|stem| stem.to_string_lossy().into_owned());
    }

    let name = path.file_name()?.to_string_lossy();
    let stem = name.strip_suffix(extension).unwrap_or(&name);
    Some(stem.to_string())
}

/// Parse a single path into its channel and variable
pub fn parse_filename(path: &Path, extension: &str) -> Result<ParsedFile> {
    let stem = strip_extension(path, extension)
        .ok_or_else(|| FlimError::invalid_filename(path, "path has no file name"))?;

    let tokens: Vec<&str> = stem.split(TOKEN_SEPARATOR).collect();
    if tokens.len() < 2 {
        return Err(FlimError::invalid_filename(
            path,
            "expected at least '<channel>_<variable>' tokens",
        ));
    }

    let variable = tokens[tokens.len() - 1];
    let channel_token = tokens[tokens.len() - 2];

    if variable.is_empty() {
        return Err(FlimError::invalid_filename(path, "variable token is empty"));
    }

    let channel = normalize_channel(channel_token).ok_or_else(|| {
        FlimError::invalid_filename(
            path,
            format!("channel token '{}' contains no '{}'", channel_token, CHANNEL_MARKER),
        )
    })?;

    Ok(ParsedFile {
        channel,
        variable: variable.to_string(),
        path: path.to_path_buf(),
    })
}

/// Parse every path, skipping (and logging) the ones that do not follow
/// the naming convention. The result is stably sorted by channel, then
/// variable.
pub fn parse_filenames(paths: &[PathBuf], extension: &str) -> Vec<ParsedFile> {
    let mut parsed: Vec<ParsedFile> = paths
        .iter()
        .filter_map(|path| match parse_filename(path, extension) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Skipping file: {}", e);
                None
            }
        })
        .collect();

    parsed.sort_by(|a, b| (&a.channel, &a.variable).cmp(&(&b.channel, &b.variable)));
    debug!("Parsed {} of {} filenames", parsed.len(), paths.len());
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> ParsedFile {
        parse_filename(Path::new(name), ".asc").unwrap()
    }

    #[test]
    fn test_parse_well_formed_names() {
        let file = parse("prefix_Ch2_lifetime.asc");
        assert_eq!(file.channel, "Ch2");
        assert_eq!(file.variable, "lifetime");
        assert_eq!(file.path, PathBuf::from("prefix_Ch2_lifetime.asc"));

        let file = parse("cell_01_treated_Ch1_int.asc");
        assert_eq!(file.channel, "Ch1");
        assert_eq!(file.variable, "int");
    }

    #[test]
    fn test_parse_mangled_channel_token() {
        assert_eq!(parse("A_-Ch1-Ch1-_int.asc").channel, "Ch1");
        // The first occurrence wins, never the second
        assert_eq!(parse("A_-Ch1-Ch2-_int.asc").channel, "Ch1");
    }

    #[test]
    fn test_normalize_channel() {
        assert_eq!(normalize_channel("Ch3"), Some("Ch3".to_string()));
        assert_eq!(normalize_channel("xxCh4yy"), Some("Ch4".to_string()));
        assert_eq!(normalize_channel("endCh"), Some("Ch".to_string()));
        assert_eq!(normalize_channel("channel1"), None);
    }

    #[test]
    fn test_parse_path_with_directories() {
        let file = parse_filename(Path::new("/data/Ch1/int/A_Ch1_int.asc"), ".asc").unwrap();
        assert_eq!(file.channel, "Ch1");
        assert_eq!(file.variable, "int");
    }

    #[test]
    fn test_parse_empty_extension_uses_stem() {
        let file = parse_filename(Path::new("A_Ch1_int.asc"), "").unwrap();
        assert_eq!(file.variable, "int");
    }

    #[test]
    fn test_parse_rejects_missing_channel_marker() {
        let result = parse_filename(Path::new("A_chan1_int.asc"), ".asc");
        assert!(matches!(result, Err(FlimError::InvalidFilename { .. })));
    }

    #[test]
    fn test_parse_rejects_too_few_tokens() {
        let result = parse_filename(Path::new("intensity.asc"), ".asc");
        assert!(matches!(result, Err(FlimError::InvalidFilename { .. })));
    }

    #[test]
    fn test_parse_rejects_empty_variable() {
        let result = parse_filename(Path::new("A_Ch1_.asc"), ".asc");
        assert!(matches!(result, Err(FlimError::InvalidFilename { .. })));
    }

    #[test]
    fn test_parse_filenames_sorts_and_skips() {
        let paths = vec![
            PathBuf::from("B_Ch2_int.asc"),
            PathBuf::from("A_Ch1_lifetime.asc"),
            PathBuf::from("broken.asc"),
            PathBuf::from("A_Ch1_int.asc"),
            PathBuf::from("C_Ch1_int.asc"),
        ];

        let parsed = parse_filenames(&paths, ".asc");
        let keys: Vec<(&str, &str, &str)> = parsed
            .iter()
            .map(|p| {
                (
                    p.channel.as_str(),
                    p.variable.as_str(),
                    p.path.to_str().unwrap(),
                )
            })
            .collect();

        assert_eq!(
            keys,
            vec![
                ("Ch1", "int", "A_Ch1_int.asc"),
                ("Ch1", "int", "C_Ch1_int.asc"),
                ("Ch1", "lifetime", "A_Ch1_lifetime.asc"),
                ("Ch2", "int", "B_Ch2_int.asc"),
            ]
        );
    }
}
