//! Application constants for FLIM summary
//!
//! File naming conventions, export layout and default settings used
//! throughout the crate.

// =============================================================================
// File Naming
// =============================================================================

/// Default suffix filter for FLIM ASCII exports
pub const DEFAULT_EXTENSION: &str = ".asc";

/// Separator between identifier tokens in a filename
pub const TOKEN_SEPARATOR: char = '_';

/// Marker that starts a channel tag inside the channel token
pub const CHANNEL_MARKER: &str = "Ch";

/// Number of characters kept from the channel marker onwards ("Ch1")
pub const CHANNEL_TAG_LEN: usize = 3;

/// Number of trailing tokens (channel, variable) dropped to get the base name
pub const IDENTIFIER_TOKENS: usize = 2;

/// Separator between channel and variable in summary column labels
pub const LABEL_SEPARATOR: &str = "-";

// =============================================================================
// Sample Files
// =============================================================================

/// Lines starting with this prefix are ignored when loading samples
pub const COMMENT_PREFIX: char = '#';

// =============================================================================
// Export
// =============================================================================

/// Spreadsheet file written into the output directory
pub const EXPORT_FILENAME: &str = "export.xlsx";

/// Header of the row-label column in the summary table
pub const INDEX_COLUMN: &str = "Measurement";

// =============================================================================
// Configuration
// =============================================================================

/// Application directory name under the user config directory
pub const APP_CONFIG_DIR: &str = "flim-summary";

/// Configuration file name
pub const CONFIG_FILENAME: &str = "config.toml";

/// Default scan root
pub const DEFAULT_ROOT: &str = ".";
