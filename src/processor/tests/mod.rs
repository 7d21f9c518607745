//! Integration tests for the processor module
//!
//! Tests the complete summary pipeline using small FLIM export directories.
