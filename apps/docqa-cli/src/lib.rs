//! Command-line boundary for the docqa engine.
pub mod files;
pub mod logging;
