//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults for totals, batch sizes, timeouts)
//! - Load and export configuration structs
//! - CLI option value enums

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{ExportConfig, LoadConfig, LogFormat, LogLevel};
