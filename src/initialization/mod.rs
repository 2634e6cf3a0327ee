//! Application initialization.
//!
//! This module provides logger setup for the CLI binary and tests. All other
//! resources (worker connections, the file sink) are owned by the run
//! orchestration and acquired through their own modules.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
