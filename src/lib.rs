//! ClickSift Library
//!
//! Cleans phishing-simulation click exports so they reflect genuine human
//! clicks. This library provides functionality to:
//!
//! - Load CSV exports keeping every original column
//! - Parse the Python-literal `details` payload safely and pull out the client IP
//! - Drop mail-security scanners and relay infrastructure by IP
//! - Collapse repeated clicks per person and IP (same minute, then 5-minute buckets)
//! - Write the cleaned table back to CSV
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use clicksift::{InfrastructureIpSet, load_records, pipeline, write_records};
//!
//! let table = load_records(Path::new("phishing_results.csv"), "email")?;
//! let cleaned = pipeline::run(table, &InfrastructureIpSet::builtin())?;
//! write_records(Path::new("filtered.csv"), &cleaned)?;
//! # Ok::<(), clicksift::ClickSiftError>(())
//! ```

pub mod app;
pub mod banner;
pub mod classify;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod errors;
pub mod extract;
pub mod literal;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod records;
pub mod timeparse;
pub mod writer;

// Re-export commonly used types and functions for convenience
pub use app::App;
pub use classify::{ExclusionReason, InfrastructureIpSet};
pub use config::{Config, FileConfig};
pub use errors::{ClickSiftError, ErrorCategory, Result};
pub use literal::Literal;
pub use loader::load_records;
pub use records::{CleanedTable, ClickRecord, RawRecord, RecordTable, Schema};
pub use writer::write_records;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
