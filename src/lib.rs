//! pypas Library
//!
//! Client library for the pypas practical-assignments platform. Provides the
//! exercise lifecycle (download, update, package, upload), the zip bundle
//! codec and the HTTP transport used by the `pypas` command-line tool.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
