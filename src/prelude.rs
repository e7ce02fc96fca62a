//! Prelude module for the pypas library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use pypas::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pypas::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load(None).await?;
//!     let (client_config, endpoints, settings) = config.to_runtime_config()?;
//!     let client = PypasClient::new(client_config, endpoints)?;
//!     let manager = ExerciseManager::new(settings, client, Terminal::new(), ".");
//!
//!     manager.zip(false).await?;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components that are used in most integrations
pub use crate::app::{
    // Transport
    ClientConfig,
    Endpoints,
    PypasClient,

    // Exercise lifecycle
    DriftCheck,
    Exercise,
    ExerciseManager,
    ExerciseSettings,
    LocalExerciseState,
    MergeReport,

    // Bundles
    BundleOutput,
    ExtractTarget,
    PackReport,
    PathFilter,

    // Interaction seam
    Interaction,
    MessageKind,
};

// Configuration and terminal front end
pub use crate::cli::Terminal;
pub use crate::config::AppConfig;

// Authentication functions
pub use crate::auth::{authenticate, clear_token, get_auth_status, save_token, AuthStatus};

// Commonly used constants
pub use crate::constants::{DEFAULT_VERSION, EXERCISE_CONFIG_FILE, LARGE_FILE_SIZE, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};

// Common external crate re-exports for convenience
pub use tokio;
