//! Error types for the pypas client
//!
//! This module defines error types for every component of the application.
//! Errors are designed to be actionable: most variants carry enough context to
//! tell the student what went wrong and how to fix it.

use std::path::PathBuf;
use thiserror::Error;

/// Authentication and token storage errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No token stored in the user config file
    #[error("You must be authenticated before running this command. Run 'pypas auth <TOKEN>'")]
    MissingToken,

    /// Token was refused by the service
    #[error("User cannot be authenticated: {message}")]
    Rejected { message: String },

    /// Token entered interactively was empty
    #[error("Access token cannot be empty")]
    EmptyToken,

    /// HTTP request failed during authentication
    #[error("HTTP request failed during authentication")]
    Http(#[from] reqwest::Error),

    /// File I/O error during token storage
    #[error("Failed to access token storage")]
    Storage(#[from] std::io::Error),

    /// Stored config could not be serialized back to TOML
    #[error("Failed to write token to {path}: {reason}")]
    Serialize { path: PathBuf, reason: String },
}

/// HTTP transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP request error (DNS, connection, body decoding)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error: HTTP {status} from {url}")]
    ServerError { status: u16, url: String },

    /// URL could not be built from the configured template
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Service answered but refused the operation
    #[error("{message}")]
    Rejected { message: String },

    /// I/O error while streaming a body to or from disk
    #[error("File I/O error during transfer")]
    Io(#[from] std::io::Error),
}

/// Bundle packaging and extraction errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Zip codec failure
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error while reading or writing bundle contents
    #[error("File I/O error while processing bundle")]
    Io(#[from] std::io::Error),

    /// Directory walk failure
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Pattern in exclude/backup list is not a valid glob
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Bundle entry would be written outside the target directory
    #[error("Unsafe path in bundle: {name}")]
    UnsafeEntry { name: String },
}

/// Exercise lifecycle errors
#[derive(Error, Debug)]
pub enum ExerciseError {
    /// Current directory has no exercise config
    #[error("Current folder does not seem to be a pypas exercise")]
    NotInsideExercise { dir: PathBuf },

    /// Exercise config is missing a required key
    #[error("Exercise config file is corrupt: {path} (missing '{field}')")]
    ConfigCorrupt { path: PathBuf, field: String },

    /// Exercise config is not valid TOML
    #[error("Exercise config file is corrupt: {path} ({reason})")]
    ConfigUnreadable { path: PathBuf, reason: String },

    /// Slug cannot be used as a folder name
    #[error("Invalid exercise or item slug: '{slug}'")]
    InvalidSlug { slug: String },

    /// Outgoing bundle exceeds the configured size limit
    #[error("Aborting: zipfile is too large → {size_display}")]
    BundleTooLarge {
        size: u64,
        limit: u64,
        size_display: String,
    },

    /// Test or run command could not be launched
    #[error("Failed to launch '{command}': {reason}")]
    CommandFailed { command: String, reason: String },

    /// I/O error touching the workspace
    #[error("Workspace I/O error")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format in {path}: {source}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Home directory could not be determined
    #[error("Could not determine the user's home directory")]
    NoHomeDir,

    /// I/O error reading configuration
    #[error("Failed to read configuration")]
    Io(#[from] std::io::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Archive error
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Exercise lifecycle error
    #[error(transparent)]
    Exercise(#[from] ExerciseError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("{message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "authentication",
            AppError::Transport(_) => "transport",
            AppError::Archive(_) => "archive",
            AppError::Exercise(_) => "exercise",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }

    /// Remediation hint shown below the error message, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::Auth(AuthError::MissingToken) => {
                Some("Run 'pypas auth --help' for more information.")
            }
            AppError::Auth(AuthError::Rejected { .. }) => {
                Some("Check the access token with the administrator.")
            }
            AppError::Exercise(ExerciseError::NotInsideExercise { .. }) => {
                Some("Move into the exercise folder (the one holding its config file).")
            }
            AppError::Exercise(ExerciseError::BundleTooLarge { .. }) => {
                Some("Check contents (hidden files) or contact with administrator.")
            }
            AppError::Exercise(ExerciseError::ConfigCorrupt { .. })
            | AppError::Exercise(ExerciseError::ConfigUnreadable { .. }) => {
                Some("Run 'pypas update' or download the exercise again.")
            }
            AppError::Transport(TransportError::Http(_)) => {
                Some("Check your network connection and try again.")
            }
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Authentication result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Transport result type alias
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Archive result type alias
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Exercise result type alias
pub type ExerciseResult<T> = std::result::Result<T, ExerciseError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
