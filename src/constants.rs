//! Application constants for the pypas client
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

/// Environment variable names
pub mod env {
    /// Overrides the service base URL
    pub const BASE_URL: &str = "PYPAS_BASE_URL";

    /// Overrides the per-exercise config file name
    pub const EXERCISE_CONFIG_FILE: &str = "EXERCISE_CONFIG_FILE";

    /// Overrides the global user config file path
    pub const MAIN_CONFIG_FILE: &str = "MAIN_CONFIG_FILE";

    /// Overrides the maximum upload size in bytes
    pub const LARGE_FILE_SIZE: &str = "LARGE_FILE_SIZE";

    /// Overrides the version assumed for exercises without one
    pub const DEFAULT_EXERCISE_VERSION: &str = "DEFAULT_EXERCISE_VERSION";

    /// Overrides the name of the variable that disables version checks
    pub const SKIP_VERSION_CHECK_VAR: &str = "PYPAS_SKIP_VERSION_CHECK_VAR";

    /// Default name of the variable that disables version checks
    pub const SKIP_VERSION_CHECK: &str = "PYPAS_SKIP_VERSION_CHECK";

    /// Python interpreter used by `pypas run`
    pub const PYTHON: &str = "PYPAS_PYTHON";
}

/// Remote service endpoints
pub mod service {
    /// Default service base URL
    pub const BASE_URL: &str = "https://pypas.es/";

    /// Token validation, `{token}` is replaced
    pub const AUTH_PATH: &str = "/access/auth/{token}/";

    /// Exercise bundle download
    pub const GET_EXERCISE_PATH: &str = "/exercises/get/{exercise_slug}/";

    /// Exercise version info
    pub const EXERCISE_INFO_PATH: &str = "/exercises/info/{exercise_slug}/";

    /// Assignment upload
    pub const PUT_ASSIGNMENT_PATH: &str = "/assignments/put/{exercise_slug}/";

    /// Assignment log
    pub const LOG_PATH: &str = "/assignments/log/";

    /// Exercise listing
    pub const LIST_EXERCISES_PATH: &str = "/exercises/list/";

    /// Assignment (or whole frame) pull
    pub const PULL_PATH: &str = "/assignments/pull/{item_slug}/";

    /// Documentation page for updating exercises
    pub const UPDATE_DOCS_URL: &str = "https://pypas.es/docs/#actualizar-un-ejercicio";
}

/// HTTP client configuration constants
pub mod http {
    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("pypas-cli/", env!("CARGO_PKG_VERSION"));

    /// Form field carrying the access token
    pub const TOKEN_FIELD: &str = "token";

    /// Multipart field carrying the uploaded bundle
    pub const FILE_FIELD: &str = "file";

    /// Chunk size used to stream uploads (8KB)
    pub const UPLOAD_CHUNK_SIZE: usize = 8 * 1024;
}

/// Exercise and workspace constants
pub mod exercise {
    /// Per-exercise config file name
    pub const CONFIG_FILE: &str = ".pypas.toml";

    /// Global user config file name (inside the home directory)
    pub const MAIN_CONFIG_FILE: &str = ".pypas.toml";

    /// Version assumed when the exercise config has none
    pub const DEFAULT_VERSION: &str = "0.1.0";

    /// Maximum size of an uploaded bundle (1 MiB)
    pub const LARGE_FILE_SIZE: u64 = 1024 * 1024;

    /// Test command used when the exercise does not declare one
    pub const DEFAULT_TEST_CMD: &str = "pytest";

    /// Entry point run by `pypas run`
    pub const MAIN_FILE: &str = "main.py";

    /// Default Python interpreter
    pub const DEFAULT_PYTHON: &str = "python3";

    /// Exercise documentation opened by `pypas doc`
    pub const DOCS_FILE: &str = "docs/README.pdf";
}

/// File operation constants
pub mod files {
    /// Bundle extension
    pub const BUNDLE_EXTENSION: &str = "zip";

    /// Backup file suffix
    pub const BACKUP_FILE_SUFFIX: &str = ".bak";

    /// Prefix for temporary bundles and staging directories
    pub const TEMP_PREFIX: &str = "pypas-";

    /// Chunk size for byte-for-byte file comparison (8KB)
    pub const COMPARE_CHUNK_SIZE: usize = 8 * 1024;

    /// Permissions for the user config file holding the token (Unix)
    pub const TOKEN_FILE_PERMISSIONS: u32 = 0o600;
}

// Re-export commonly used constants at module level for convenience
pub use env::SKIP_VERSION_CHECK as ENV_SKIP_VERSION_CHECK;
pub use exercise::{CONFIG_FILE as EXERCISE_CONFIG_FILE, DEFAULT_VERSION, LARGE_FILE_SIZE};
pub use http::USER_AGENT;
pub use service::BASE_URL;
