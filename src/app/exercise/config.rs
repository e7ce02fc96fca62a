//! Runtime settings for exercise workspaces

use std::path::PathBuf;

use crate::constants::{env, exercise};

/// Settings handed to the lifecycle manager at construction
#[derive(Debug, Clone)]
pub struct ExerciseSettings {
    /// Per-exercise config file name
    pub config_file: String,
    /// Global user config path; a config file at this path is never an exercise
    pub main_config_file: PathBuf,
    /// Maximum uploaded bundle size in bytes (inclusive)
    pub large_file_size: u64,
    /// Version assumed for exercises without one
    pub default_version: String,
    /// Name of the variable that disables version checks
    pub skip_version_check_var: String,
    /// Version checks disabled
    pub skip_version_check: bool,
    /// Python interpreter used by `run`
    pub python: String,
    /// Directory for temporary bundles and staging trees
    pub temp_dir: PathBuf,
}

impl Default for ExerciseSettings {
    fn default() -> Self {
        Self {
            config_file: exercise::CONFIG_FILE.to_string(),
            main_config_file: dirs::home_dir()
                .map(|home| home.join(exercise::MAIN_CONFIG_FILE))
                .unwrap_or_default(),
            large_file_size: exercise::LARGE_FILE_SIZE,
            default_version: exercise::DEFAULT_VERSION.to_string(),
            skip_version_check_var: env::SKIP_VERSION_CHECK.to_string(),
            skip_version_check: false,
            python: exercise::DEFAULT_PYTHON.to_string(),
            temp_dir: std::env::temp_dir(),
        }
    }
}
