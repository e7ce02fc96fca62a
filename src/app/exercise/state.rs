//! Per-exercise state stored in the exercise config file
//!
//! The file is written by the service inside every bundle and only changes
//! when an update brings a new copy. The client reads it and never writes it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::app::archive::PathFilter;
use crate::app::exercise::config::ExerciseSettings;
use crate::errors::{ArchiveResult, ExerciseError, ExerciseResult};

/// On-disk shape of the exercise config
#[derive(Debug, Deserialize)]
struct RawExerciseConfig {
    slug: Option<String>,
    version: Option<toml::Value>,
    test_cmd: Option<String>,
    #[serde(default)]
    exclude_from_zip: Vec<String>,
    #[serde(default)]
    backup_on_update: Vec<String>,
}

/// Local metadata of an exercise workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalExerciseState {
    /// Config file this state was read from
    pub path: PathBuf,
    pub slug: String,
    pub version: String,
    pub test_cmd: Option<String>,
    pub exclude_from_zip: Vec<String>,
    pub backup_on_update: Vec<String>,
}

impl LocalExerciseState {
    /// Read the exercise config of `dir`
    ///
    /// # Errors
    ///
    /// `NotInsideExercise` when `dir` holds no exercise config (or only the
    /// global user config), `ConfigUnreadable`/`ConfigCorrupt` when the file
    /// is invalid.
    pub fn load(dir: &Path, settings: &ExerciseSettings) -> ExerciseResult<Self> {
        if !is_inside_exercise(dir, settings) {
            return Err(ExerciseError::NotInsideExercise {
                dir: dir.to_path_buf(),
            });
        }
        let path = config_path(dir, settings);
        let content = fs::read_to_string(&path)?;
        Self::parse(&path, &content, &settings.default_version)
    }

    /// Parse config contents read from `path`
    pub fn parse(path: &Path, content: &str, default_version: &str) -> ExerciseResult<Self> {
        let raw: RawExerciseConfig =
            toml::from_str(content).map_err(|e| ExerciseError::ConfigUnreadable {
                path: path.to_path_buf(),
                reason: e.message().to_string(),
            })?;

        let slug = raw
            .slug
            .filter(|slug| !slug.trim().is_empty())
            .ok_or_else(|| ExerciseError::ConfigCorrupt {
                path: path.to_path_buf(),
                field: "slug".to_string(),
            })?;
        let version = match raw.version {
            Some(toml::Value::String(version)) => version,
            Some(other) => other.to_string(),
            None => default_version.to_string(),
        };

        Ok(Self {
            path: path.to_path_buf(),
            slug,
            version,
            test_cmd: raw.test_cmd.filter(|cmd| !cmd.trim().is_empty()),
            exclude_from_zip: raw.exclude_from_zip,
            backup_on_update: raw.backup_on_update,
        })
    }

    /// Filter for paths left out of outgoing bundles
    pub fn exclude_filter(&self) -> ArchiveResult<PathFilter> {
        PathFilter::from_patterns(&self.exclude_from_zip)
    }

    /// Filter for paths backed up before an update overwrites them
    pub fn backup_filter(&self) -> ArchiveResult<PathFilter> {
        PathFilter::from_patterns(&self.backup_on_update)
    }
}

/// Path of the exercise config inside `dir`
pub fn config_path(dir: &Path, settings: &ExerciseSettings) -> PathBuf {
    dir.join(&settings.config_file)
}

/// Whether `dir` itself is an exercise workspace
///
/// Only the config directly inside `dir` counts, and the global user config
/// (which shares the default file name) is never taken for an exercise.
pub fn is_inside_exercise(dir: &Path, settings: &ExerciseSettings) -> bool {
    let path = config_path(dir, settings);
    if !path.is_file() {
        return false;
    }
    match (path.canonicalize(), settings.main_config_file.canonicalize()) {
        (Ok(local), Ok(main)) => local != main,
        _ => true,
    }
}

/// First exercise config found strictly below `dir`, relative to it
pub fn find_nested_config(dir: &Path, settings: &ExerciseSettings) -> Option<PathBuf> {
    let nested = WalkDir::new(dir)
        .min_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_type().is_file() && entry.file_name() == settings.config_file.as_str()
        })?;

    let relative = nested
        .path()
        .strip_prefix(dir)
        .unwrap_or_else(|_| nested.path())
        .to_path_buf();
    debug!("Found nested exercise config: {}", relative.display());
    Some(relative)
}
