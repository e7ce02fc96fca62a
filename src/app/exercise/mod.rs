//! Exercise workspaces: local state, version drift, merges and the
//! lifecycle manager that ties them to the transport and archive layers

pub mod config;
pub mod lifecycle;
pub mod merge;
pub mod state;
pub mod version;

pub use config::ExerciseSettings;
pub use lifecycle::ExerciseManager;
pub use merge::{apply_update, backup_path, classify, FileChange, MergeReport, MergedFile};
pub use state::{find_nested_config, is_inside_exercise, LocalExerciseState};
pub use version::{DriftCheck, Exercise};
