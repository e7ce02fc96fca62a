//! Core application logic for the pypas client
//!
//! This module contains the transport adapter for the pypas service, the zip
//! bundle codec, the exercise lifecycle manager and the interaction seam the
//! manager uses to talk to the user.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pypas::app::{ClientConfig, Endpoints, ExerciseManager, ExerciseSettings, PypasClient};
//! use pypas::app::{Interaction, MessageKind};
//!
//! struct Quiet;
//!
//! impl Interaction for Quiet {
//!     fn notify(&self, _kind: MessageKind, message: &str) {
//!         println!("{}", message);
//!     }
//!
//!     fn confirm(&self, _question: &str) -> bool {
//!         false
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PypasClient::new(ClientConfig::default(), Endpoints::default())?;
//! let manager = ExerciseManager::new(ExerciseSettings::default(), client, Quiet, ".");
//!
//! // Download an exercise into ./hello-world
//! manager.get("hello-world", "my-token").await?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod client;
pub mod exercise;
pub mod interaction;
pub mod models;

// Re-export main public API
pub use archive::{
    extract_bundle, format_size, pack_directory, BundleOutput, ExtractTarget, PackReport,
    PathFilter,
};
pub use client::{ClientConfig, Endpoints, PypasClient};
pub use exercise::{
    DriftCheck, Exercise, ExerciseManager, ExerciseSettings, FileChange, LocalExerciseState,
    MergeReport,
};
pub use interaction::{Interaction, MessageKind};
pub use models::{
    ApiResponse, AssignmentRecord, ExerciseEntry, FrameListing, FrameLog, ListFilter,
    RemoteExerciseInfo,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Ensure public API is accessible
        let config = ClientConfig::default();
        assert!(config.show_progress);
        assert_eq!(ExerciseSettings::default().large_file_size, 1_048_576);
    }
}
