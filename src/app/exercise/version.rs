//! Exercise references and version drift detection

use std::path::PathBuf;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::app::client::PypasClient;
use crate::constants::files;

/// Outcome of comparing the local version with the published one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftCheck {
    /// Checks disabled through the environment
    Skipped,
    /// Local and published versions are equal
    UpToDate,
    /// Published version could not be determined
    Unknown,
    /// The service publishes a different version
    Outdated { local: String, remote: String },
}

impl DriftCheck {
    pub fn is_outdated(&self) -> bool {
        matches!(self, DriftCheck::Outdated { .. })
    }
}

/// An exercise identified by its slug
///
/// The published version is fetched at most once per instance.
#[derive(Debug)]
pub struct Exercise {
    slug: String,
    latest_version: OnceCell<Option<String>>,
}

impl Exercise {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            latest_version: OnceCell::new(),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Bundle file name, `<slug>.zip`
    pub fn bundle_name(&self) -> String {
        format!("{}.{}", self.slug, files::BUNDLE_EXTENSION)
    }

    /// Workspace folder name, `<slug>`
    pub fn folder(&self) -> PathBuf {
        PathBuf::from(&self.slug)
    }

    /// Published version, fetched on first use
    ///
    /// A failed lookup is logged and remembered as unknown.
    pub async fn latest_version(&self, client: &PypasClient) -> Option<&str> {
        self.latest_version
            .get_or_init(|| async {
                match client.exercise_info(&self.slug).await {
                    Ok(info) => {
                        debug!("Published version of {}: {:?}", self.slug, info.version);
                        info.version
                    }
                    Err(e) => {
                        warn!("Could not get exercise info for {}: {}", self.slug, e);
                        None
                    }
                }
            })
            .await
            .as_deref()
    }

    /// Compare `local_version` against the published version
    pub async fn check_drift(
        &self,
        client: &PypasClient,
        local_version: &str,
        skip: bool,
    ) -> DriftCheck {
        if skip {
            debug!("Version check skipped for {}", self.slug);
            return DriftCheck::Skipped;
        }
        match self.latest_version(client).await {
            Some(remote) if !remote.is_empty() && !local_version.is_empty() => {
                if remote == local_version {
                    DriftCheck::UpToDate
                } else {
                    DriftCheck::Outdated {
                        local: local_version.to_string(),
                        remote: remote.to_string(),
                    }
                }
            }
            _ => DriftCheck::Unknown,
        }
    }
}

impl std::fmt::Display for Exercise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug)
    }
}
