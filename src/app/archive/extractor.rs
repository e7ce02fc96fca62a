//! Bundle extraction into a target or staging directory

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use crate::constants::files;
use crate::errors::{ArchiveError, ArchiveResult};

/// Where the extractor writes the bundle contents
#[derive(Debug, Clone)]
pub enum ExtractTarget {
    /// A directory that is created if absent
    Folder(PathBuf),
    /// A fresh staging directory inside the given directory, owned by the
    /// caller afterwards
    TempDir(PathBuf),
}

/// Extract every entry of `bundle` and delete the bundle afterwards
///
/// Entries that would land outside the target (absolute names, `..`) abort
/// the extraction with `ArchiveError::UnsafeEntry`. The bundle is deleted
/// whether or not extraction succeeds, and a staging directory is only kept
/// on success. Returns the directory that holds the extracted contents.
pub fn extract_bundle(bundle: &Path, target: ExtractTarget) -> ArchiveResult<PathBuf> {
    let (target_dir, staging) = match target {
        ExtractTarget::Folder(path) => {
            fs::create_dir_all(&path)?;
            (path, None)
        }
        ExtractTarget::TempDir(parent) => {
            let staging = tempfile::Builder::new()
                .prefix(files::TEMP_PREFIX)
                .tempdir_in(parent)?;
            (staging.path().to_path_buf(), Some(staging))
        }
    };
    debug!(
        "Extracting {} into {}",
        bundle.display(),
        target_dir.display()
    );

    let extracted = inflate(bundle, &target_dir);
    let removed = remove_bundle(bundle);
    extracted?;
    removed?;

    Ok(staging.map_or(target_dir, |staging| staging.keep()))
}

fn inflate(bundle: &Path, target_dir: &Path) -> ArchiveResult<()> {
    let mut archive = ZipArchive::new(File::open(bundle)?)?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ArchiveError::UnsafeEntry {
                name: entry.name().to_string(),
            })?;
        let destination = target_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&destination)?;
            continue;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut output = File::create(&destination)?;
        io::copy(&mut entry, &mut output)?;
    }
    Ok(())
}

/// Remove a consumed bundle, tolerating files that are gone or locked
fn remove_bundle(bundle: &Path) -> ArchiveResult<()> {
    match fs::remove_file(bundle) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            debug!("Temporary file couldn't be removed: '{}'", bundle.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
