//! File-level merge of an incoming bundle into a workspace
//!
//! Every incoming file is compared byte for byte with its workspace
//! counterpart. Identical files are left alone, missing files are added and
//! differing files are overwritten, optionally keeping a `.bak` copy first.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::app::archive::PathFilter;
use crate::constants::files;
use crate::errors::ExerciseResult;

/// Classification of an incoming file relative to the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    Unchanged,
    Added,
    Modified,
}

/// A file written to the workspace by a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// `Added` or `Modified`
    pub change: FileChange,
    /// Backup copy made before overwriting, relative to the workspace root
    pub backup: Option<PathBuf>,
}

/// Summary of a merge, in walk order
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub files: Vec<MergedFile>,
    pub unchanged: usize,
}

impl MergeReport {
    pub fn added(&self) -> impl Iterator<Item = &Path> {
        self.with_change(FileChange::Added)
    }

    pub fn updated(&self) -> impl Iterator<Item = &Path> {
        self.with_change(FileChange::Modified)
    }

    /// `(original, backup)` pairs
    pub fn backed_up(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.files
            .iter()
            .filter_map(|file| file.backup.as_deref().map(|backup| (file.path.as_path(), backup)))
    }

    /// Whether the merge wrote nothing
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn with_change(&self, change: FileChange) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter(move |file| file.change == change)
            .map(|file| file.path.as_path())
    }
}

/// Backup name for `path`: the `.bak` suffix appended to the full file name
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(files::BACKUP_FILE_SUFFIX);
    path.with_file_name(name)
}

/// Compare an incoming file with the current one
pub fn classify(incoming: &Path, current: &Path) -> io::Result<FileChange> {
    if !current.exists() {
        return Ok(FileChange::Added);
    }
    if same_contents(incoming, current)? {
        Ok(FileChange::Unchanged)
    } else {
        Ok(FileChange::Modified)
    }
}

/// Merge the staging tree into `workspace` and delete the staging tree
///
/// When `backup` is set, a modified file matching `backup_filter` is copied
/// to its `.bak` name before being overwritten. Added files are never backed
/// up. The staging tree is deleted even when the merge fails partway.
pub fn apply_update(
    staging: &Path,
    workspace: &Path,
    backup_filter: &PathFilter,
    backup: bool,
) -> ExerciseResult<MergeReport> {
    let merged = merge_tree(staging, workspace, backup_filter, backup);
    if let Err(e) = fs::remove_dir_all(staging) {
        debug!("Staging directory couldn't be removed: '{}': {}", staging.display(), e);
    }
    merged
}

fn merge_tree(
    staging: &Path,
    workspace: &Path,
    backup_filter: &PathFilter,
    backup: bool,
) -> ExerciseResult<MergeReport> {
    let mut report = MergeReport::default();

    for entry in WalkDir::new(staging).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = match entry.path().strip_prefix(staging) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };
        let current = workspace.join(&relative);

        let change = classify(entry.path(), &current)?;
        let mut backup_copy = None;
        match change {
            FileChange::Unchanged => {
                report.unchanged += 1;
                continue;
            }
            FileChange::Modified if backup && backup_filter.is_match(&relative) => {
                let backup_file = backup_path(&current);
                debug!("Backup {} → {}", current.display(), backup_file.display());
                fs::copy(&current, &backup_file)?;
                backup_copy = Some(backup_path(&relative));
            }
            FileChange::Modified | FileChange::Added => {}
        }

        if let Some(parent) = current.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &current)?;
        report.files.push(MergedFile {
            path: relative,
            change,
            backup: backup_copy,
        });
    }

    Ok(report)
}

/// Byte-for-byte comparison, reading both files in chunks
fn same_contents(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }

    let mut file_a = File::open(a)?;
    let mut file_b = File::open(b)?;
    let mut buf_a = vec![0_u8; files::COMPARE_CHUNK_SIZE];
    let mut buf_b = vec![0_u8; files::COMPARE_CHUNK_SIZE];

    loop {
        let read = read_full(&mut file_a, &mut buf_a)?;
        if read != read_full(&mut file_b, &mut buf_b)? || buf_a[..read] != buf_b[..read] {
            return Ok(false);
        }
        if read == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the file allows
fn read_full(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
