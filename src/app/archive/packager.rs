//! Bundle creation from a workspace directory

use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::app::archive::filter::{posix_path, PathFilter};
use crate::constants::files;
use crate::errors::ArchiveResult;

/// Where the packager writes the bundle
#[derive(Debug, Clone)]
pub enum BundleOutput {
    /// A named file, usually `<root>/<slug>.zip`
    Named(PathBuf),
    /// A fresh temporary file inside the given directory, removed by the
    /// caller once uploaded
    Temp(PathBuf),
}

/// Result of packaging a directory
#[derive(Debug, Clone)]
pub struct PackReport {
    /// Path of the written bundle
    pub bundle: PathBuf,
    /// Files written to the bundle, relative to the root
    pub included: Vec<PathBuf>,
    /// Files skipped by the exclusion filter, relative to the root
    pub excluded: Vec<PathBuf>,
}

/// Zip every regular file under `root` that the exclusion filter lets through
///
/// Entries keep their path relative to `root` with `/` separators. Files named
/// `bundle_name` (the exercise's own `<slug>.zip`) are never packed, whatever
/// the output. A temporary bundle is only kept once it is fully written.
pub fn pack_directory(
    root: &Path,
    exclude: &PathFilter,
    output: BundleOutput,
    bundle_name: &str,
) -> ArchiveResult<PackReport> {
    match output {
        BundleOutput::Named(path) => {
            let file = File::create(&path)?;
            write_bundle(root, exclude, file, path, bundle_name)
        }
        BundleOutput::Temp(dir) => {
            let temp = tempfile::Builder::new()
                .prefix(files::TEMP_PREFIX)
                .suffix(&format!(".{}", files::BUNDLE_EXTENSION))
                .tempfile_in(&dir)?;
            let report = write_bundle(
                root,
                exclude,
                temp.as_file(),
                temp.path().to_path_buf(),
                bundle_name,
            )?;
            temp.keep().map_err(|e| e.error)?;
            Ok(report)
        }
    }
}

fn write_bundle<W: Write + Seek>(
    root: &Path,
    exclude: &PathFilter,
    sink: W,
    bundle: PathBuf,
    bundle_name: &str,
) -> ArchiveResult<PackReport> {
    let bundle_canonical = bundle.canonicalize()?;
    let root = root.canonicalize()?;
    debug!("Packing {} into {}", root.display(), bundle.display());

    let mut writer = ZipWriter::new(sink);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut included = Vec::new();
    let mut excluded = Vec::new();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file()
            || entry.path() == bundle_canonical
            || entry.file_name() == bundle_name
        {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(&root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        if exclude.is_match(&relative) {
            debug!("Excluding {}", relative.display());
            excluded.push(relative);
            continue;
        }

        writer.start_file(posix_path(&relative), options)?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut writer)?;
        included.push(relative);
    }

    writer.finish()?;
    debug!(
        "Packed {} files ({} excluded)",
        included.len(),
        excluded.len()
    );

    Ok(PackReport {
        bundle,
        included,
        excluded,
    })
}

/// Human-readable file size: `B`, `KB` or `MB` with one decimal
pub fn format_size(size: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let bytes = size as f64;
    if bytes < KB {
        format!("{} B", size)
    } else if bytes < MB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{:.1} MB", bytes / MB)
    }
}
