//! Zip packaging of per-page working directories
//!
//! Packages every file under a working directory into one `.zip`
//! preserving relative paths, then removes the directory. All-or-nothing:
//! a failed write discards the partial archive and leaves the working
//! directory untouched so no data is silently lost.

use crate::error::{ArchiveError, Result};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Package `dir` into `archive_path`, then remove `dir`
///
/// On a write failure the partially written archive is deleted and `dir`
/// is preserved for inspection or retry. A cleanup failure after a
/// successful write is reported as [`ArchiveError::CleanupFailed`]; the
/// archive itself is complete in that case.
pub fn archive_directory(dir: &Path, archive_path: &Path) -> Result<()> {
    if let Err(e) = write_archive(dir, archive_path) {
        if let Err(remove_err) = std::fs::remove_file(archive_path) {
            if remove_err.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    archive = %archive_path.display(),
                    error = %remove_err,
                    "failed to remove partial archive"
                );
            }
        }
        return Err(e.into());
    }

    std::fs::remove_dir_all(dir).map_err(|e| ArchiveError::CleanupFailed {
        dir: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    info!(dir = %dir.display(), archive = %archive_path.display(), "directory archived");
    Ok(())
}

fn write_archive(dir: &Path, archive_path: &Path) -> std::result::Result<(), ArchiveError> {
    let file = File::create(archive_path).map_err(|e| ArchiveError::CreateFailed {
        archive: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    add_directory(&mut zip, dir, dir, archive_path, options)?;

    zip.finish().map_err(|e| ArchiveError::CreateFailed {
        archive: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Recursively add `current`'s files to the archive with paths relative
/// to `base`
fn add_directory(
    zip: &mut ZipWriter<File>,
    base: &Path,
    current: &Path,
    archive_path: &Path,
    options: FileOptions,
) -> std::result::Result<(), ArchiveError> {
    let entry_failed = |file: &Path, reason: String| ArchiveError::EntryFailed {
        archive: archive_path.to_path_buf(),
        file: file.to_path_buf(),
        reason,
    };

    let mut entries: Vec<_> = std::fs::read_dir(current)
        .map_err(|e| entry_failed(current, e.to_string()))?
        .collect::<std::io::Result<_>>()
        .map_err(|e| entry_failed(current, e.to_string()))?;
    // Stable entry order keeps archives deterministic across filesystems
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            add_directory(zip, base, &path, archive_path, options)?;
            continue;
        }

        let relative = path
            .strip_prefix(base)
            .map_err(|e| entry_failed(&path, e.to_string()))?;
        let name = relative.to_string_lossy().replace('\\', "/");
        debug!(file = %path.display(), entry = %name, "adding archive entry");

        zip.start_file(name, options)
            .map_err(|e| entry_failed(&path, e.to_string()))?;
        let mut source = File::open(&path).map_err(|e| entry_failed(&path, e.to_string()))?;
        std::io::copy(&mut source, zip).map_err(|e| entry_failed(&path, e.to_string()))?;
    }
    Ok(())
}
