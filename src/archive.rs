//! ZIP archive creation and extraction
//!
//! Thin wrapper over the `zip` crate. Archives are standard ZIP with
//! deflate compression, one entry per file, directory entries preserving
//! relative paths.
//!
//! Two layouts are produced:
//!
//! - single-source archives hold a file at the root under its own name, or
//!   a directory's subtree relative to the directory itself;
//! - combined archives wrap every source under its base name at the root,
//!   so extraction reproduces each source's base name.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::classify::PathKind;
use crate::error::{VaultError, VaultResult};

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Create an archive containing exactly one source
///
/// A file lands at the archive root under its own name. A directory's
/// subtree is stored relative to the directory, so extracting into the
/// original path reproduces it exactly.
pub fn compress_one(source: &Path, kind: PathKind, zip_path: &Path) -> VaultResult<()> {
    let file = File::create(zip_path)
        .map_err(|e| VaultError::Io(format!("Failed to create archive {}: {}", zip_path.display(), e)))?;
    let mut writer = ZipWriter::new(file);

    match kind {
        PathKind::File => add_file(&mut writer, source, &leaf_name(source))?,
        PathKind::Directory => add_tree(&mut writer, source, "")?,
    }

    writer.finish()?;
    Ok(())
}

/// Create one archive containing every source, each under its base name
pub fn compress_many(sources: &[(PathBuf, PathKind)], zip_path: &Path) -> VaultResult<()> {
    let file = File::create(zip_path)
        .map_err(|e| VaultError::Io(format!("Failed to create archive {}: {}", zip_path.display(), e)))?;
    let mut writer = ZipWriter::new(file);

    for (source, kind) in sources {
        let base = leaf_name(source);
        match kind {
            PathKind::File => add_file(&mut writer, source, &base)?,
            PathKind::Directory => {
                writer.add_directory(format!("{}/", base), file_options())?;
                add_tree(&mut writer, source, &base)?;
            }
        }
    }

    writer.finish()?;
    Ok(())
}

/// Extract an archive into a destination directory
pub fn extract(zip_path: &Path, destination: &Path) -> VaultResult<()> {
    let file = File::open(zip_path)
        .map_err(|e| VaultError::Io(format!("Failed to open archive {}: {}", zip_path.display(), e)))?;
    let mut archive = ZipArchive::new(file)?;
    std::fs::create_dir_all(destination)
        .map_err(|e| VaultError::Io(format!("Failed to create {}: {}", destination.display(), e)))?;
    archive.extract(destination)?;
    Ok(())
}

/// Add one file entry to the archive
fn add_file(writer: &mut ZipWriter<File>, source: &Path, entry_name: &str) -> VaultResult<()> {
    writer.start_file(entry_name, file_options())?;
    let mut reader = File::open(source)
        .map_err(|e| VaultError::Io(format!("Failed to read {}: {}", source.display(), e)))?;
    io::copy(&mut reader, writer)
        .map_err(|e| VaultError::Io(format!("Failed to compress {}: {}", source.display(), e)))?;
    Ok(())
}

/// Add a directory subtree to the archive under the given prefix
fn add_tree(writer: &mut ZipWriter<File>, dir: &Path, prefix: &str) -> VaultResult<()> {
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry
            .map_err(|e| VaultError::Io(format!("Failed to walk {}: {}", dir.display(), e)))?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| VaultError::Io(format!("Failed to relativize path: {}", e)))?;
        let entry_name = zip_entry_name(prefix, relative);

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{}/", entry_name), file_options())?;
        } else if entry.file_type().is_file() {
            add_file(writer, entry.path(), &entry_name)?;
        }
    }
    Ok(())
}

/// Build a `/`-separated zip entry name from a prefix and a relative path
fn zip_entry_name(prefix: &str, relative: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !prefix.is_empty() {
        parts.push(prefix.to_string());
    }
    parts.extend(relative.components().filter_map(|c| match c {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
    }));
    parts.join("/")
}

/// Final path segment of a source, used as its in-archive base name
fn leaf_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}
