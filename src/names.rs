//! Archive name generation
//!
//! Derives a filesystem-safe archive base name from a source path by
//! flattening its segments with a double-underscore delimiter, then makes
//! it unique at the destination with a random suffix when the name is
//! already taken.

use std::path::{Component, Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::classify::PathKind;
use crate::error::{VaultError, VaultResult};

/// Maximum length of the final archive path; anything at or beyond this
/// fails the source instead of being silently truncated.
const MAX_ARCHIVE_PATH_LEN: usize = 255;

/// Delimiter replacing path separators in archive names
const SEGMENT_DELIMITER: &str = "__";

/// A generated archive name, unique at the destination
#[derive(Debug, Clone)]
pub struct GeneratedName {
    /// Full path of the archive to create (`<dest>/<name>.zip`)
    pub archive_path: PathBuf,
    /// File name of the archive (`<name>.zip`)
    pub archive_name: String,
    /// The originally intended name, when a collision forced a rename
    pub renamed_from: Option<String>,
}

/// Generate a collision-free archive name for a source path
///
/// # Errors
///
/// Returns [`VaultError::NameTooLong`] when the final archive path reaches
/// the filesystem name limit. This fails the one source, not the run.
pub fn generate(source: &Path, destination_dir: &Path, kind: PathKind) -> VaultResult<GeneratedName> {
    let segments = path_segments(source);

    let base = match kind {
        PathKind::File => {
            let (leaf, parents) = match segments.split_last() {
                Some((leaf, parents)) => (leaf.as_str(), parents),
                None => ("unnamed", &[] as &[String]),
            };
            if parents.is_empty() {
                leaf.to_string()
            } else {
                format!("{}{}{}", parents.join(SEGMENT_DELIMITER), SEGMENT_DELIMITER, leaf)
            }
        }
        PathKind::Directory => segments.join(SEGMENT_DELIMITER),
    };
    // Joining normal components never yields leading or trailing
    // delimiters, but a root-only path yields nothing at all.
    let mut name = if base.is_empty() { "unnamed".to_string() } else { base };
    let mut renamed_from = None;

    // Collision check against what already exists at the destination.
    if destination_dir.join(zip_name(&name)).exists() {
        let token = Uuid::new_v4().simple().to_string();
        let unique = format!("{}{}{}", name, SEGMENT_DELIMITER, &token[..12]);
        warn!(
            intended = %zip_name(&name),
            chosen = %zip_name(&unique),
            "archive name already exists, using unique suffix"
        );
        renamed_from = Some(zip_name(&name));
        name = unique;
    }

    let archive_name = zip_name(&name);
    let archive_path = destination_dir.join(&archive_name);
    let path_len = archive_path.to_string_lossy().len();
    if path_len >= MAX_ARCHIVE_PATH_LEN {
        return Err(VaultError::NameTooLong {
            path: archive_path.display().to_string(),
            length: path_len,
        });
    }

    Ok(GeneratedName {
        archive_path,
        archive_name,
        renamed_from,
    })
}

fn zip_name(base: &str) -> String {
    format!("{}.zip", base)
}

/// Normal path segments of a source path, with any drive/volume prefix and
/// root stripped
fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
