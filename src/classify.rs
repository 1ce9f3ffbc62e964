//! Source path classification
//!
//! Decides whether a path refers to a file or a directory. Paths that don't
//! exist yet are classified from their final segment: an extension means
//! file, no extension means directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Kind of a backup source path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathKind {
    File,
    Directory,
}

impl std::fmt::Display for PathKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => f.write_str("File"),
            Self::Directory => f.write_str("Directory"),
        }
    }
}

/// Classify a path as file or directory
///
/// Always returns a classification; repeated calls on an unchanged
/// filesystem return the same result.
pub fn classify(path: &Path) -> PathKind {
    if path.is_file() {
        PathKind::File
    } else if path.is_dir() {
        PathKind::Directory
    } else if path.extension().is_some() {
        PathKind::File
    } else {
        PathKind::Directory
    }
}
