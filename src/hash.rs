//! Content hashing for files and directory trees
//!
//! Files are digested from their raw bytes. Directories get a composite
//! digest: every contained file contributes a `relativePath:digest` line,
//! the lines are sorted by relative path and joined with newlines, and the
//! resulting string is digested. A file that cannot be read contributes
//! `relativePath:ERROR` instead of aborting the whole directory hash, so
//! one unreadable file never poisons the rest of the tree.
//!
//! All digests are uppercase hex with no separators.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::VaultResult;

/// Supported digest algorithms
///
/// The identifier string is recorded in the manifest alongside both hashes
/// of an entry, so source and archive digests always use the same algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HashAlgorithm {
    /// SHA-256 (default)
    #[default]
    Sha256,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Identifier recorded in manifest entries
    pub fn id(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    /// Parse a manifest algorithm identifier
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_uppercase().as_str() {
            "SHA256" => Some(Self::Sha256),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Digest an in-memory byte slice
    pub fn digest_bytes(&self, bytes: &[u8]) -> String {
        match self {
            Self::Sha256 => hex_upper(&Sha256::digest(bytes)),
            Self::Sha512 => hex_upper(&Sha512::digest(bytes)),
        }
    }

    /// Digest a file by streaming its content
    fn digest_file(&self, path: &Path) -> io::Result<String> {
        let mut file = File::open(path)?;
        match self {
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                io::copy(&mut file, &mut hasher)?;
                Ok(hex_upper(&hasher.finalize()))
            }
            Self::Sha512 => {
                let mut hasher = Sha512::new();
                io::copy(&mut file, &mut hasher)?;
                Ok(hex_upper(&hasher.finalize()))
            }
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Hash a file or directory tree
///
/// Returns `Ok(None)` when the path does not exist: the caller treats that
/// as "hash unavailable" rather than a failure.
pub fn hash_path(path: &Path, algorithm: HashAlgorithm) -> VaultResult<Option<String>> {
    if path.is_file() {
        Ok(Some(algorithm.digest_file(path)?))
    } else if path.is_dir() {
        Ok(Some(hash_directory(path, algorithm)?))
    } else {
        Ok(None)
    }
}

/// Compute the composite digest of a directory tree
fn hash_directory(dir: &Path, algorithm: HashAlgorithm) -> VaultResult<String> {
    let mut lines = Vec::new();

    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = relative_key(entry.path(), dir);
        match algorithm.digest_file(entry.path()) {
            Ok(digest) => lines.push(format!("{}:{}", relative, digest)),
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "failed to hash file, recording ERROR marker");
                lines.push(format!("{}:ERROR", relative));
            }
        }
    }

    // Sort case-sensitively by relative path so the composite is stable
    // regardless of directory enumeration order.
    lines.sort();

    Ok(algorithm.digest_bytes(lines.join("\n").as_bytes()))
}

/// Relative path of `path` under `base`, normalized to `/` separators
fn relative_key(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Encode bytes as uppercase hex with no separators
fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
