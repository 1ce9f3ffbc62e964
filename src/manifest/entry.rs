//! Manifest entry records

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::PathKind;
use crate::hash::HashAlgorithm;

/// One manifest record describing a single source-to-archive backup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEntry {
    /// File name of the zip, relative to the date directory
    pub archive_name: String,

    /// Absolute original path of the source
    pub source_path: PathBuf,

    /// Whether the source was a file or a directory
    pub path_type: PathKind,

    /// When the backup was created (UTC, millisecond precision)
    pub backup_created_at: DateTime<Utc>,

    /// Base name of the source at backup time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,

    /// Last modification time of the source at backup time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_write_time: Option<DateTime<Utc>>,

    /// Source attributes at backup time (best-effort)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,

    /// Size in bytes (file sources only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// File extension without the dot (file sources only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Digest of the source content, absent when hashing was skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,

    /// Digest of the archive file, absent when hashing was skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_hash: Option<String>,

    /// Identifier of the digest used for both hashes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<String>,
}

impl BackupEntry {
    /// Create an entry for a just-written archive, capturing best-effort
    /// provenance metadata from the source
    pub fn new(archive_name: String, source: &Path, kind: PathKind) -> Self {
        let mut entry = Self {
            archive_name,
            source_path: source.to_path_buf(),
            path_type: kind,
            backup_created_at: Utc::now().trunc_subsecs(3),
            original_name: source.file_name().map(|n| n.to_string_lossy().into_owned()),
            last_write_time: None,
            attributes: None,
            size: None,
            extension: None,
            source_hash: None,
            archive_hash: None,
            hash_algorithm: None,
        };

        // Provenance is best-effort: an unreadable source just leaves the
        // optional fields absent.
        if let Ok(metadata) = fs::metadata(source) {
            entry.last_write_time = metadata
                .modified()
                .ok()
                .map(|t| DateTime::<Utc>::from(t).trunc_subsecs(3));
            entry.attributes = Some(describe_attributes(&metadata, kind));
            if kind == PathKind::File {
                entry.size = Some(metadata.len());
                entry.extension = source
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned());
            }
        }

        entry
    }

    /// Attach source and archive digests computed with the same algorithm
    pub fn with_hashes(
        mut self,
        source_hash: Option<String>,
        archive_hash: Option<String>,
        algorithm: HashAlgorithm,
    ) -> Self {
        if source_hash.is_some() || archive_hash.is_some() {
            self.hash_algorithm = Some(algorithm.id().to_string());
        }
        self.source_hash = source_hash;
        self.archive_hash = archive_hash;
        self
    }

    /// Whether this entry carries hash fields at all
    ///
    /// Entries without hash data cannot be verified; that state is distinct
    /// from a verification failure.
    pub fn has_hash_data(&self) -> bool {
        self.source_hash.is_some() || self.archive_hash.is_some()
    }
}

fn describe_attributes(metadata: &fs::Metadata, kind: PathKind) -> String {
    if kind == PathKind::Directory {
        "Directory".to_string()
    } else if metadata.permissions().readonly() {
        "ReadOnly".to_string()
    } else {
        "Normal".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_entry_captures_metadata() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("report.txt");
        fs::write(&source, b"ten bytes!").unwrap();

        let entry = BackupEntry::new("report.txt.zip".into(), &source, PathKind::File);

        assert_eq!(entry.path_type, PathKind::File);
        assert_eq!(entry.original_name.as_deref(), Some("report.txt"));
        assert_eq!(entry.size, Some(10));
        assert_eq!(entry.extension.as_deref(), Some("txt"));
        assert!(entry.last_write_time.is_some());
        assert!(!entry.has_hash_data());
    }

    #[test]
    fn test_directory_entry_has_no_size_or_extension() {
        let temp = TempDir::new().unwrap();
        let entry = BackupEntry::new("dir.zip".into(), temp.path(), PathKind::Directory);

        assert_eq!(entry.path_type, PathKind::Directory);
        assert!(entry.size.is_none());
        assert!(entry.extension.is_none());
        assert_eq!(entry.attributes.as_deref(), Some("Directory"));
    }

    #[test]
    fn test_missing_source_leaves_provenance_absent() {
        let temp = TempDir::new().unwrap();
        let ghost = temp.path().join("ghost.txt");

        let entry = BackupEntry::new("ghost.txt.zip".into(), &ghost, PathKind::File);

        assert!(entry.last_write_time.is_none());
        assert!(entry.attributes.is_none());
        assert!(entry.size.is_none());
    }

    #[test]
    fn test_with_hashes_records_algorithm() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, b"x").unwrap();

        let entry = BackupEntry::new("a.txt.zip".into(), &source, PathKind::File).with_hashes(
            Some("AB".into()),
            Some("CD".into()),
            HashAlgorithm::Sha256,
        );

        assert!(entry.has_hash_data());
        assert_eq!(entry.hash_algorithm.as_deref(), Some("SHA256"));
    }

    #[test]
    fn test_skipped_hashing_omits_fields_in_json() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, b"x").unwrap();

        let entry = BackupEntry::new("a.txt.zip".into(), &source, PathKind::File);
        let json = serde_json::to_string(&entry).unwrap();

        assert!(!json.contains("sourceHash"));
        assert!(!json.contains("archiveHash"));
        assert!(!json.contains("hashAlgorithm"));
        assert!(json.contains("\"pathType\":\"File\""));
        assert!(json.contains("archiveName"));
    }
}
