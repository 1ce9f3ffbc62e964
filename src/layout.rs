//! Date-partitioned destination layout
//!
//! A backup root contains one subdirectory per day, named `yyyy-MM-dd`.
//! Only directories matching that exact pattern belong to zipvault; every
//! other entry under the root is ignored and never touched.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::warn;

use crate::error::{VaultError, VaultResult};

/// Check whether a directory name has the `yyyy-MM-dd` shape
fn has_date_shape(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

/// Parse a date-directory name, requiring the exact `yyyy-MM-dd` shape
pub fn parse_date_dir_name(name: &str) -> Option<NaiveDate> {
    if !has_date_shape(name) {
        return None;
    }
    NaiveDate::parse_from_str(name, "%Y-%m-%d").ok()
}

/// List qualifying date directories under a backup root, sorted ascending
///
/// Entries whose names look like dates but don't parse as real calendar
/// dates are skipped with a warning; anything else is ignored silently.
///
/// # Errors
///
/// Returns a "not found" error when the root itself does not exist.
pub fn date_directories(root: &Path) -> VaultResult<Vec<(NaiveDate, PathBuf)>> {
    if !root.is_dir() {
        return Err(VaultError::backup_root_not_found(root.display().to_string()));
    }

    let mut dirs = Vec::new();

    for entry in std::fs::read_dir(root)
        .map_err(|e| VaultError::Io(format!("Failed to read backup root: {}", e)))?
    {
        let entry = entry.map_err(|e| VaultError::Io(format!("Failed to read directory entry: {}", e)))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !has_date_shape(&name) {
            continue;
        }
        match NaiveDate::parse_from_str(&name, "%Y-%m-%d") {
            Ok(date) => dirs.push((date, entry.path())),
            Err(_) => {
                warn!(name = %name, "directory looks date-named but is not a calendar date, skipping");
            }
        }
    }

    dirs.sort_by_key(|(date, _)| *date);
    Ok(dirs)
}

/// The most recent date directory under a backup root, if any
pub fn latest_date_directory(root: &Path) -> VaultResult<Option<(NaiveDate, PathBuf)>> {
    Ok(date_directories(root)?.into_iter().next_back())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_valid_date_names() {
        assert_eq!(
            parse_date_dir_name("2026-08-06"),
            NaiveDate::from_ymd_opt(2026, 8, 6)
        );
        assert_eq!(
            parse_date_dir_name("1999-12-31"),
            NaiveDate::from_ymd_opt(1999, 12, 31)
        );
    }

    #[test]
    fn test_reject_malformed_names() {
        assert!(parse_date_dir_name("2026-8-6").is_none());
        assert!(parse_date_dir_name("2026-08-06-extra").is_none());
        assert!(parse_date_dir_name("20260806").is_none());
        assert!(parse_date_dir_name("misc").is_none());
        // Correct shape, impossible date
        assert!(parse_date_dir_name("2026-13-01").is_none());
        assert!(parse_date_dir_name("2026-02-30").is_none());
    }

    #[test]
    fn test_date_directories_sorted_ascending() {
        let temp = TempDir::new().unwrap();
        for name in ["2026-03-01", "2026-01-15", "2026-02-20"] {
            fs::create_dir(temp.path().join(name)).unwrap();
        }
        fs::create_dir(temp.path().join("not-a-date")).unwrap();
        fs::write(temp.path().join("2026-04-01"), b"a file, not a dir").unwrap();

        let dirs = date_directories(temp.path()).unwrap();
        let names: Vec<String> = dirs
            .iter()
            .map(|(d, _)| d.format("%Y-%m-%d").to_string())
            .collect();

        assert_eq!(names, vec!["2026-01-15", "2026-02-20", "2026-03-01"]);
    }

    #[test]
    fn test_latest_date_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("2026-01-01")).unwrap();
        fs::create_dir(temp.path().join("2026-06-30")).unwrap();

        let (date, path) = latest_date_directory(temp.path()).unwrap().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 6, 30).unwrap());
        assert_eq!(path, temp.path().join("2026-06-30"));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        let result = date_directories(&missing);
        assert!(matches!(result, Err(VaultError::NotFound { .. })));
    }

    #[test]
    fn test_empty_root_yields_no_dirs() {
        let temp = TempDir::new().unwrap();
        assert!(date_directories(temp.path()).unwrap().is_empty());
        assert!(latest_date_directory(temp.path()).unwrap().is_none());
    }
}
