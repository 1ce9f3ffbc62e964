//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the backup engine.

pub mod backup;
pub mod list;
pub mod prune;
pub mod restore;
pub mod verify;

pub use backup::{handle_backup_command, BackupArgs};
pub use list::{handle_list_command, ListArgs};
pub use prune::{handle_prune_command, PruneArgs};
pub use restore::{handle_restore_command, RestoreArgs};
pub use verify::{handle_verify_command, VerifyArgs};

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::settings::Settings;
use crate::error::{VaultError, VaultResult};

/// Resolve the backup root from a flag or the configured default
pub(crate) fn resolve_root(flag: Option<PathBuf>, settings: &Settings) -> VaultResult<PathBuf> {
    flag.or_else(|| settings.default_destination.clone())
        .ok_or_else(|| {
            VaultError::Config(
                "no destination given; pass --destination or set default_destination in config.json"
                    .into(),
            )
        })
}

/// Parse a `yyyy-MM-dd` date argument
pub(crate) fn parse_date(arg: &str) -> VaultResult<NaiveDate> {
    Ok(NaiveDate::parse_from_str(arg, "%Y-%m-%d")?)
}

/// Format a file size in human-readable form
pub(crate) fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
