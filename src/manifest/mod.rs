//! Per-day backup manifests
//!
//! Every date directory holds one `backup-manifest.json` recording each
//! backup made that day. Entries are append-only and never deduplicated:
//! backing up the same source twice on one day yields two entries.
//!
//! # Manifest Format
//!
//! ```json
//! {
//!   "backupDate": "2026-08-06",
//!   "backupVersion": "1.0",
//!   "moduleVersion": "0.1.0",
//!   "Backups": [ ... ]
//! }
//! ```
//!
//! Optional entry fields (provenance metadata, hash fields) are omitted
//! entirely when unavailable, never written as null. An entry without hash
//! fields means integrity verification is unavailable for it, which is a
//! valid state distinct from a failed verification.

mod entry;
mod store;

pub use entry::BackupEntry;
pub use store::{BackupManifest, ManifestStore};
