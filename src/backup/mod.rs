//! Backup orchestration
//!
//! Ties the engine together for a run: each source is classified, named,
//! compressed, hashed, and recorded in the day's manifest; retention
//! pruning runs at the end.
//!
//! # Components
//!
//! - `BackupManager`: sequences the lifecycle and collects the run summary
//! - `choose_mode`: the individual-vs-combined packaging policy
//!
//! # Example
//!
//! ```rust,ignore
//! use zipvault::backup::{BackupManager, BackupOptions};
//! use zipvault::config::VaultConfig;
//!
//! let manager = BackupManager::new(VaultConfig::default());
//! let summary = manager.run(&sources, &dest_root, &BackupOptions::default())?;
//! println!("created {} archive(s)", summary.created.len());
//! ```

mod manager;
mod mode;

pub use manager::{BackupManager, BackupOptions, BackupRunSummary, CreatedArchive};
pub use mode::{choose_mode, ArchiveMode};
