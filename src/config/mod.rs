//! Configuration and path management

pub mod paths;
pub mod settings;

use crate::hash::HashAlgorithm;

/// Expected manifest schema version
pub const MANIFEST_VERSION: &str = "1.0";

/// Immutable engine configuration
///
/// Shared constants (manifest file name, date-directory format, schema
/// version) are injected into each component at construction instead of
/// living as ambient globals.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Manifest file name inside each date directory
    pub manifest_file_name: String,
    /// strftime format for date-directory names
    pub date_format: &'static str,
    /// Manifest schema version written and expected on read
    pub manifest_version: String,
    /// Version of this tool, recorded in manifests (informational)
    pub module_version: String,
    /// Default digest algorithm for new backups
    pub default_algorithm: HashAlgorithm,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            manifest_file_name: "backup-manifest.json".to_string(),
            date_format: "%Y-%m-%d",
            manifest_version: MANIFEST_VERSION.to_string(),
            module_version: env!("CARGO_PKG_VERSION").to_string(),
            default_algorithm: HashAlgorithm::default(),
        }
    }
}
