//! `zipvault verify` command

use std::path::PathBuf;

use clap::Args;

use crate::config::settings::Settings;
use crate::config::VaultConfig;
use crate::error::VaultResult;
use crate::verify::{IntegrityVerifier, VerifyOptions};

/// Verify recorded backups against their manifest hashes
#[derive(Args)]
pub struct VerifyArgs {
    /// Destination root holding the date directories
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Only verify this date (yyyy-MM-dd)
    #[arg(long)]
    pub date: Option<String>,

    /// Only verify entries matching this name glob
    #[arg(short, long)]
    pub name: Option<String>,

    /// Also verify the live source paths against their recorded hashes
    #[arg(short, long)]
    pub source: bool,
}

/// Handle the verify command
pub fn handle_verify_command(settings: &Settings, args: VerifyArgs) -> VaultResult<()> {
    let root = super::resolve_root(args.destination, settings)?;

    let options = VerifyOptions {
        date: args.date.as_deref().map(super::parse_date).transpose()?,
        name_pattern: args.name,
        verify_source: args.source,
    };

    let verifier = IntegrityVerifier::new(VaultConfig::default());
    let results = verifier.verify(&root, &options)?;

    if results.is_empty() {
        println!("No matching backup entries to verify.");
        return Ok(());
    }

    let mut archive_valid = 0usize;
    let mut source_valid = 0usize;
    let mut no_hash = 0usize;
    let mut failures = 0usize;

    for result in &results {
        let marker = if !result.has_hash_data {
            no_hash += 1;
            "SKIP"
        } else if result.is_ok() {
            "OK"
        } else {
            failures += 1;
            "FAIL"
        };
        if result.archive_valid == Some(true) {
            archive_valid += 1;
        }
        if result.source_valid == Some(true) {
            source_valid += 1;
        }

        println!(
            "[{}] {} / {}: {}",
            marker, result.date, result.archive_name, result.message,
        );
    }

    println!();
    println!(
        "Checked {}: {} archive(s) valid, {} source(s) valid, {} without hash data, {} failure(s)",
        results.len(),
        archive_valid,
        source_valid,
        no_hash,
        failures,
    );

    Ok(())
}
