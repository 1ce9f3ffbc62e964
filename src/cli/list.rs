//! `zipvault list` command

use std::path::PathBuf;

use clap::Args;

use crate::config::settings::Settings;
use crate::config::VaultConfig;
use crate::error::VaultResult;
use crate::layout;
use crate::manifest::ManifestStore;

/// List recorded backups
#[derive(Args)]
pub struct ListArgs {
    /// Destination root holding the date directories
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Only list this date (yyyy-MM-dd)
    #[arg(long)]
    pub date: Option<String>,

    /// Show detailed information per entry
    #[arg(short, long)]
    pub verbose: bool,
}

/// Handle the list command
pub fn handle_list_command(settings: &Settings, args: ListArgs) -> VaultResult<()> {
    let root = super::resolve_root(args.destination, settings)?;
    let only_date = args.date.as_deref().map(super::parse_date).transpose()?;

    let store = ManifestStore::new(VaultConfig::default());
    let mut dirs = layout::date_directories(&root)?;
    if let Some(date) = only_date {
        dirs.retain(|(d, _)| *d == date);
    }

    if dirs.is_empty() {
        println!("No backups found under {}", root.display());
        println!("Create one with: zipvault backup <sources> --destination {}", root.display());
        return Ok(());
    }

    println!("Backups under {}", root.display());
    println!("==============={}", "=".repeat(root.display().to_string().len()));
    println!();

    let mut total_entries = 0usize;
    for (date, date_dir) in dirs {
        let manifest = match store.read(&date_dir) {
            Ok(manifest) => manifest,
            Err(e) => {
                println!("{}: unreadable manifest ({})", date, e);
                continue;
            }
        };
        let Some(manifest) = manifest else {
            println!("{}: no manifest", date);
            continue;
        };

        total_entries += manifest.entries.len();
        println!("{}: {} backup(s)", date, manifest.entries.len());

        if args.verbose {
            for entry in &manifest.entries {
                let size = entry
                    .size
                    .map(super::format_size)
                    .unwrap_or_else(|| "-".to_string());
                let hashed = if entry.has_hash_data() { "hashed" } else { "no hash" };
                println!(
                    "    {} <- {} [{}] {} {} ({})",
                    entry.archive_name,
                    entry.source_path.display(),
                    entry.path_type,
                    size,
                    entry.backup_created_at.format("%H:%M:%S UTC"),
                    hashed,
                );
            }
        }
    }

    println!();
    println!("Total: {} backup entry(ies)", total_entries);

    Ok(())
}
