use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zipvault::cli::{
    handle_backup_command, handle_list_command, handle_prune_command, handle_restore_command,
    handle_verify_command, BackupArgs, ListArgs, PruneArgs, RestoreArgs, VerifyArgs,
};
use zipvault::config::paths::VaultPaths;
use zipvault::config::settings::Settings;

#[derive(Parser)]
#[command(
    name = "zipvault",
    author = "Kaylee Beyene",
    version,
    about = "Date-partitioned ZIP backups with manifests, verification and retention",
    long_about = "zipvault archives files and directories into per-day ZIP backups, \
                  records every archive in a JSON manifest, and supports listing, \
                  hash-based integrity verification, restoration, and retention \
                  pruning of old backup days."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up files and directories
    #[command(alias = "create")]
    Backup(BackupArgs),

    /// List recorded backups
    #[command(alias = "ls")]
    List(ListArgs),

    /// Verify backups against their recorded hashes
    Verify(VerifyArgs),

    /// Restore backups from their archives
    Restore(RestoreArgs),

    /// Delete old date directories
    Prune(PruneArgs),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let paths = VaultPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Commands::Backup(args) => handle_backup_command(&settings, args)?,
        Commands::List(args) => handle_list_command(&settings, args)?,
        Commands::Verify(args) => handle_verify_command(&settings, args)?,
        Commands::Restore(args) => handle_restore_command(&settings, args)?,
        Commands::Prune(args) => handle_prune_command(&settings, args)?,
        Commands::Config => {
            println!("zipvault Configuration");
            println!("======================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!(
                "  Default destination: {}",
                settings
                    .default_destination
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string())
            );
            println!(
                "  Default keep count:  {}",
                settings
                    .default_keep
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "unlimited".to_string())
            );
            println!("  Hashing enabled:     {}", settings.hashing_enabled);
            println!("  Hash algorithm:      {}", settings.hash_algorithm);
        }
    }

    Ok(())
}
