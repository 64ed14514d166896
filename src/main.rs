// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "pacdb")]
#[command(author, version, about = "Convert pacman sync databases into a queryable SQLite database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert sync databases into a SQLite database
    Convert {
        /// Directory holding the sync databases (*.db, optional *.files)
        #[arg(short, long, default_value = "/var/lib/pacman/sync")]
        sync_dir: PathBuf,
        /// Output database path, replaced atomically on success
        #[arg(short, long, default_value = "pacman.sqlite")]
        output: PathBuf,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert { sync_dir, output }) => {
            info!("Converting sync databases from: {}", sync_dir.display());

            let repositories = pacdb::convert::find_repositories(&sync_dir)?;
            if repositories.is_empty() {
                return Err(anyhow::anyhow!(
                    "No sync databases (*.db) found in {}",
                    sync_dir.display()
                ));
            }

            pacdb::convert::convert_atomic(&repositories, &output)?;

            println!("Converted {} repositories:", repositories.len());
            for repo in &repositories {
                println!(
                    "  {} ({}files database)",
                    repo.name,
                    if repo.files_path.is_some() { "" } else { "no " }
                );
            }
            println!("Output written to: {}", output.display());
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("pacdb v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'pacdb --help' for usage information");
            Ok(())
        }
    }
}
