// src/main.rs

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use pms::config::{DEFAULT_REGISTRY_DIR, DEFAULT_SCRATCH_DIR, DEFAULT_TARGET_ROOT};
use pms::{InstallConfig, Installer, preflight};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "pms")]
#[command(author, version, about = "Minimal package installer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a package
    Install {
        /// Absolute path to the package file
        package_path: Option<PathBuf>,
        /// Root directory payload paths are applied under
        #[arg(short, long, default_value = DEFAULT_TARGET_ROOT)]
        root: PathBuf,
        /// Registry directory
        #[arg(short, long, default_value = DEFAULT_REGISTRY_DIR)]
        db_dir: PathBuf,
        /// Scratch directory, wiped before every install
        #[arg(long, default_value = DEFAULT_SCRATCH_DIR)]
        scratch_dir: PathBuf,
    },
}

fn print_usage() {
    println!("Usage: pms install <package.pms>");
    println!("Run 'pms --help' for more information");
}

fn install(package_path: &Path, config: InstallConfig) -> Result<()> {
    preflight::require_root(preflight::effective_uid())?;
    preflight::require_absolute(package_path)?;

    info!(
        "Using scratch {}, registry {}, root {}",
        config.scratch_dir.display(),
        config.registry_dir.display(),
        config.target_root.display()
    );

    let target_root = config.target_root.clone();
    let installed = Installer::new(config).install(package_path)?;
    info!(
        "Wrote {} payload entries under {}, registry entry {}",
        installed.unpacked_entries,
        target_root.display(),
        installed.registry_entry.display()
    );
    println!("{}", installed);
    Ok(())
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries usage and the success line
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = e.print();
                    ExitCode::SUCCESS
                }
                _ => {
                    let _ = e.print();
                    ExitCode::FAILURE
                }
            };
        }
    };

    let result = match cli.command {
        Some(Commands::Install {
            package_path: Some(package_path),
            root,
            db_dir,
            scratch_dir,
        }) => {
            let config = InstallConfig::default()
                .with_target_root(root)
                .with_registry_dir(db_dir)
                .with_scratch_dir(scratch_dir);
            install(&package_path, config)
        }
        Some(Commands::Install { package_path: None, .. }) | None => {
            print_usage();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_install_with_defaults() {
        let cli = Cli::try_parse_from(["pms", "install", "/srv/app.pms"]).unwrap();
        match cli.command {
            Some(Commands::Install {
                package_path,
                root,
                db_dir,
                scratch_dir,
            }) => {
                assert_eq!(package_path, Some(PathBuf::from("/srv/app.pms")));
                assert_eq!(root, PathBuf::from("/"));
                assert_eq!(db_dir, PathBuf::from("/var/lib/pms/db"));
                assert_eq!(scratch_dir, PathBuf::from("/tmp/pms_extract"));
            }
            None => panic!("expected install command"),
        }
    }

    #[test]
    fn test_parse_install_without_path() {
        let cli = Cli::try_parse_from(["pms", "install"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Install { package_path: None, .. })
        ));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        let err = Cli::try_parse_from(["pms", "remove", "app"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
    }
}
