//! CLI Adapter.

mod catalog;
mod config;
mod template;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::domain::AppError;

#[derive(Parser)]
#[command(name = "vmtemplate")]
#[command(version)]
#[command(
    about = "Declare Azure virtual machines and emit validated ARM deployment templates",
    long_about = None
)]
struct Cli {
    /// Directory holding images.json and sizes.json (defaults to the embedded catalogs)
    #[arg(long, global = true, value_name = "DIR")]
    catalog_dir: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the image and size catalogs
    #[clap(visible_alias = "cat")]
    Catalog {
        #[command(subcommand)]
        command: catalog::CatalogCommands,
    },
    /// Apply automatic corrections to a configuration file
    #[clap(visible_alias = "s")]
    Sanitize {
        /// Configuration file (.toml, .yml or .yaml)
        config: PathBuf,
        /// Write the corrected configuration back to the file
        #[arg(short, long)]
        write: bool,
    },
    /// Check a configuration file for errors that block generation
    #[clap(visible_alias = "v")]
    Validate {
        /// Configuration file (.toml, .yml or .yaml)
        config: PathBuf,
    },
    /// Generate an ARM deployment template
    #[clap(visible_alias = "g")]
    Generate {
        /// Configuration file (.toml, .yml or .yaml)
        config: PathBuf,
        /// Write the template to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rebuild a configuration file from a generated template
    Import {
        /// Template produced by `generate`
        template: PathBuf,
        /// Configuration file to write (.toml, .yml or .yaml)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Duplicate a machine under the next free clone name
    Clone {
        /// Configuration file (.toml, .yml or .yaml)
        config: PathBuf,
        /// Machine id or name
        machine: String,
        /// Write the updated configuration back to the file
        #[arg(short, long)]
        write: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose { EnvFilter::new("vmtemplate=debug,info") } else { EnvFilter::new("warn") }
    });
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let catalog_dir = cli.catalog_dir.as_deref();
    let result: Result<i32, AppError> = match cli.command {
        Commands::Catalog { command } => catalog::run_catalog(command, catalog_dir).map(|_| 0),
        Commands::Sanitize { config, write } => {
            config::run_sanitize(&config, write, catalog_dir).map(|_| 0)
        }
        Commands::Validate { config } => config::run_validate(&config, catalog_dir),
        Commands::Generate { config, output } => {
            template::run_generate(&config, output, catalog_dir)
        }
        Commands::Import { template, output } => {
            template::run_import(&template, &output, catalog_dir).map(|_| 0)
        }
        Commands::Clone { config, machine, write } => {
            config::run_clone(&config, &machine, write, catalog_dir).map(|_| 0)
        }
    };

    match result {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
