//! Catalog command implementation.

use std::path::Path;

use clap::Subcommand;

use crate::domain::AppError;

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Load and validate the catalogs
    Check,
    /// List catalog entries
    #[clap(visible_alias = "ls")]
    List {
        /// List images instead of sizes
        #[arg(long)]
        images: bool,
    },
}

pub fn run_catalog(command: CatalogCommands, catalog_dir: Option<&Path>) -> Result<(), AppError> {
    match command {
        CatalogCommands::Check => {
            let summary = crate::app::api::catalog_check(catalog_dir)?;
            println!("✅ Catalogs valid: {} images, {} sizes", summary.images, summary.sizes);
        }
        CatalogCommands::List { images: true } => {
            for image in crate::app::api::catalog_images(catalog_dir)? {
                println!(
                    "{:<24} {:<6} {:<5} {}",
                    image.key, image.arch, image.generation, image.label
                );
            }
        }
        CatalogCommands::List { images: false } => {
            for size in crate::app::api::catalog_sizes(catalog_dir)? {
                println!(
                    "{:<22} {:<10} nics={:<2} disks={:<3} accel={:<11} shared={} default_sku={}",
                    size.name,
                    size.generations.join(","),
                    size.max_nics,
                    size.max_data_disks,
                    size.accel_net_mode,
                    if size.shared_disks { "yes" } else { "no" },
                    size.default_disk_sku
                );
            }
        }
    }
    Ok(())
}
