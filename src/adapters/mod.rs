pub mod arm_template;
pub mod catalogs;
pub mod config_file;

pub use arm_template::ArmTemplateGenerator;
pub use catalogs::{EmbeddedCatalogStore, FilesystemCatalogStore};
