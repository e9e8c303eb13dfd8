mod embedded;
mod filesystem;

pub use embedded::EmbeddedCatalogStore;
pub use filesystem::FilesystemCatalogStore;

/// File name of the image catalog inside a catalog directory.
pub const IMAGES_FILE: &str = "images.json";
/// File name of the size catalog inside a catalog directory.
pub const SIZES_FILE: &str = "sizes.json";
