mod catalog_store;
mod template_generator;

pub use catalog_store::CatalogStore;
pub use template_generator::TemplateGenerator;
