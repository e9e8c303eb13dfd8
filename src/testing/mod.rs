//! Shared fixtures for unit tests.

use crate::adapters::{ArmTemplateGenerator, EmbeddedCatalogStore};
use crate::app::AppContext;
use crate::domain::Catalogs;
use crate::domain::model::Machine;
use crate::ports::CatalogStore;

/// The embedded catalogs, validated.
pub fn catalogs() -> Catalogs {
    let raw = EmbeddedCatalogStore::new().load().expect("embedded catalogs load");
    Catalogs::from_raw(&raw).expect("embedded catalogs are valid")
}

/// A machine with one NIC named `nic1` and no image; sanitize picks the image.
pub fn machine(id: &str, name: &str, size: &str) -> Machine {
    let mut machine = Machine::new(id, name, size);
    machine.nics[0].id = format!("{}-nic1", id);
    machine
}

/// Context over the embedded catalogs and the ARM generator.
pub fn context() -> AppContext<ArmTemplateGenerator> {
    AppContext::new(catalogs(), ArmTemplateGenerator::new())
}
