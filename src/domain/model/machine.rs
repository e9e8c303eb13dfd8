//! Per-machine configuration records.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{DiskController, DiskSku, Generation};

/// One configured virtual machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Size catalog name.
    pub size: String,
    #[serde(default)]
    pub generation: Generation,
    #[serde(default)]
    pub disk_controller: DiskController,
    /// Image catalog key.
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_filter: Option<String>,
    /// Free-text boot payload (cloud-init style shell script).
    #[serde(default)]
    pub custom_data: String,
    #[serde(default)]
    pub reboot: bool,
    #[serde(default)]
    pub ephemeral_os_disk: bool,
    #[serde(default)]
    pub nics: Vec<Nic>,
    #[serde(default)]
    pub data_disks: Vec<DataDisk>,
}

impl Machine {
    /// A machine with one private NIC and no disks; the resolver fills in the rest.
    pub fn new(id: impl Into<String>, name: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size: size.into(),
            generation: Generation::default(),
            disk_controller: DiskController::default(),
            image: String::new(),
            publisher_filter: None,
            custom_data: String::new(),
            reboot: false,
            ephemeral_os_disk: false,
            nics: vec![Nic::new("", "nic1")],
            data_disks: Vec::new(),
        }
    }

    pub fn primary_nic(&self) -> Option<&Nic> {
        self.nics.first()
    }

    pub fn shared_disks(&self) -> impl Iterator<Item = &DataDisk> {
        self.data_disks.iter().filter(|d| d.shared)
    }

    pub fn references_shared_disk(&self, id: &str) -> bool {
        self.shared_disks().any(|d| d.shared_disk_id == id)
    }
}

/// Network interface owned by a machine. The first NIC is the primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nic {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Stored preference; the size's mode decides the effective value.
    #[serde(default)]
    pub accelerated_networking: bool,
    #[serde(default)]
    pub public_ip: bool,
}

impl Nic {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), accelerated_networking: false, public_ip: false }
    }
}

/// Data disk owned by a machine, or co-owned by two machines when shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDisk {
    pub size_gb: u32,
    pub sku: DiskSku,
    #[serde(default)]
    pub shared: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shared_disk_id: String,
}

impl DataDisk {
    pub fn new(size_gb: u32, sku: DiskSku) -> Self {
        Self { size_gb, sku, shared: false, shared_disk_id: String::new() }
    }

    pub fn shared(id: impl Into<String>, size_gb: u32, sku: DiskSku) -> Self {
        Self { size_gb, sku, shared: true, shared_disk_id: id.into() }
    }

    /// Turn this disk into an ordinary per-machine disk.
    pub fn make_local(&mut self) {
        self.shared = false;
        self.shared_disk_id.clear();
    }
}
