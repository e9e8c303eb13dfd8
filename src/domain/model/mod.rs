//! Caller-owned configuration: machines, storage add-on and custom NSG rules.
//!
//! The configuration is the only mutable state in the system. Pipeline stages take it by
//! reference; nothing holds it globally.

mod machine;
mod network;
mod storage;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use machine::{DataDisk, Machine, Nic};
pub use network::{NsgProtocol, NsgRule, NsgSource, parse_port_range};
pub use storage::{FileShareOption, FileShareProtocol, StorageOptions};

use crate::domain::catalog::{Catalogs, SizeCatalogEntry};
use crate::domain::{AppError, clone, resolver, shared_disk};

/// Size given to machines created without an explicit one, when the catalog has it.
pub const PREFERRED_DEFAULT_SIZE: &str = "Standard_D2s_v5";

/// Data disk size used by [`Configuration::add_data_disk`].
pub const DEFAULT_DATA_DISK_GB: u32 = 128;

/// Deployment-wide settings that end up as template parameter defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSettings {
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
}

fn default_admin_username() -> String {
    "azureuser".to_string()
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self { admin_username: default_admin_username() }
    }
}

/// The whole working set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Monotonic counter behind every generated id; ids are never reused.
    #[serde(default)]
    pub id_seq: u64,
    #[serde(default)]
    pub deployment: DeploymentSettings,
    #[serde(default)]
    pub machines: Vec<Machine>,
    #[serde(default)]
    pub storage: StorageOptions,
    #[serde(default)]
    pub nsg_rules: Vec<NsgRule>,
}

impl Configuration {
    /// Allocate a fresh id with the given prefix.
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.id_seq += 1;
        format!("{}-{}", prefix, self.id_seq)
    }

    /// Give every machine and NIC without an id a fresh one. Returns how many were assigned.
    pub fn assign_missing_ids(&mut self) -> usize {
        let mut assigned = 0;
        for m in 0..self.machines.len() {
            if self.machines[m].id.is_empty() {
                self.machines[m].id = self.next_id("vm");
                assigned += 1;
            }
            for n in 0..self.machines[m].nics.len() {
                if self.machines[m].nics[n].id.is_empty() {
                    self.machines[m].nics[n].id = self.next_id("nic");
                    assigned += 1;
                }
            }
        }
        assigned
    }

    pub fn machine(&self, id: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == id)
    }

    pub fn machine_mut(&mut self, id: &str) -> Option<&mut Machine> {
        self.machines.iter_mut().find(|m| m.id == id)
    }

    /// Look up a machine by id or, failing that, by name (case-insensitive).
    pub fn find_machine(&self, id_or_name: &str) -> Option<&Machine> {
        self.machine(id_or_name)
            .or_else(|| self.machines.iter().find(|m| m.name.eq_ignore_ascii_case(id_or_name)))
    }

    pub(crate) fn machine_index(&self, id: &str) -> Result<usize, AppError> {
        self.machines
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| AppError::MachineNotFound(id.to_string()))
    }

    fn name_taken(&self, name: &str) -> bool {
        self.machines.iter().any(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Append a default machine and return its id.
    pub fn add_machine(&mut self, catalogs: &Catalogs) -> Result<String, AppError> {
        let size = catalogs
            .size(PREFERRED_DEFAULT_SIZE)
            .or_else(|| catalogs.sizes().first())
            .ok_or_else(|| AppError::config_error("Size catalog is empty"))?;

        let name = (1..)
            .map(|n| format!("vm{}", n))
            .find(|candidate| !self.name_taken(candidate))
            .unwrap_or_default();

        let id = self.next_id("vm");
        let mut machine = Machine::new(id.clone(), name, size.name.clone());
        machine.nics[0].id = self.next_id("nic");
        resolver::resolve_machine(catalogs, &mut machine);
        self.machines.push(machine);
        Ok(id)
    }

    pub fn remove_machine(&mut self, id: &str) -> Result<Machine, AppError> {
        let index = self.machine_index(id)?;
        Ok(self.machines.remove(index))
    }

    /// Duplicate a machine under the next free `<base>-clone-N` name. Returns the new id.
    ///
    /// A shared disk reference is copied only while the disk has a free attachment; otherwise
    /// the copy gets an ordinary disk and existing attachments stay as they are.
    pub fn clone_machine(&mut self, id: &str) -> Result<String, AppError> {
        let index = self.machine_index(id)?;
        let mut copy = self.machines[index].clone();

        let full: Vec<String> = shared_disk::all_shared_references(self)
            .into_iter()
            .filter(|shared| shared.is_full())
            .map(|shared| shared.id)
            .collect();
        for disk in copy.data_disks.iter_mut() {
            if disk.shared && full.contains(&disk.shared_disk_id) {
                disk.make_local();
            }
        }

        let existing: Vec<&str> = self.machines.iter().map(|m| m.name.as_str()).collect();
        copy.name = clone::clone_name(&copy.name, &existing);
        copy.id = self.next_id("vm");
        for n in 0..copy.nics.len() {
            copy.nics[n].id = self.next_id("nic");
        }

        debug!(source = %self.machines[index].name, clone = %copy.name, "cloned machine");
        let new_id = copy.id.clone();
        self.machines.insert(index + 1, copy);
        Ok(new_id)
    }

    fn size_for<'c>(
        &self,
        catalogs: &'c Catalogs,
        index: usize,
    ) -> Result<&'c SizeCatalogEntry, AppError> {
        let size = &self.machines[index].size;
        catalogs.size(size).ok_or_else(|| AppError::SizeNotFound(size.clone()))
    }

    /// Add a NIC, refusing when the size's NIC ceiling is reached.
    pub fn add_nic(&mut self, catalogs: &Catalogs, machine_id: &str) -> Result<String, AppError> {
        let index = self.machine_index(machine_id)?;
        let size = self.size_for(catalogs, index)?;
        let ceilings = resolver::ceilings(size);
        if !resolver::can_add_nic(&self.machines[index], ceilings) {
            return Err(AppError::AttachmentLimit {
                machine: self.machines[index].name.clone(),
                size: size.name.clone(),
                what: "NICs",
                max: ceilings.max_nics,
            });
        }

        let name = (1..)
            .map(|n| format!("nic{}", n))
            .find(|candidate| {
                let nics = &self.machines[index].nics;
                !nics.iter().any(|nic| nic.name.eq_ignore_ascii_case(candidate))
            })
            .unwrap_or_default();
        let id = self.next_id("nic");
        self.machines[index].nics.push(Nic::new(id.clone(), name));
        Ok(id)
    }

    /// Add an ordinary data disk with the size's default SKU.
    pub fn add_data_disk(
        &mut self,
        catalogs: &Catalogs,
        machine_id: &str,
    ) -> Result<usize, AppError> {
        let index = self.machine_index(machine_id)?;
        let size = self.size_for(catalogs, index)?;
        let ceilings = resolver::ceilings(size);
        if !resolver::can_add_data_disk(&self.machines[index], ceilings) {
            return Err(AppError::AttachmentLimit {
                machine: self.machines[index].name.clone(),
                size: size.name.clone(),
                what: "data disks",
                max: ceilings.max_data_disks,
            });
        }

        let sku = resolver::default_disk_sku(size);
        let disks = &mut self.machines[index].data_disks;
        disks.push(DataDisk::new(DEFAULT_DATA_DISK_GB, sku));
        Ok(disks.len() - 1)
    }

    /// Change a machine's size. Shared disks are demoted to ordinary disks when the new size
    /// cannot share; the number demoted is returned. Run sanitize afterwards.
    pub fn change_size(
        &mut self,
        catalogs: &Catalogs,
        machine_id: &str,
        size_name: &str,
    ) -> Result<usize, AppError> {
        let index = self.machine_index(machine_id)?;
        let size =
            catalogs.size(size_name).ok_or_else(|| AppError::SizeNotFound(size_name.to_string()))?;

        let machine = &mut self.machines[index];
        machine.size = size.name.clone();
        let converted = if size.supports_shared_disks() {
            0
        } else {
            shared_disk::convert_machine_to_local(machine, size)
        };
        Ok(converted)
    }
}
