//! Shared-disk allocator.
//!
//! A shared disk has no record of its own. It is the group of data disk rows carrying the same
//! `shared_disk_id`, so removing the last row removes the disk. The first row in machine-then-disk
//! order is the primary and owns SKU and size; the second row mirrors it.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::AppError;
use crate::domain::catalog::{Catalogs, DiskSku, SizeCatalogEntry};
use crate::domain::model::{Configuration, DataDisk, Machine};
use crate::domain::resolver;

/// Most machines a single shared disk can be attached to.
pub const MAX_SHARED_ATTACHMENTS: usize = 2;

/// Position of a data disk row within the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskLocation {
    pub machine: usize,
    pub disk: usize,
}

/// Derived view of one logical shared disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedDisk {
    pub id: String,
    pub references: Vec<DiskLocation>,
}

impl SharedDisk {
    pub fn primary(&self) -> DiskLocation {
        self.references[0]
    }

    pub fn secondary(&self) -> Option<DiskLocation> {
        self.references.get(1).copied()
    }

    pub fn is_full(&self) -> bool {
        self.references.len() >= MAX_SHARED_ATTACHMENTS
    }

    /// The primary row's disk record.
    pub fn primary_disk<'c>(&self, config: &'c Configuration) -> &'c DataDisk {
        let at = self.primary();
        &config.machines[at.machine].data_disks[at.disk]
    }

    /// Whether the disk must be pinned to an availability zone.
    pub fn requires_zone(&self, config: &Configuration) -> bool {
        self.references.len() >= MAX_SHARED_ATTACHMENTS
            || self.primary_disk(config).sku.is_zonal_only()
    }
}

/// One data disk row touched by the allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskChange {
    pub machine: String,
    pub shared_disk_id: String,
}

impl DiskChange {
    fn new(machine: &str, shared_disk_id: &str) -> Self {
        Self { machine: machine.to_string(), shared_disk_id: shared_disk_id.to_string() }
    }
}

/// What an allocator pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationReport {
    /// Shared flags cleared because the size cannot share, the id was empty or the machine
    /// already holds that id on an earlier disk.
    pub scrubbed: Vec<DiskChange>,
    /// References beyond the attachment ceiling turned into ordinary disks.
    pub demoted: Vec<DiskChange>,
    /// Secondaries rewritten to match their primary.
    pub synced: Vec<DiskChange>,
}

impl AllocationReport {
    pub fn is_empty(&self) -> bool {
        self.scrubbed.is_empty() && self.demoted.is_empty() && self.synced.is_empty()
    }
}

fn group(config: &Configuration, include: impl Fn(&Machine) -> bool) -> Vec<SharedDisk> {
    let mut groups: Vec<SharedDisk> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (m, machine) in config.machines.iter().enumerate() {
        if !include(machine) {
            continue;
        }
        for (d, disk) in machine.data_disks.iter().enumerate() {
            if !disk.shared || disk.shared_disk_id.is_empty() {
                continue;
            }
            let location = DiskLocation { machine: m, disk: d };
            match index.get(disk.shared_disk_id.as_str()) {
                Some(&g) => groups[g].references.push(location),
                None => {
                    index.insert(&disk.shared_disk_id, groups.len());
                    groups.push(SharedDisk {
                        id: disk.shared_disk_id.clone(),
                        references: vec![location],
                    });
                }
            }
        }
    }
    groups
}

/// Shared disks on machines whose size supports sharing, in discovery order.
pub fn shared_disks(config: &Configuration, catalogs: &Catalogs) -> Vec<SharedDisk> {
    group(config, |machine| catalogs.size(&machine.size).is_some_and(|s| s.supports_shared_disks()))
}

/// Every shared-flagged row grouped by id, regardless of size support.
pub fn all_shared_references(config: &Configuration) -> Vec<SharedDisk> {
    group(config, |_| true)
}

/// Make a disk ordinary, resetting its SKU when the owning size cannot use it.
fn demote(disk: &mut DataDisk, size: &SizeCatalogEntry) {
    disk.make_local();
    if !resolver::supports_sku(size, disk.sku) {
        disk.sku = resolver::default_disk_sku(size);
    }
}

/// Clear shared flags the machine cannot hold. Returns the ids of the disks scrubbed.
///
/// A machine attaches a given shared disk at most once; later rows repeating an id are made local.
/// Machines with an unknown size are left alone for the validator to report.
pub fn scrub_machine(machine: &mut Machine, catalogs: &Catalogs) -> Vec<String> {
    let Some(size) = catalogs.size(&machine.size) else {
        return Vec::new();
    };
    let supported = size.supports_shared_disks();

    let mut scrubbed = Vec::new();
    let mut seen = HashSet::new();
    for disk in machine.data_disks.iter_mut() {
        let repeated = disk.shared && !seen.insert(disk.shared_disk_id.clone());
        if disk.shared && (!supported || disk.shared_disk_id.is_empty() || repeated) {
            scrubbed.push(disk.shared_disk_id.clone());
            demote(disk, size);
        } else if !disk.shared && !disk.shared_disk_id.is_empty() {
            disk.shared_disk_id.clear();
        }
    }
    scrubbed
}

/// Run the full allocator pass over the configuration.
pub fn enforce(config: &mut Configuration, catalogs: &Catalogs) -> AllocationReport {
    let mut report = AllocationReport::default();

    for machine in config.machines.iter_mut() {
        for id in scrub_machine(machine, catalogs) {
            debug!(machine = %machine.name, shared_disk = %id, "cleared invalid shared flag");
            report.scrubbed.push(DiskChange::new(&machine.name, &id));
        }
    }

    for shared in shared_disks(config, catalogs) {
        for extra in shared.references.iter().skip(MAX_SHARED_ATTACHMENTS) {
            let machine = &mut config.machines[extra.machine];
            // Only machines with a known, sharing-capable size are grouped.
            if let Some(size) = catalogs.size(&machine.size) {
                demote(&mut machine.data_disks[extra.disk], size);
            }
            debug!(
                machine = %machine.name,
                shared_disk = %shared.id,
                "attachment over ceiling demoted"
            );
            report.demoted.push(DiskChange::new(&machine.name, &shared.id));
        }

        if let Some(secondary) = shared.secondary() {
            let primary = shared.primary_disk(config).clone();
            let machine = &mut config.machines[secondary.machine];
            let disk = &mut machine.data_disks[secondary.disk];
            if disk.sku != primary.sku || disk.size_gb != primary.size_gb {
                disk.sku = primary.sku;
                disk.size_gb = primary.size_gb;
                debug!(
                    machine = %machine.name,
                    shared_disk = %shared.id,
                    "secondary synced to primary"
                );
                report.synced.push(DiskChange::new(&machine.name, &shared.id));
            }
        }
    }

    report
}

/// Allocate a shared disk id not referenced anywhere in the configuration.
pub fn new_shared_disk_id(config: &mut Configuration) -> String {
    loop {
        let id = config.next_id("shared-disk");
        let taken = config
            .machines
            .iter()
            .flat_map(|m| m.data_disks.iter())
            .any(|d| d.shared_disk_id == id);
        if !taken {
            return id;
        }
    }
}

fn sharing_size<'c>(
    catalogs: &'c Catalogs,
    machine: &Machine,
) -> Result<&'c SizeCatalogEntry, AppError> {
    let size = catalogs
        .size(&machine.size)
        .ok_or_else(|| AppError::SizeNotFound(machine.size.clone()))?;
    if !size.supports_shared_disks() {
        return Err(AppError::SharedDisk {
            id: String::new(),
            reason: format!(
                "size '{}' of machine '{}' does not support shared disks",
                size.name, machine.name
            ),
        });
    }
    if !resolver::can_add_data_disk(machine, resolver::ceilings(size)) {
        return Err(AppError::AttachmentLimit {
            machine: machine.name.clone(),
            size: size.name.clone(),
            what: "data disks",
            max: size.tags.max_data_disks,
        });
    }
    Ok(size)
}

/// Create a new shared disk on a machine, which becomes its primary. Returns the id.
pub fn create_shared_disk(
    config: &mut Configuration,
    catalogs: &Catalogs,
    machine_id: &str,
    size_gb: u32,
    sku: DiskSku,
) -> Result<String, AppError> {
    let index = config.machine_index(machine_id)?;
    let size = sharing_size(catalogs, &config.machines[index])?;
    if !resolver::supports_sku(size, sku) {
        return Err(AppError::SharedDisk {
            id: String::new(),
            reason: format!("SKU {} is not supported by size '{}'", sku, size.name),
        });
    }

    let id = new_shared_disk_id(config);
    config.machines[index].data_disks.push(DataDisk::shared(id.clone(), size_gb, sku));
    Ok(id)
}

/// Shared disk ids a machine could attach: not full and not already on that machine.
pub fn attachable_for(
    config: &Configuration,
    catalogs: &Catalogs,
    machine_id: &str,
) -> Vec<String> {
    let Some(machine) = config.machine(machine_id) else {
        return Vec::new();
    };
    shared_disks(config, catalogs)
        .into_iter()
        .filter(|shared| !shared.is_full() && !machine.references_shared_disk(&shared.id))
        .map(|shared| shared.id)
        .collect()
}

/// Attach an existing shared disk as the secondary reference on a machine.
pub fn attach_shared_disk(
    config: &mut Configuration,
    catalogs: &Catalogs,
    machine_id: &str,
    id: &str,
) -> Result<(), AppError> {
    let index = config.machine_index(machine_id)?;
    sharing_size(catalogs, &config.machines[index])?;

    if !attachable_for(config, catalogs, machine_id).iter().any(|candidate| candidate == id) {
        return Err(AppError::SharedDisk {
            id: id.to_string(),
            reason: "not available for attachment (unknown, full, or already attached)".into(),
        });
    }
    let primary = shared_disks(config, catalogs)
        .into_iter()
        .find(|shared| shared.id == id)
        .map(|shared| shared.primary_disk(config).clone())
        .ok_or_else(|| AppError::SharedDisk { id: id.to_string(), reason: "not found".into() })?;

    config.machines[index].data_disks.push(DataDisk::shared(id, primary.size_gb, primary.sku));
    Ok(())
}

/// Remove a data disk row. A shared disk whose last row is removed ceases to exist.
pub fn detach_disk(
    config: &mut Configuration,
    machine_id: &str,
    disk_index: usize,
) -> Result<DataDisk, AppError> {
    let index = config.machine_index(machine_id)?;
    let machine = &mut config.machines[index];
    if disk_index >= machine.data_disks.len() {
        return Err(AppError::DiskNotFound { machine: machine.name.clone(), index: disk_index });
    }
    Ok(machine.data_disks.remove(disk_index))
}

/// Edit a disk's SKU and/or size. Edits to a shared disk are written to every row that
/// references it, so primary and secondary stay consistent whichever side is edited.
///
/// Returns the number of rows written.
pub fn set_disk_properties(
    config: &mut Configuration,
    machine_id: &str,
    disk_index: usize,
    sku: Option<DiskSku>,
    size_gb: Option<u32>,
) -> Result<usize, AppError> {
    let index = config.machine_index(machine_id)?;
    let machine = &config.machines[index];
    let disk = machine.data_disks.get(disk_index).ok_or_else(|| AppError::DiskNotFound {
        machine: machine.name.clone(),
        index: disk_index,
    })?;

    let apply = |disk: &mut DataDisk| {
        if let Some(sku) = sku {
            disk.sku = sku;
        }
        if let Some(size_gb) = size_gb {
            disk.size_gb = size_gb;
        }
    };

    if !disk.shared || disk.shared_disk_id.is_empty() {
        apply(&mut config.machines[index].data_disks[disk_index]);
        return Ok(1);
    }

    let id = disk.shared_disk_id.clone();
    let mut written = 0;
    for disk in config.machines.iter_mut().flat_map(|m| m.data_disks.iter_mut()) {
        if disk.shared && disk.shared_disk_id == id {
            apply(disk);
            written += 1;
        }
    }
    Ok(written)
}

/// Turn every shared disk on a machine into an ordinary disk. Returns how many were converted.
pub fn convert_machine_to_local(machine: &mut Machine, size: &SizeCatalogEntry) -> usize {
    let mut converted = 0;
    for disk in machine.data_disks.iter_mut().filter(|d| d.shared) {
        demote(disk, size);
        converted += 1;
    }
    converted
}
