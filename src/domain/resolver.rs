//! Compatibility resolver: size-keyed lookups that narrow a machine's choices and heal
//! fields the size does not permit.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::catalog::{
    AccelNetMode, Architecture, Catalogs, DiskController, DiskSku, Generation, ImageCatalogEntry,
    SizeCatalogEntry,
};
use crate::domain::model::{Machine, Nic};

/// Maximum NIC and data disk counts for a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentCeilings {
    pub max_nics: u32,
    pub max_data_disks: u32,
}

/// Fields changed by [`resolve_machine`], for phrasing user notices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corrections {
    pub generation: bool,
    pub disk_controller: bool,
    pub publisher_filter_cleared: bool,
    pub image: bool,
    pub disk_skus: usize,
    pub ephemeral_os_disk: bool,
}

impl Corrections {
    /// Number of fields changed.
    pub fn count(&self) -> usize {
        [
            self.generation,
            self.disk_controller,
            self.publisher_filter_cleared,
            self.image,
            self.ephemeral_os_disk,
        ]
        .into_iter()
        .filter(|changed| *changed)
        .count()
            + self.disk_skus
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Short human-readable list of what changed.
    pub fn describe(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.generation {
            notes.push("generation reset".to_string());
        }
        if self.disk_controller {
            notes.push("disk controller reset".to_string());
        }
        if self.publisher_filter_cleared {
            notes.push("publisher filter cleared".to_string());
        }
        if self.image {
            notes.push("image reset".to_string());
        }
        if self.disk_skus > 0 {
            notes.push(format!("{} disk SKU(s) reset", self.disk_skus));
        }
        if self.ephemeral_os_disk {
            notes.push("ephemeral OS disk disabled".to_string());
        }
        notes
    }
}

pub fn allowed_generations(size: &SizeCatalogEntry) -> &[Generation] {
    &size.tags.generations
}

/// Controllers allowed for a generation; SCSI only when the size says nothing.
pub fn allowed_controllers(size: &SizeCatalogEntry, generation: Generation) -> Vec<DiskController> {
    match size.tags.disk_controllers_by_gen.get(&generation) {
        Some(controllers) if !controllers.is_empty() => controllers.clone(),
        _ => vec![DiskController::Scsi],
    }
}

/// Architectures used to filter images; x64 when the size says nothing.
pub fn allowed_architectures(size: &SizeCatalogEntry) -> Vec<Architecture> {
    if size.tags.architectures.is_empty() {
        vec![Architecture::X64]
    } else {
        size.tags.architectures.clone()
    }
}

/// Images compatible with a size, generation, controller and optional publisher.
pub fn allowed_images<'c>(
    catalogs: &'c Catalogs,
    size: &SizeCatalogEntry,
    generation: Generation,
    controller: DiskController,
    publisher: Option<&str>,
) -> Vec<&'c ImageCatalogEntry> {
    let architectures = allowed_architectures(size);
    catalogs
        .images()
        .iter()
        .filter(|image| image.generation == generation)
        .filter(|image| architectures.contains(&image.arch))
        .filter(|image| match controller {
            DiskController::Nvme => image.nvme_capable,
            DiskController::Scsi => image.scsi_capable,
        })
        .filter(|image| publisher.is_none_or(|p| image.image_ref.publisher == p))
        .collect()
}

/// SKU support for a size, with documented defaults for SKUs it does not mention.
pub fn disk_sku_support(size: &SizeCatalogEntry) -> BTreeMap<DiskSku, bool> {
    DiskSku::ALL
        .into_iter()
        .map(|sku| {
            let supported =
                size.tags.disk_sku_support.get(&sku).copied().unwrap_or(sku.default_support());
            (sku, supported)
        })
        .collect()
}

pub fn supports_sku(size: &SizeCatalogEntry, sku: DiskSku) -> bool {
    size.tags.disk_sku_support.get(&sku).copied().unwrap_or(sku.default_support())
}

/// StandardSSD when supported, else the first supported SKU, else Standard.
pub fn default_disk_sku(size: &SizeCatalogEntry) -> DiskSku {
    if supports_sku(size, DiskSku::StandardSsd) {
        return DiskSku::StandardSsd;
    }
    DiskSku::ALL.into_iter().find(|sku| supports_sku(size, *sku)).unwrap_or(DiskSku::Standard)
}

/// Accelerated networking actually deployed for a NIC on this size.
///
/// `required` and `unsupported` override the stored preference, which is left untouched so
/// that switching to an `optional` size restores what the user chose.
pub fn effective_accelerated_networking(size: &SizeCatalogEntry, nic: &Nic) -> bool {
    match size.tags.accel_net_mode {
        AccelNetMode::Required => true,
        AccelNetMode::Unsupported => false,
        AccelNetMode::Optional => nic.accelerated_networking,
    }
}

pub fn ceilings(size: &SizeCatalogEntry) -> AttachmentCeilings {
    AttachmentCeilings { max_nics: size.tags.max_nics, max_data_disks: size.tags.max_data_disks }
}

pub fn can_add_nic(machine: &Machine, ceilings: AttachmentCeilings) -> bool {
    (machine.nics.len() as u64) < u64::from(ceilings.max_nics)
}

pub fn can_add_data_disk(machine: &Machine, ceilings: AttachmentCeilings) -> bool {
    (machine.data_disks.len() as u64) < u64::from(ceilings.max_data_disks)
}

/// Heal every size-dependent field of a machine.
///
/// Unknown sizes are left alone; the validator reports them. Shared disks keep their SKU
/// here because the shared-disk allocator owns their properties.
pub fn resolve_machine(catalogs: &Catalogs, machine: &mut Machine) -> Corrections {
    let mut corrections = Corrections::default();
    let Some(size) = catalogs.size(&machine.size) else {
        debug!(machine = %machine.name, size = %machine.size, "size not in catalog");
        return corrections;
    };

    let generations = allowed_generations(size);
    if !generations.contains(&machine.generation)
        && let Some(first) = generations.first()
    {
        debug!(
            machine = %machine.name,
            from = %machine.generation,
            to = %first,
            "generation reset"
        );
        machine.generation = *first;
        corrections.generation = true;
    }

    let controllers = allowed_controllers(size, machine.generation);
    if !controllers.contains(&machine.disk_controller) {
        let replacement = controllers[0];
        debug!(
            machine = %machine.name,
            from = %machine.disk_controller,
            to = %replacement,
            "disk controller reset"
        );
        machine.disk_controller = replacement;
        corrections.disk_controller = true;
    }

    let mut images = allowed_images(
        catalogs,
        size,
        machine.generation,
        machine.disk_controller,
        machine.publisher_filter.as_deref(),
    );
    if images.is_empty() && machine.publisher_filter.is_some() {
        debug!(machine = %machine.name, "no image matches publisher filter; clearing it");
        machine.publisher_filter = None;
        corrections.publisher_filter_cleared = true;
        images = allowed_images(catalogs, size, machine.generation, machine.disk_controller, None);
    }
    let replacement = images.first().map(|image| image.key.clone()).unwrap_or_default();
    if !images.iter().any(|image| image.key == machine.image) && machine.image != replacement {
        debug!(machine = %machine.name, from = %machine.image, to = %replacement, "image reset");
        machine.image = replacement;
        corrections.image = true;
    }

    let default_sku = default_disk_sku(size);
    for disk in machine.data_disks.iter_mut().filter(|d| !d.shared) {
        if !supports_sku(size, disk.sku) {
            debug!(machine = %machine.name, from = %disk.sku, to = %default_sku, "disk SKU reset");
            disk.sku = default_sku;
            corrections.disk_skus += 1;
        }
    }

    if machine.ephemeral_os_disk && !size.supports_ephemeral_os_disk() {
        debug!(machine = %machine.name, "ephemeral OS disk not supported by size; disabled");
        machine.ephemeral_os_disk = false;
        corrections.ephemeral_os_disk = true;
    }

    corrections
}

#[cfg(test)]
mod tests {
    use crate::domain::model::DataDisk;
    use crate::testing::{catalogs, machine};

    use super::*;

    #[test]
    fn invalid_generation_resets_to_first_allowed() {
        let catalogs = catalogs();
        let mut vm = machine("vm-1", "vm1", "Standard_A2_v2");
        vm.generation = Generation::Gen2;

        let corrections = resolve_machine(&catalogs, &mut vm);

        assert_eq!(vm.generation, Generation::Gen1);
        assert!(corrections.generation);
        assert_eq!(vm.image, "ubuntu-2204-gen1");
    }

    #[test]
    fn nvme_only_size_forces_controller_and_nvme_image() {
        let catalogs = catalogs();
        let mut vm = machine("vm-1", "vm1", "Standard_D4s_v6");
        vm.image = "alma-9-gen2".into();

        let corrections = resolve_machine(&catalogs, &mut vm);

        assert_eq!(vm.disk_controller, DiskController::Nvme);
        assert!(corrections.disk_controller);
        assert!(corrections.image);
        assert!(catalogs.image(&vm.image).unwrap().nvme_capable);
    }

    #[test]
    fn arm_size_only_offers_arm_images() {
        let catalogs = catalogs();
        let size = catalogs.size("Standard_D4ps_v5").unwrap();
        let images =
            allowed_images(&catalogs, size, Generation::Gen2, DiskController::Scsi, None);
        assert!(!images.is_empty());
        assert!(images.iter().all(|i| i.arch == Architecture::Arm64));
    }

    #[test]
    fn publisher_filter_is_cleared_when_it_empties_the_list() {
        let catalogs = catalogs();
        let mut vm = machine("vm-1", "vm1", "Standard_D4ps_v5");
        vm.publisher_filter = Some("RedHat".into());

        let corrections = resolve_machine(&catalogs, &mut vm);

        assert!(corrections.publisher_filter_cleared);
        assert_eq!(vm.publisher_filter, None);
        assert_eq!(vm.image, "ubuntu-2204-arm64");
    }

    #[test]
    fn publisher_filter_narrows_images() {
        let catalogs = catalogs();
        let mut vm = machine("vm-1", "vm1", "Standard_D4s_v5");
        vm.publisher_filter = Some("Debian".into());

        resolve_machine(&catalogs, &mut vm);

        assert_eq!(vm.image, "debian-12-gen2");
        assert_eq!(vm.publisher_filter.as_deref(), Some("Debian"));
    }

    #[test]
    fn unsupported_local_disk_sku_resets_to_default() {
        let catalogs = catalogs();
        let mut vm = machine("vm-1", "vm1", "Standard_A2_v2");
        vm.data_disks.push(DataDisk::new(64, DiskSku::Premium));
        vm.data_disks.push(DataDisk::new(64, DiskSku::Standard));

        let corrections = resolve_machine(&catalogs, &mut vm);

        assert_eq!(corrections.disk_skus, 1);
        assert_eq!(vm.data_disks[0].sku, DiskSku::StandardSsd);
        assert_eq!(vm.data_disks[1].sku, DiskSku::Standard);
    }

    #[test]
    fn default_sku_prefers_standard_ssd() {
        let catalogs = catalogs();
        assert_eq!(default_disk_sku(catalogs.size("Standard_B2s").unwrap()), DiskSku::StandardSsd);

        let mut size = catalogs.size("Standard_B2s").unwrap().clone();
        size.tags.disk_sku_support.insert(DiskSku::StandardSsd, false);
        assert_eq!(default_disk_sku(&size), DiskSku::Standard);
        size.tags.disk_sku_support.insert(DiskSku::Standard, false);
        assert_eq!(default_disk_sku(&size), DiskSku::Premium);
    }

    #[test]
    fn missing_sku_keys_fall_back_to_defaults() {
        let catalogs = catalogs();
        let mut size = catalogs.size("Standard_D4s_v5").unwrap().clone();
        size.tags.disk_sku_support.clear();
        let support = disk_sku_support(&size);
        assert!(support[&DiskSku::Premium]);
        assert!(!support[&DiskSku::Ultra]);
    }

    #[test]
    fn accelerated_networking_follows_size_mode() {
        let catalogs = catalogs();
        let mut nic = Nic::new("nic-1", "nic1");

        let required = catalogs.size("Standard_D4s_v5").unwrap();
        let optional = catalogs.size("Standard_D2s_v5").unwrap();
        let unsupported = catalogs.size("Standard_B2s").unwrap();

        assert!(effective_accelerated_networking(required, &nic));
        assert!(!effective_accelerated_networking(optional, &nic));
        nic.accelerated_networking = true;
        assert!(effective_accelerated_networking(optional, &nic));
        assert!(!effective_accelerated_networking(unsupported, &nic));
    }

    #[test]
    fn stored_acceleration_preference_survives_size_round_trip() {
        let catalogs = catalogs();
        let mut vm = machine("vm-1", "vm1", "Standard_D2s_v5");
        vm.nics[0].accelerated_networking = false;

        vm.size = "Standard_D4s_v5".into();
        resolve_machine(&catalogs, &mut vm);
        assert!(!vm.nics[0].accelerated_networking);

        vm.size = "Standard_D2s_v5".into();
        resolve_machine(&catalogs, &mut vm);
        assert!(!vm.nics[0].accelerated_networking);
    }

    #[test]
    fn ephemeral_os_disk_cleared_when_unsupported() {
        let catalogs = catalogs();
        let mut vm = machine("vm-1", "vm1", "Standard_D8ds_v5");
        vm.ephemeral_os_disk = true;
        assert!(!resolve_machine(&catalogs, &mut vm).ephemeral_os_disk);

        vm.size = "Standard_D4s_v5".into();
        let corrections = resolve_machine(&catalogs, &mut vm);
        assert!(corrections.ephemeral_os_disk);
        assert!(!vm.ephemeral_os_disk);
    }

    #[test]
    fn unknown_size_is_left_for_the_validator() {
        let catalogs = catalogs();
        let mut vm = machine("vm-1", "vm1", "Standard_Unknown");
        let before = vm.clone();
        assert!(resolve_machine(&catalogs, &mut vm).is_empty());
        assert_eq!(vm, before);
    }

    #[test]
    fn corrections_count_and_describe() {
        let corrections = Corrections { generation: true, disk_skus: 2, ..Default::default() };
        assert_eq!(corrections.count(), 3);
        assert_eq!(corrections.describe(), vec!["generation reset", "2 disk SKU(s) reset"]);
    }
}
