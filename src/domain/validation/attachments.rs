use super::naming::display_name;
use super::{Category, Verdict};
use crate::domain::catalog::Catalogs;
use crate::domain::model::Machine;
use crate::domain::resolver;

/// Size and image must exist in the catalogs.
pub(super) fn check_catalog_references(
    machine: &Machine,
    catalogs: &Catalogs,
    verdict: &mut Verdict,
) {
    if catalogs.size(&machine.size).is_none() {
        verdict.push(
            Category::Catalog,
            display_name(machine),
            format!("size '{}' is not in the size catalog", machine.size),
        );
    }
    if machine.image.is_empty() {
        verdict.push(Category::Catalog, display_name(machine), "no compatible image selected");
    } else if catalogs.image(&machine.image).is_none() {
        verdict.push(
            Category::Catalog,
            display_name(machine),
            format!("image '{}' is not in the image catalog", machine.image),
        );
    }
}

/// NIC and data disk counts against the size's ceilings.
pub(super) fn check_ceilings(machine: &Machine, catalogs: &Catalogs, verdict: &mut Verdict) {
    let Some(size) = catalogs.size(&machine.size) else {
        return;
    };
    let ceilings = resolver::ceilings(size);

    if machine.nics.len() as u64 > u64::from(ceilings.max_nics) {
        verdict.push(
            Category::AttachmentLimit,
            display_name(machine),
            format!(
                "{} NICs exceed the maximum of {} for {}",
                machine.nics.len(),
                ceilings.max_nics,
                size.name
            ),
        );
    }
    if machine.data_disks.len() as u64 > u64::from(ceilings.max_data_disks) {
        verdict.push(
            Category::AttachmentLimit,
            display_name(machine),
            format!(
                "{} data disks exceed the maximum of {} for {}",
                machine.data_disks.len(),
                ceilings.max_data_disks,
                size.name
            ),
        );
    }
}

/// Each data disk must be larger than 1 GB and within its SKU's maximum.
pub(super) fn check_disk_sizes(machine: &Machine, verdict: &mut Verdict) {
    for (i, disk) in machine.data_disks.iter().enumerate() {
        let subject = format!("{} disk {}", display_name(machine), i + 1);
        if disk.size_gb <= 1 {
            verdict.push(Category::DiskSize, subject, "size must be larger than 1 GB");
        } else if disk.size_gb > disk.sku.max_size_gb() {
            verdict.push(
                Category::DiskSize,
                subject,
                format!(
                    "{} GB exceeds the {} GB limit for {}",
                    disk.size_gb,
                    disk.sku.max_size_gb(),
                    disk.sku
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::catalog::DiskSku;
    use crate::domain::model::{DataDisk, Nic};
    use crate::testing::{catalogs, machine};

    use super::*;

    #[test]
    fn disk_size_bounds_follow_sku() {
        let mut vm = machine("a", "vm1", "Standard_D4s_v5");
        vm.data_disks = vec![
            DataDisk::new(2, DiskSku::Premium),
            DataDisk::new(32767, DiskSku::Premium),
            DataDisk::new(32768, DiskSku::Premium),
            DataDisk::new(65536, DiskSku::Ultra),
        ];
        let mut verdict = Verdict::default();
        check_disk_sizes(&vm, &mut verdict);
        assert_eq!(
            verdict.messages(),
            vec!["vm1 disk 3: 32768 GB exceeds the 32767 GB limit for Premium_LRS"]
        );
    }

    #[test]
    fn nic_ceiling_is_enforced() {
        let mut vm = machine("a", "vm1", "Standard_D4s_v5");
        vm.nics.push(Nic::new("n2", "nic2"));
        vm.nics.push(Nic::new("n3", "nic3"));
        let mut verdict = Verdict::default();
        check_ceilings(&vm, &catalogs(), &mut verdict);
        assert_eq!(
            verdict.messages(),
            vec!["vm1: 3 NICs exceed the maximum of 2 for Standard_D4s_v5"]
        );
    }

    #[test]
    fn unknown_image_is_reported() {
        let mut vm = machine("a", "vm1", "Standard_D4s_v5");
        vm.image = "gentoo".into();
        let mut verdict = Verdict::default();
        check_catalog_references(&vm, &catalogs(), &mut verdict);
        assert_eq!(verdict.messages(), vec!["vm1: image 'gentoo' is not in the image catalog"]);
    }
}
