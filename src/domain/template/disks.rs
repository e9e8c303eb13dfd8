//! Disk resources and the zonal placement decision.

use serde_json::{Value, json};

use super::constants::*;
use crate::domain::catalog::Catalogs;
use crate::domain::model::{Configuration, DataDisk, Machine};
use crate::domain::shared_disk::{self, MAX_SHARED_ATTACHMENTS, SharedDisk};

/// One shared disk resource to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedDiskPlan {
    pub id: String,
    pub disk: DataDisk,
    pub zonal: bool,
}

/// Shared disks to emit, in discovery order, sized from their primary reference.
pub fn plan_shared_disks(config: &Configuration, catalogs: &Catalogs) -> Vec<SharedDiskPlan> {
    shared_disk::shared_disks(config, catalogs)
        .iter()
        .map(|shared: &SharedDisk| SharedDiskPlan {
            id: shared.id.clone(),
            disk: shared.primary_disk(config).clone(),
            zonal: shared.requires_zone(config),
        })
        .collect()
}

/// Whether a machine must be pinned to the zone parameter.
pub fn machine_requires_zone(machine: &Machine, shared: &[SharedDiskPlan]) -> bool {
    machine.data_disks.iter().any(|disk| {
        if disk.shared {
            shared.iter().any(|plan| plan.id == disk.shared_disk_id && plan.zonal)
        } else {
            disk.sku.is_zonal_only()
        }
    })
}

/// Whether the document needs the `zone` parameter at all.
pub fn document_requires_zone(machines: &[Machine], shared: &[SharedDiskPlan]) -> bool {
    shared.iter().any(|plan| plan.zonal)
        || machines
            .iter()
            .flat_map(|m| m.data_disks.iter())
            .any(|disk| !disk.shared && disk.sku.is_zonal_only())
}

pub fn shared_disk_resource(plan: &SharedDiskPlan) -> Value {
    let mut resource = json!({
        "type": DISK_TYPE,
        "apiVersion": DISK_API,
        "name": plan.id,
        "location": "[parameters('location')]",
        "sku": { "name": plan.disk.sku.as_str() },
        "properties": {
            "creationData": { "createOption": "Empty" },
            "diskSizeGB": plan.disk.size_gb,
            "maxShares": MAX_SHARED_ATTACHMENTS
        }
    });
    if plan.zonal {
        resource["zones"] = json!(["[parameters('zone')]"]);
    }
    resource
}

/// `dataDisks` entries of a machine's storage profile, LUNs in list order.
pub fn data_disk_entries(machine: &Machine) -> Vec<Value> {
    machine
        .data_disks
        .iter()
        .enumerate()
        .map(|(lun, disk)| {
            if disk.shared {
                json!({
                    "lun": lun,
                    "name": disk.shared_disk_id,
                    "createOption": "Attach",
                    "managedDisk": { "id": resource_id(DISK_TYPE, &disk.shared_disk_id) }
                })
            } else {
                json!({
                    "lun": lun,
                    "name": data_disk_name(&machine.name, lun),
                    "createOption": "Empty",
                    "diskSizeGB": disk.size_gb,
                    "managedDisk": { "storageAccountType": disk.sku.as_str() }
                })
            }
        })
        .collect()
}
