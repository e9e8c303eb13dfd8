use std::collections::HashSet;

use super::{Category, Verdict};
use crate::domain::catalog::Catalogs;
use crate::domain::identifiers::shared_disk_id_problem;
use crate::domain::model::Configuration;
use crate::domain::resolver;
use crate::domain::shared_disk::{self, MAX_SHARED_ATTACHMENTS};

/// Shared-disk validity across the whole configuration.
///
/// The allocator should already have repaired all of this; anything left is a hard failure.
pub(super) fn check_shared_disks(
    config: &Configuration,
    catalogs: &Catalogs,
    verdict: &mut Verdict,
) {
    for machine in &config.machines {
        let size = catalogs.size(&machine.size);
        let mut seen = HashSet::new();
        for (i, disk) in machine.data_disks.iter().enumerate().filter(|(_, d)| d.shared) {
            let subject = format!("{} disk {}", machine.name, i + 1);
            if let Some(problem) = shared_disk_id_problem(&disk.shared_disk_id) {
                verdict.push(Category::SharedDisk, subject, problem);
                continue;
            }
            if !seen.insert(disk.shared_disk_id.as_str()) {
                verdict.push(
                    Category::SharedDisk,
                    subject,
                    format!(
                        "shared disk {} is already attached to this machine",
                        disk.shared_disk_id
                    ),
                );
                continue;
            }
            let Some(size) = size else {
                continue;
            };
            if !size.supports_shared_disks() {
                verdict.push(
                    Category::SharedDisk,
                    subject,
                    format!("size {} does not support shared disks", size.name),
                );
            } else if !resolver::supports_sku(size, disk.sku) {
                verdict.push(
                    Category::SharedDisk,
                    subject,
                    format!("shared disk SKU {} is not supported by size {}", disk.sku, size.name),
                );
            }
        }
    }

    for shared in shared_disk::all_shared_references(config) {
        if shared.references.len() > MAX_SHARED_ATTACHMENTS {
            verdict.push(
                Category::SharedDisk,
                format!("shared disk {}", shared.id),
                format!(
                    "attached to {} machines; at most {} allowed",
                    shared.references.len(),
                    MAX_SHARED_ATTACHMENTS
                ),
            );
        }
    }
}
