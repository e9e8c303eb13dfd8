//! The single auto-correction entry point: resolver per machine, then the shared-disk pass.

use crate::domain::catalog::Catalogs;
use crate::domain::model::Configuration;
use crate::domain::resolver::{self, Corrections};
use crate::domain::shared_disk::{self, AllocationReport};

/// Corrections applied to one machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineCorrections {
    pub machine: String,
    pub corrections: Corrections,
}

/// Everything a sanitize pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub ids_assigned: usize,
    pub machines: Vec<MachineCorrections>,
    pub shared_disks: AllocationReport,
}

impl SanitizeReport {
    pub fn is_empty(&self) -> bool {
        self.ids_assigned == 0 && self.machines.is_empty() && self.shared_disks.is_empty()
    }

    /// Total number of field-level corrections across all machines.
    pub fn correction_count(&self) -> usize {
        self.machines.iter().map(|m| m.corrections.count()).sum()
    }
}

/// Heal the configuration in place.
///
/// Must run to completion before the validator sees the configuration.
pub fn sanitize(config: &mut Configuration, catalogs: &Catalogs) -> SanitizeReport {
    let ids_assigned = config.assign_missing_ids();

    let mut machines = Vec::new();
    for machine in config.machines.iter_mut() {
        let corrections = resolver::resolve_machine(catalogs, machine);
        if !corrections.is_empty() {
            machines.push(MachineCorrections { machine: machine.name.clone(), corrections });
        }
    }

    let shared_disks = shared_disk::enforce(config, catalogs);

    SanitizeReport { ids_assigned, machines, shared_disks }
}
