use std::collections::HashSet;

use super::{Category, Verdict};
use crate::domain::identifiers::{MAX_PUBLIC_IP_NAME_LEN, machine_name_problem, public_ip_name};
use crate::domain::model::{Configuration, Machine};

/// Machine names: format, then case-insensitive uniqueness across the configuration.
pub(super) fn check_machine_names(config: &Configuration, verdict: &mut Verdict) {
    let mut seen = HashSet::new();
    for machine in &config.machines {
        if let Some(problem) = machine_name_problem(&machine.name) {
            verdict.push(Category::MachineName, display_name(machine), problem);
            continue;
        }
        if !seen.insert(machine.name.to_ascii_lowercase()) {
            verdict.push(
                Category::MachineName,
                &machine.name,
                "name is already used by another machine",
            );
        }
    }
}

/// NIC presence, names unique within the machine, and public IP name length.
pub(super) fn check_nics(machine: &Machine, verdict: &mut Verdict) {
    if machine.nics.is_empty() {
        verdict.push(Category::Nic, display_name(machine), "at least one NIC is required");
        return;
    }

    let mut seen = HashSet::new();
    for (i, nic) in machine.nics.iter().enumerate() {
        let subject = format!("{}/{}", display_name(machine), nic.name);
        if nic.name.trim().is_empty() {
            let subject = format!("{} NIC {}", display_name(machine), i + 1);
            verdict.push(Category::Nic, subject, "NIC name is required");
            continue;
        }
        if !seen.insert(nic.name.to_ascii_lowercase()) {
            verdict.push(Category::Nic, subject, "NIC name is already used on this machine");
            continue;
        }
        let pip = public_ip_name(&machine.name, &nic.name);
        if pip.len() > MAX_PUBLIC_IP_NAME_LEN {
            verdict.push(
                Category::Nic,
                subject,
                format!("public IP name '{}' exceeds {} characters", pip, MAX_PUBLIC_IP_NAME_LEN),
            );
        }
    }
}

pub(super) fn display_name(machine: &Machine) -> &str {
    if machine.name.is_empty() { "(unnamed machine)" } else { &machine.name }
}
