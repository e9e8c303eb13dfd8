//! Validator and generation gate.
//!
//! Every predicate runs over the post-sanitize configuration and pushes violations into a
//! [`Verdict`]. Violations are data; generation is permitted only while the set is empty.

mod attachments;
mod naming;
mod network;
mod shared;

use std::fmt;

use crate::domain::catalog::Catalogs;
use crate::domain::model::Configuration;

/// Kind of violation, in headline precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Size or image missing from the catalogs.
    Catalog,
    /// NIC or data disk count over the size's ceiling.
    AttachmentLimit,
    SharedDisk,
    StorageShare,
    NsgRule,
    MachineName,
    Nic,
    DiskSize,
}

impl Category {
    fn label(&self) -> &'static str {
        match self {
            Category::Catalog => "catalog",
            Category::AttachmentLimit => "attachment limit",
            Category::SharedDisk => "shared disk",
            Category::StorageShare => "storage share",
            Category::NsgRule => "NSG rule",
            Category::MachineName => "machine name",
            Category::Nic => "NIC",
            Category::DiskSize => "disk size",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub category: Category,
    /// What the violation is about, e.g. `vm1`, `vm1/nic2`, `vm1 disk 1`.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Outcome of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    violations: Vec<Violation>,
}

impl Verdict {
    pub(crate) fn push(
        &mut self,
        category: Category,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.violations.push(Violation {
            category,
            subject: subject.into(),
            message: message.into(),
        });
    }

    /// Whether the generator may run.
    pub fn is_permitted(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn count(&self) -> usize {
        self.violations.len()
    }

    pub fn has(&self, category: Category) -> bool {
        self.violations.iter().any(|v| v.category == category)
    }

    /// Every violation as `subject: message`.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    /// One prioritized diagnosis for a human, or `None` when generation is permitted.
    ///
    /// Catalog, attachment, shared-disk, storage and NSG problems each win outright in that
    /// order. Name, NIC and disk-size problems are reported together when more than one kind
    /// is present.
    pub fn headline(&self) -> Option<String> {
        if self.is_permitted() {
            return None;
        }

        let first_of = |category: Category| self.violations.iter().find(|v| v.category == category);
        for category in [
            Category::Catalog,
            Category::AttachmentLimit,
            Category::SharedDisk,
            Category::StorageShare,
            Category::NsgRule,
        ] {
            if let Some(violation) = first_of(category) {
                return Some(violation.to_string());
            }
        }

        let present: Vec<Category> = [Category::MachineName, Category::Nic, Category::DiskSize]
            .into_iter()
            .filter(|c| self.has(*c))
            .collect();
        match present.as_slice() {
            [only] => first_of(*only).map(ToString::to_string),
            [first, second] => {
                Some(format!("Fix {} and {} errors before generating", first, second))
            }
            [_, _, _] => {
                Some("Fix machine name, NIC and disk size errors before generating".to_string())
            }
            _ => Some("Fix NIC validation errors before generating".to_string()),
        }
    }
}

/// Run every predicate over the configuration.
pub fn validate(config: &Configuration, catalogs: &Catalogs) -> Verdict {
    let mut verdict = Verdict::default();
    naming::check_machine_names(config, &mut verdict);
    for machine in &config.machines {
        attachments::check_catalog_references(machine, catalogs, &mut verdict);
        naming::check_nics(machine, &mut verdict);
        attachments::check_ceilings(machine, catalogs, &mut verdict);
        attachments::check_disk_sizes(machine, &mut verdict);
    }
    shared::check_shared_disks(config, catalogs, &mut verdict);
    network::check_storage_shares(config, &mut verdict);
    network::check_nsg_rules(config, &mut verdict);
    verdict
}

#[cfg(test)]
mod tests {
    use crate::domain::catalog::DiskSku;
    use crate::domain::model::DataDisk;
    use crate::domain::sanitize::sanitize;
    use crate::testing::{catalogs, machine};

    use super::*;

    fn sanitized(machines: Vec<crate::domain::model::Machine>) -> Configuration {
        let mut config = Configuration { machines, ..Default::default() };
        sanitize(&mut config, &catalogs());
        config
    }

    #[test]
    fn clean_configuration_is_permitted() {
        let config = sanitized(vec![machine("vm-1", "vm1", "Standard_D4s_v5")]);
        let verdict = validate(&config, &catalogs());
        assert!(verdict.is_permitted(), "{:?}", verdict.messages());
        assert_eq!(verdict.headline(), None);
    }

    #[test]
    fn zero_size_disk_fails_with_disk_size_reason() {
        let mut vm = machine("vm-1", "vm1", "Standard_D4s_v5");
        vm.data_disks.push(DataDisk::new(0, DiskSku::Premium));
        let config = sanitized(vec![vm]);

        let verdict = validate(&config, &catalogs());

        assert!(!verdict.is_permitted());
        assert_eq!(verdict.violations()[0].category, Category::DiskSize);
        assert_eq!(
            verdict.headline().as_deref(),
            Some("vm1 disk 1: size must be larger than 1 GB")
        );
    }

    #[test]
    fn attachment_limits_win_the_headline() {
        let mut vm = machine("vm-1", "bad_name", "Standard_D4s_v5");
        vm.data_disks = vec![DataDisk::new(0, DiskSku::Premium); 9];
        let config = sanitized(vec![vm]);

        let verdict = validate(&config, &catalogs());

        assert!(verdict.has(Category::MachineName));
        assert!(verdict.has(Category::DiskSize));
        assert_eq!(
            verdict.headline().as_deref(),
            Some("bad_name: 9 data disks exceed the maximum of 8 for Standard_D4s_v5")
        );
    }

    #[test]
    fn name_and_disk_errors_combine() {
        let mut vm = machine("vm-1", "-vm", "Standard_D4s_v5");
        vm.data_disks.push(DataDisk::new(1, DiskSku::Premium));
        let config = sanitized(vec![vm]);

        let verdict = validate(&config, &catalogs());

        assert_eq!(
            verdict.headline().as_deref(),
            Some("Fix machine name and disk size errors before generating")
        );
        assert_eq!(verdict.count(), 2);
    }

    #[test]
    fn unknown_size_is_a_catalog_violation() {
        let config = sanitized(vec![machine("vm-1", "vm1", "Standard_Nope")]);
        let verdict = validate(&config, &catalogs());
        assert_eq!(verdict.violations()[0].category, Category::Catalog);
        assert!(verdict.headline().unwrap_or_default().contains("Standard_Nope"));
    }
}
