use super::{Category, Verdict};
use crate::domain::identifiers::share_name_problem;
use crate::domain::model::{Configuration, parse_port_range};

/// Share names, only for protocols that are enabled.
pub(super) fn check_storage_shares(config: &Configuration, verdict: &mut Verdict) {
    for (protocol, share_name) in config.storage.enabled() {
        if let Some(problem) = share_name_problem(share_name) {
            verdict.push(Category::StorageShare, format!("{} share", protocol), problem);
        }
    }
}

/// Custom NSG rule ports must be a port or an ascending range within 1-65535.
pub(super) fn check_nsg_rules(config: &Configuration, verdict: &mut Verdict) {
    for (i, rule) in config.nsg_rules.iter().enumerate() {
        if parse_port_range(&rule.port).is_none() {
            verdict.push(
                Category::NsgRule,
                format!("NSG rule {}", i + 1),
                format!("invalid port or range '{}'", rule.port),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::model::{FileShareOption, NsgProtocol, NsgRule, NsgSource, StorageOptions};

    use super::*;

    #[test]
    fn disabled_share_names_are_ignored() {
        let config = Configuration {
            storage: StorageOptions {
                smb: FileShareOption { enabled: false, share_name: "BAD".into() },
                nfs: FileShareOption { enabled: true, share_name: "ab".into() },
            },
            ..Default::default()
        };
        let mut verdict = Verdict::default();
        check_storage_shares(&config, &mut verdict);
        assert_eq!(verdict.messages(), vec!["NFS share: share name must be 3-63 characters"]);
    }

    #[test]
    fn bad_port_ranges_are_reported() {
        let rule = |port: &str| NsgRule {
            protocol: NsgProtocol::Tcp,
            port: port.into(),
            source: NsgSource::Internet,
        };
        let config =
            Configuration { nsg_rules: vec![rule("443"), rule("9000-8000")], ..Default::default() };
        let mut verdict = Verdict::default();
        check_nsg_rules(&config, &mut verdict);
        assert_eq!(verdict.messages(), vec!["NSG rule 2: invalid port or range '9000-8000'"]);
    }
}
