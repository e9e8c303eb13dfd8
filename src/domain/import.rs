//! Best-effort reconstruction of a configuration from a previously generated template.
//!
//! Machines whose size or image cannot be matched are skipped with a reason. Custom data is
//! never recovered and shared-disk attachment is not reconstructed: imported disks are
//! always ordinary disks.

use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::catalog::{Catalogs, DiskController, DiskSku};
use crate::domain::model::{
    Configuration, DataDisk, DeploymentSettings, FileShareOption, FileShareProtocol, Machine, Nic,
    NsgProtocol, NsgRule, NsgSource, StorageOptions,
};
use crate::domain::template::constants::{
    DISK_TYPE, FILE_SHARE_TYPE, NIC_TYPE, NSG_TYPE, SSH_RULE_NAME, VM_TYPE,
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Malformed template: {0}")]
    Malformed(String),

    #[error("No machines could be imported ({} skipped)", .skipped.len())]
    NoMachines { skipped: Vec<SkippedMachine> },
}

/// A VM resource that could not be matched against the catalogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMachine {
    pub name: String,
    pub reason: String,
}

/// What became of a machine's custom data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadRecovery {
    /// The template carried this payload in recoverable form (empty when there was none).
    Recovered(String),
    /// The template carried encoded custom data, which is one-way; the payload was cleared.
    ClearedOnImport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedMachine {
    pub machine: Machine,
    pub payload: PayloadRecovery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub machines: Vec<ImportedMachine>,
    pub skipped: Vec<SkippedMachine>,
    pub storage: StorageOptions,
    pub nsg_rules: Vec<NsgRule>,
    pub deployment: DeploymentSettings,
}

impl ImportOutcome {
    /// A fresh configuration holding everything that matched, with ids assigned.
    pub fn into_configuration(self) -> Configuration {
        let mut config = Configuration {
            id_seq: 0,
            deployment: self.deployment,
            machines: self
                .machines
                .into_iter()
                .map(|imported| {
                    let mut machine = imported.machine;
                    if let PayloadRecovery::Recovered(payload) = imported.payload {
                        machine.custom_data = payload;
                    }
                    machine
                })
                .collect(),
            storage: self.storage,
            nsg_rules: self.nsg_rules,
        };
        config.assign_missing_ids();
        config
    }
}

/// Last single-quoted argument of an ARM expression such as `[resourceId('T', 'name')]`.
fn last_quoted_arg(expression: &str) -> Option<&str> {
    expression.rsplit('\'').nth(1)
}

fn is_type(resource: &Value, resource_type: &str) -> bool {
    resource["type"].as_str().is_some_and(|t| t.eq_ignore_ascii_case(resource_type))
}

fn find<'d>(resources: &'d [Value], resource_type: &str, name: &str) -> Option<&'d Value> {
    resources
        .iter()
        .filter(|r| is_type(r, resource_type))
        .find(|r| r["name"].as_str().is_some_and(|n| n.eq_ignore_ascii_case(name)))
}

/// Parse template text and import it.
pub fn import_str(text: &str, catalogs: &Catalogs) -> Result<ImportOutcome, ImportError> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))?;
    import_template(&document, catalogs)
}

pub fn import_template(
    document: &Value,
    catalogs: &Catalogs,
) -> Result<ImportOutcome, ImportError> {
    let resources = document
        .get("resources")
        .and_then(Value::as_array)
        .ok_or_else(|| ImportError::Malformed("document has no resources array".into()))?;

    let mut machines = Vec::new();
    let mut skipped = Vec::new();
    for vm in resources.iter().filter(|r| is_type(r, VM_TYPE)) {
        match import_machine(vm, resources, catalogs) {
            Ok(imported) => machines.push(imported),
            Err(skip) => {
                warn!(machine = %skip.name, reason = %skip.reason, "machine skipped on import");
                skipped.push(skip);
            }
        }
    }

    if machines.is_empty() {
        return Err(ImportError::NoMachines { skipped });
    }
    info!(imported = machines.len(), skipped = skipped.len(), "template imported");

    let deployment = document["parameters"]["adminUsername"]["defaultValue"]
        .as_str()
        .map(|name| DeploymentSettings { admin_username: name.to_string() })
        .unwrap_or_default();

    Ok(ImportOutcome {
        machines,
        skipped,
        storage: import_storage(resources),
        nsg_rules: import_nsg_rules(resources),
        deployment,
    })
}

fn import_machine(
    vm: &Value,
    resources: &[Value],
    catalogs: &Catalogs,
) -> Result<ImportedMachine, SkippedMachine> {
    let name = vm["name"].as_str().unwrap_or_default().to_string();
    let skip = |reason: String| SkippedMachine { name: name.clone(), reason };
    if name.is_empty() || name.starts_with('[') {
        return Err(skip("machine name is missing or is an expression".into()));
    }

    let properties = &vm["properties"];
    let size_name = properties["hardwareProfile"]["vmSize"].as_str().unwrap_or_default();
    let size = catalogs
        .size_ignore_case(size_name)
        .ok_or_else(|| skip(format!("size '{}' is not in the size catalog", size_name)))?;

    let storage = &properties["storageProfile"];
    let reference = &storage["imageReference"];
    let field = |key: &str| reference[key].as_str().unwrap_or_default().to_string();
    let (publisher, offer, sku) = (field("publisher"), field("offer"), field("sku"));
    let image = catalogs.image_by_ref(&publisher, &offer, &sku).ok_or_else(|| {
        skip(format!("image {}/{}/{} is not in the image catalog", publisher, offer, sku))
    })?;

    let mut machine = Machine::new("", name.clone(), size.name.clone());
    machine.generation = image.generation;
    machine.image = image.key.clone();
    machine.disk_controller = storage["diskControllerType"]
        .as_str()
        .and_then(|c| DiskController::from_str(c).ok())
        .unwrap_or_default();
    machine.ephemeral_os_disk = storage["osDisk"].get("diffDiskSettings").is_some();
    machine.nics = import_nics(&name, properties, resources);
    machine.data_disks = import_disks(storage, resources);

    let payload = match properties["osProfile"]["customData"].as_str() {
        Some(encoded) if !encoded.is_empty() => PayloadRecovery::ClearedOnImport,
        _ => PayloadRecovery::Recovered(String::new()),
    };

    Ok(ImportedMachine { machine, payload })
}

fn import_nics(machine: &str, properties: &Value, resources: &[Value]) -> Vec<Nic> {
    let prefix = format!("{}-", machine);
    properties["networkProfile"]["networkInterfaces"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|reference| reference["id"].as_str().and_then(last_quoted_arg))
        .map(|resource_name| {
            let name = resource_name.strip_prefix(&prefix).unwrap_or(resource_name);
            let mut nic = Nic::new("", name);
            if let Some(resource) = find(resources, NIC_TYPE, resource_name) {
                let nic_properties = &resource["properties"];
                nic.accelerated_networking =
                    nic_properties["enableAcceleratedNetworking"].as_bool().unwrap_or(false);
                nic.public_ip = nic_properties["ipConfigurations"][0]["properties"]
                    .get("publicIPAddress")
                    .is_some();
            }
            nic
        })
        .collect()
}

fn parse_sku(value: &Value) -> DiskSku {
    value.as_str().and_then(|s| DiskSku::from_str(s).ok()).unwrap_or(DiskSku::StandardSsd)
}

/// Sizes that are missing or do not fit in `u32` come back as 0 for the validator to reject.
fn parse_disk_size(value: &Value) -> u32 {
    value.as_u64().and_then(|gb| u32::try_from(gb).ok()).unwrap_or(0)
}

fn import_disks(storage: &Value, resources: &[Value]) -> Vec<DataDisk> {
    storage["dataDisks"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|entry| {
            let attached =
                entry["createOption"].as_str().is_some_and(|o| o.eq_ignore_ascii_case("Attach"));
            let disk_resource = attached
                .then(|| entry["managedDisk"]["id"].as_str().and_then(last_quoted_arg))
                .flatten()
                .and_then(|name| find(resources, DISK_TYPE, name));
            match disk_resource {
                Some(disk) => DataDisk::new(
                    parse_disk_size(&disk["properties"]["diskSizeGB"]),
                    parse_sku(&disk["sku"]["name"]),
                ),
                None => DataDisk::new(
                    parse_disk_size(&entry["diskSizeGB"]),
                    parse_sku(&entry["managedDisk"]["storageAccountType"]),
                ),
            }
        })
        .collect()
}

fn import_storage(resources: &[Value]) -> StorageOptions {
    let mut storage = StorageOptions::default();
    for share in resources.iter().filter(|r| is_type(r, FILE_SHARE_TYPE)) {
        let Some(share_name) = share["name"]
            .as_str()
            .and_then(last_quoted_arg)
            .and_then(|path| path.rsplit('/').next())
        else {
            continue;
        };
        let option = FileShareOption { enabled: true, share_name: share_name.to_string() };
        match share["properties"]["enabledProtocols"].as_str() {
            Some(p) if p.eq_ignore_ascii_case(FileShareProtocol::Nfs.as_str()) => {
                storage.nfs = option
            }
            _ => storage.smb = option,
        }
    }
    storage
}

fn import_nsg_rules(resources: &[Value]) -> Vec<NsgRule> {
    let Some(nsg) = resources.iter().find(|r| is_type(r, NSG_TYPE)) else {
        return Vec::new();
    };
    nsg["properties"]["securityRules"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter(|rule| rule["name"].as_str() != Some(SSH_RULE_NAME))
        .filter_map(|rule| {
            let properties = &rule["properties"];
            let protocol = match properties["protocol"].as_str()? {
                p if p.eq_ignore_ascii_case("Tcp") => NsgProtocol::Tcp,
                p if p.eq_ignore_ascii_case("Udp") => NsgProtocol::Udp,
                _ => return None,
            };
            let source = match properties["sourceAddressPrefix"].as_str()? {
                s if s.eq_ignore_ascii_case("AzureCloud") => NsgSource::AzureCloud,
                s if s.eq_ignore_ascii_case("Internet") => NsgSource::Internet,
                _ => return None,
            };
            let port = properties["destinationPortRange"].as_str()?.to_string();
            Some(NsgRule { protocol, port, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::model::NsgRule;
    use crate::domain::sanitize::sanitize;
    use crate::domain::template::{TemplateInput, generate};
    use crate::testing::{catalogs, machine};

    use super::*;

    fn generated(config: &Configuration) -> Value {
        let catalogs = catalogs();
        let input = TemplateInput { catalogs: &catalogs, configuration: config };
        generate(&input).unwrap().into_document()
    }

    fn sample() -> Configuration {
        let mut db1 = machine("a", "db1", "Standard_D4s_v5");
        db1.custom_data = "echo hi".into();
        db1.nics[0].public_ip = true;
        db1.nics.push(Nic::new("n2", "backend"));
        db1.data_disks = vec![
            DataDisk::new(64, DiskSku::Premium),
            DataDisk::shared("sd-1", 512, DiskSku::Premium),
        ];
        let mut db2 = machine("b", "db2", "Standard_D4s_v5");
        db2.data_disks = vec![DataDisk::shared("sd-1", 512, DiskSku::Premium)];

        let mut config = Configuration { machines: vec![db1, db2], ..Default::default() };
        config.deployment.admin_username = "ops".into();
        config.storage.smb = FileShareOption { enabled: true, share_name: "team".into() };
        config.nsg_rules.push(NsgRule {
            protocol: NsgProtocol::Udp,
            port: "5000-5010".into(),
            source: NsgSource::Internet,
        });
        sanitize(&mut config, &catalogs());
        config
    }

    #[test]
    fn round_trip_keeps_shape_but_not_sharing_or_payload() {
        let outcome = import_template(&generated(&sample()), &catalogs()).unwrap();

        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.machines.len(), 2);
        let db1 = &outcome.machines[0];
        assert_eq!(db1.payload, PayloadRecovery::ClearedOnImport);
        assert_eq!(db1.machine.size, "Standard_D4s_v5");
        assert_eq!(db1.machine.image, "ubuntu-2204-gen2");
        let nic_names: Vec<_> = db1.machine.nics.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(nic_names, vec!["nic1", "backend"]);
        assert!(db1.machine.nics[0].public_ip);
        assert!(db1.machine.nics[0].accelerated_networking);
        assert_eq!(
            db1.machine.data_disks,
            vec![DataDisk::new(64, DiskSku::Premium), DataDisk::new(512, DiskSku::Premium)]
        );
        assert!(db1.machine.custom_data.is_empty());

        assert_eq!(outcome.storage.smb.share_name, "team");
        assert!(!outcome.storage.nfs.enabled);
        assert_eq!(outcome.nsg_rules.len(), 1);
        assert_eq!(outcome.nsg_rules[0].port, "5000-5010");
        assert_eq!(outcome.deployment.admin_username, "ops");

        let config = outcome.into_configuration();
        assert!(config.machines.iter().all(|m| !m.id.is_empty()));
    }

    #[test]
    fn unmatched_machines_are_skipped_with_reason() {
        let mut document = generated(&sample());
        let resources = document["resources"].as_array_mut().unwrap();
        for r in resources.iter_mut().filter(|r| r["type"] == VM_TYPE) {
            if r["name"] == "db2" {
                r["properties"]["hardwareProfile"]["vmSize"] = json!("Standard_Z99");
            }
        }

        let outcome = import_template(&document, &catalogs()).unwrap();

        assert_eq!(outcome.machines.len(), 1);
        assert_eq!(outcome.skipped[0].name, "db2");
        assert!(outcome.skipped[0].reason.contains("Standard_Z99"));
    }

    #[test]
    fn size_and_image_match_ignoring_case() {
        let document = json!({
            "resources": [{
                "type": "microsoft.compute/virtualMachines",
                "name": "vm1",
                "properties": {
                    "hardwareProfile": { "vmSize": "standard_b2s" },
                    "storageProfile": {
                        "imageReference": {
                            "publisher": "canonical",
                            "offer": "0001-COM-UBUNTU-SERVER-JAMMY",
                            "sku": "22_04-LTS-GEN2"
                        }
                    }
                }
            }]
        });
        let outcome = import_template(&document, &catalogs()).unwrap();
        let machine = &outcome.machines[0].machine;
        assert_eq!(machine.size, "Standard_B2s");
        assert_eq!(machine.image, "ubuntu-2204-gen2");
        assert_eq!(outcome.machines[0].payload, PayloadRecovery::Recovered(String::new()));
    }

    #[test]
    fn oversized_disk_size_imports_as_zero() {
        let document = json!({
            "resources": [{
                "type": VM_TYPE,
                "name": "vm1",
                "properties": {
                    "hardwareProfile": { "vmSize": "Standard_B2s" },
                    "storageProfile": {
                        "imageReference": {
                            "publisher": "Canonical",
                            "offer": "0001-com-ubuntu-server-jammy",
                            "sku": "22_04-lts-gen2"
                        },
                        "dataDisks": [
                            { "diskSizeGB": 4_294_967_297u64, "managedDisk": {} },
                            { "diskSizeGB": 128, "managedDisk": {} }
                        ]
                    }
                }
            }]
        });
        let outcome = import_template(&document, &catalogs()).unwrap();
        let sizes: Vec<_> =
            outcome.machines[0].machine.data_disks.iter().map(|d| d.size_gb).collect();
        assert_eq!(sizes, vec![0, 128]);
    }

    #[test]
    fn nothing_matched_is_a_total_failure() {
        let document = json!({
            "resources": [{
                "type": VM_TYPE,
                "name": "vm1",
                "properties": { "hardwareProfile": { "vmSize": "Nope" } }
            }]
        });
        let err = import_template(&document, &catalogs()).unwrap_err();
        assert!(matches!(err, ImportError::NoMachines { ref skipped } if skipped.len() == 1));
        assert_eq!(err.to_string(), "No machines could be imported (1 skipped)");
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(import_str("not json", &catalogs()), Err(ImportError::Malformed(_))));
        assert!(matches!(import_template(&json!({}), &catalogs()), Err(ImportError::Malformed(_))));
    }
}
