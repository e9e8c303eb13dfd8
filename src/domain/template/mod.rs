//! Template generator: a pure fold from a validated configuration to an ARM deployment
//! template.
//!
//! Two pre-passes (shared-disk plan, zone decision) run before resources are emitted. The
//! input is never mutated and identical inputs give identical documents.

pub mod addressing;
pub mod constants;
pub mod disks;
pub mod file_shares;
pub mod machines;
pub mod network;
pub mod payload;

use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::AppError;
use crate::domain::catalog::Catalogs;
use crate::domain::model::Configuration;
use constants::*;
use machines::MachineContext;

/// Everything the generator reads.
#[derive(Debug, Clone, Copy)]
pub struct TemplateInput<'a> {
    pub catalogs: &'a Catalogs,
    pub configuration: &'a Configuration,
}

/// A generated deployment template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    document: Value,
}

impl Template {
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn into_document(self) -> Value {
        self.document
    }

    pub fn resources(&self) -> &[Value] {
        self.document["resources"].as_array().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn resources_of_type<'t>(
        &'t self,
        resource_type: &'t str,
    ) -> impl Iterator<Item = &'t Value> {
        self.resources().iter().filter(move |r| r["type"] == resource_type)
    }

    pub fn resource(&self, resource_type: &str, name: &str) -> Option<&Value> {
        self.resources().iter().find(|r| r["type"] == resource_type && r["name"] == name)
    }

    /// Output values by name; empty when no storage protocol is enabled.
    pub fn outputs(&self) -> Option<&Map<String, Value>> {
        self.document["outputs"].as_object()
    }

    pub fn template_hash(&self) -> &str {
        self.document["metadata"]["_generator"]["templateHash"].as_str().unwrap_or_default()
    }

    pub fn to_pretty_string(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(&self.document).map_err(|e| AppError::SerializeError {
            what: "template".into(),
            details: e.to_string(),
        })
    }
}

fn parameters(config: &Configuration, zonal: bool) -> Map<String, Value> {
    let mut parameters = Map::new();
    parameters.insert(
        "location".into(),
        json!({ "type": "string", "defaultValue": "[resourceGroup().location]" }),
    );
    parameters.insert(
        "adminUsername".into(),
        json!({ "type": "string", "defaultValue": config.deployment.admin_username }),
    );
    parameters.insert(
        "adminPublicKey".into(),
        json!({
            "type": "string",
            "metadata": { "description": "SSH public key for the admin user" }
        }),
    );
    if zonal {
        parameters.insert(
            "zone".into(),
            json!({ "type": "string", "allowedValues": ZONES, "defaultValue": DEFAULT_ZONE }),
        );
    }
    parameters
}

fn hash_body(body: &Value) -> Result<String, AppError> {
    let serialized = serde_json::to_string(body)
        .map_err(|e| AppError::SerializeError { what: "template".into(), details: e.to_string() })?;
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    let digest = hasher.finalize();
    Ok(digest.iter().map(|byte| format!("{:02x}", byte)).collect())
}

/// Build the deployment template.
///
/// The configuration must have passed the validator; sizes or images missing from the
/// catalogs are reported as errors rather than emitted.
pub fn generate(input: &TemplateInput<'_>) -> Result<Template, AppError> {
    let TemplateInput { catalogs, configuration: config } = *input;

    let shared_plan = disks::plan_shared_disks(config, catalogs);
    let zonal = disks::document_requires_zone(&config.machines, &shared_plan);

    let mut resources = vec![
        network::security_group(&config.nsg_rules),
        network::virtual_network(),
        network::subnet(),
    ];

    let storage = file_shares::build(&config.storage);
    resources.extend(storage.resources);

    let hosts = addressing::assign_addresses(&config.machines)?;
    let fragment = addressing::hosts_fragment(&hosts)?;

    resources.extend(shared_plan.iter().map(disks::shared_disk_resource));

    for (machine, host) in config.machines.iter().zip(&hosts) {
        let size = catalogs
            .size(&machine.size)
            .ok_or_else(|| AppError::SizeNotFound(machine.size.clone()))?;
        let image = catalogs
            .image(&machine.image)
            .ok_or_else(|| AppError::ImageNotFound(machine.image.clone()))?;
        let ctx = MachineContext {
            machine,
            size,
            image,
            address: host.address,
            custom_data: addressing::insert_fragment(&machine.custom_data, &fragment),
            zonal: disks::machine_requires_zone(machine, &shared_plan),
        };
        resources.extend(machines::machine_resources(&ctx));
    }

    let body = json!({
        "parameters": parameters(config, zonal),
        "variables": storage.variables,
        "resources": resources,
        "outputs": storage.outputs,
    });
    let template_hash = hash_body(&body)?;

    let mut document = json!({
        "$schema": SCHEMA,
        "contentVersion": CONTENT_VERSION,
        "metadata": {
            "_generator": {
                "name": GENERATOR_NAME,
                "version": GENERATOR_VERSION,
                "templateHash": template_hash
            }
        }
    });
    if let (Some(root), Value::Object(body)) = (document.as_object_mut(), body) {
        root.extend(body);
    }

    info!(
        machines = config.machines.len(),
        shared_disks = shared_plan.len(),
        zonal,
        "template generated"
    );
    Ok(Template { document })
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    use crate::domain::catalog::DiskSku;
    use crate::domain::model::{DataDisk, FileShareOption, Machine};
    use crate::domain::sanitize::sanitize;
    use crate::testing::{catalogs, machine};

    use super::*;

    fn render(catalogs: &Catalogs, config: &Configuration) -> Template {
        generate(&TemplateInput { catalogs, configuration: config }).unwrap()
    }

    fn config(machines: Vec<Machine>) -> Configuration {
        let mut config = Configuration { machines, ..Default::default() };
        sanitize(&mut config, &catalogs());
        config
    }

    fn public_pair() -> Configuration {
        let mut vm1 = machine("a", "vm1", "Standard_D2s_v5");
        vm1.nics[0].public_ip = true;
        let mut vm2 = machine("b", "vm2", "Standard_D2s_v5");
        vm2.nics[0].public_ip = true;
        config(vec![vm1, vm2])
    }

    fn private_address(template: &Template, nic: &str) -> String {
        template.resource(NIC_TYPE, nic).unwrap()["properties"]["ipConfigurations"][0]["properties"]
            ["privateIPAddress"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn generation_is_deterministic_with_sequential_addresses() {
        let catalogs = catalogs();
        let config = public_pair();
        let input = TemplateInput { catalogs: &catalogs, configuration: &config };

        let first = generate(&input).unwrap();
        let second = generate(&input).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.template_hash().len(), 64);
        assert_eq!(private_address(&first, "vm1-nic1"), "10.0.0.10");
        assert_eq!(private_address(&first, "vm2-nic1"), "10.0.0.11");
    }

    #[test]
    fn document_has_fixed_schema_and_no_zone_without_zonal_disks() {
        let catalogs = catalogs();
        let config = public_pair();
        let template = render(&catalogs, &config);
        let document = template.document();

        assert_eq!(document["$schema"], SCHEMA);
        assert_eq!(document["contentVersion"], "1.0.0.0");
        assert_eq!(document["parameters"]["adminUsername"]["defaultValue"], "azureuser");
        assert!(document["parameters"].get("zone").is_none());
        assert_eq!(template.resources_of_type(PUBLIC_IP_TYPE).count(), 2);
        assert_eq!(template.resources_of_type(VM_TYPE).count(), 2);
    }

    #[test]
    fn shared_pair_is_emitted_once_and_zones_both_machines() {
        let mut a = machine("a", "db1", "Standard_D4s_v5");
        a.data_disks.push(DataDisk::shared("sd-1", 256, DiskSku::Premium));
        let mut b = machine("b", "db2", "Standard_D4s_v5");
        b.data_disks.push(DataDisk::shared("sd-1", 256, DiskSku::Premium));
        let catalogs = catalogs();
        let config = config(vec![a, b]);

        let template = render(&catalogs, &config);

        assert_eq!(template.resources_of_type(DISK_TYPE).count(), 1);
        assert_eq!(template.document()["parameters"]["zone"]["defaultValue"], "1");
        for vm in template.resources_of_type(VM_TYPE) {
            assert_eq!(vm["zones"][0], "[parameters('zone')]");
        }
    }

    #[test]
    fn effective_acceleration_is_forced_without_touching_stored_preference() {
        let catalogs = catalogs();
        let config = config(vec![machine("a", "vm1", "Standard_D4s_v5")]);
        assert!(!config.machines[0].nics[0].accelerated_networking);

        let template = render(&catalogs, &config);

        let nic = template.resource(NIC_TYPE, "vm1-nic1").unwrap();
        assert_eq!(nic["properties"]["enableAcceleratedNetworking"], true);
        assert!(!config.machines[0].nics[0].accelerated_networking);
    }

    #[test]
    fn custom_data_carries_hosts_fragment_and_reboot() {
        let mut vm = machine("a", "vm1", "Standard_D2s_v5");
        vm.custom_data = "#!/bin/sh\necho hello\r\n".into();
        vm.reboot = true;
        let catalogs = catalogs();
        let config = config(vec![vm]);

        let template = render(&catalogs, &config);
        let vm = template.resource(VM_TYPE, "vm1").unwrap();
        let encoded = vm["properties"]["osProfile"]["customData"].as_str().unwrap().to_string();
        let decoded = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();

        assert!(decoded.starts_with("#!/bin/sh\n# >>> vmtemplate hosts sync >>>\n"));
        assert!(decoded.contains("10.0.0.10 vm1\n"));
        assert!(decoded.ends_with("echo hello\n\nshutdown -r +1\n"));
    }

    #[test]
    fn storage_outputs_appear_for_enabled_protocols() {
        let catalogs = catalogs();
        let mut config = config(vec![machine("a", "vm1", "Standard_D2s_v5")]);
        config.storage.nfs = FileShareOption { enabled: true, share_name: "data".into() };

        let template = render(&catalogs, &config);
        let outputs = template.outputs().unwrap();

        assert_eq!(outputs.len(), 2);
        assert!(outputs.contains_key("nfsMountPath"));
        assert_eq!(template.resources_of_type(PRIVATE_DNS_ZONE_TYPE).count(), 1);
    }

    #[test]
    fn input_is_not_mutated() {
        let catalogs = catalogs();
        let config = public_pair();
        let before = config.clone();
        generate(&TemplateInput { catalogs: &catalogs, configuration: &config }).unwrap();
        assert_eq!(before, config);
    }
}
