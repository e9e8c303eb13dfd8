//! Per-machine resources: public IPs, NICs and the virtual machine itself.

use std::net::Ipv4Addr;

use serde_json::{Value, json};

use super::constants::*;
use super::disks;
use super::payload;
use crate::domain::catalog::{DiskSku, Generation, ImageCatalogEntry, SizeCatalogEntry};
use crate::domain::identifiers::public_ip_name;
use crate::domain::model::{Machine, Nic};
use crate::domain::resolver;

const AUTHORIZED_KEYS_PATH: &str =
    "[concat('/home/', parameters('adminUsername'), '/.ssh/authorized_keys')]";

/// Catalog entries and derived values needed to emit one machine.
pub struct MachineContext<'a> {
    pub machine: &'a Machine,
    pub size: &'a SizeCatalogEntry,
    pub image: &'a ImageCatalogEntry,
    pub address: Ipv4Addr,
    /// Custom data with the hosts fragment already inserted.
    pub custom_data: String,
    pub zonal: bool,
}

/// Longest DNS label Azure accepts for a public IP.
pub const MAX_DNS_LABEL_LEN: usize = 63;

/// Room left for the static prefix after `-` and the 13-character `uniqueString` suffix.
pub const MAX_DNS_LABEL_PREFIX_LEN: usize = MAX_DNS_LABEL_LEN - 14;

/// DNS label for a public IP: lowercase, letters, digits and hyphens only.
pub fn dns_label_prefix(machine: &str, nic: &str) -> String {
    let label: String = nic_resource_name(machine, nic)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .take(MAX_DNS_LABEL_PREFIX_LEN)
        .collect();
    label.trim_end_matches('-').to_string()
}

fn public_ip(machine: &Machine, nic: &Nic) -> Value {
    json!({
        "type": PUBLIC_IP_TYPE,
        "apiVersion": NETWORK_API,
        "name": public_ip_name(&machine.name, &nic.name),
        "location": "[parameters('location')]",
        "sku": { "name": "Standard" },
        "properties": {
            "publicIPAllocationMethod": "Static",
            "dnsSettings": {
                "domainNameLabel": format!(
                    "[concat('{}', '-', uniqueString(resourceGroup().id))]",
                    dns_label_prefix(&machine.name, &nic.name)
                )
            }
        }
    })
}

fn network_interface(ctx: &MachineContext<'_>, index: usize, nic: &Nic) -> Value {
    let machine = ctx.machine;
    let mut depends_on = vec![subnet_id()];
    let mut ip_configuration = json!({
        "subnet": { "id": subnet_id() },
        "privateIPAllocationMethod": "Dynamic"
    });
    if index == 0 {
        ip_configuration["privateIPAllocationMethod"] = json!("Static");
        ip_configuration["privateIPAddress"] = json!(ctx.address.to_string());
    }
    if nic.public_ip {
        let pip_id = resource_id(PUBLIC_IP_TYPE, &public_ip_name(&machine.name, &nic.name));
        ip_configuration["publicIPAddress"] = json!({ "id": pip_id });
        depends_on.push(pip_id);
    }

    let accelerated = resolver::effective_accelerated_networking(ctx.size, nic);
    json!({
        "type": NIC_TYPE,
        "apiVersion": NETWORK_API,
        "name": nic_resource_name(&machine.name, &nic.name),
        "location": "[parameters('location')]",
        "dependsOn": depends_on,
        "properties": {
            "enableAcceleratedNetworking": accelerated,
            "ipConfigurations": [{ "name": "ipconfig1", "properties": ip_configuration }]
        }
    })
}

fn os_disk(machine: &Machine) -> Value {
    if machine.ephemeral_os_disk {
        json!({
            "name": os_disk_name(&machine.name),
            "createOption": "FromImage",
            "caching": "ReadOnly",
            "diffDiskSettings": { "option": "Local" }
        })
    } else {
        json!({
            "name": os_disk_name(&machine.name),
            "createOption": "FromImage",
            "caching": "ReadWrite",
            "managedDisk": { "storageAccountType": OS_DISK_SKU }
        })
    }
}

fn os_profile(ctx: &MachineContext<'_>) -> Value {
    json!({
        "computerName": ctx.machine.name,
        "adminUsername": "[parameters('adminUsername')]",
        "customData": payload::encode(&ctx.custom_data, ctx.machine.reboot),
        "linuxConfiguration": {
            "disablePasswordAuthentication": true,
            "ssh": {
                "publicKeys": [{
                    "path": AUTHORIZED_KEYS_PATH,
                    "keyData": "[parameters('adminPublicKey')]"
                }]
            }
        }
    })
}

fn virtual_machine(ctx: &MachineContext<'_>) -> Value {
    let machine = ctx.machine;
    let image = &ctx.image.image_ref;

    let mut storage_profile = json!({
        "imageReference": {
            "publisher": image.publisher,
            "offer": image.offer,
            "sku": image.sku,
            "version": image.version
        },
        "osDisk": os_disk(machine),
        "dataDisks": disks::data_disk_entries(machine)
    });
    if machine.generation == Generation::HIGHEST && ctx.image.generation == Generation::HIGHEST {
        storage_profile["diskControllerType"] = json!(machine.disk_controller.as_str());
    }

    let nic_ids: Vec<String> = machine
        .nics
        .iter()
        .map(|nic| resource_id(NIC_TYPE, &nic_resource_name(&machine.name, &nic.name)))
        .collect();
    let network_interfaces: Vec<Value> = nic_ids
        .iter()
        .enumerate()
        .map(|(i, id)| json!({ "id": id, "properties": { "primary": i == 0 } }))
        .collect();

    let mut depends_on = nic_ids.clone();
    for disk in machine.shared_disks() {
        let id = resource_id(DISK_TYPE, &disk.shared_disk_id);
        if !depends_on.contains(&id) {
            depends_on.push(id);
        }
    }

    let mut properties = json!({
        "hardwareProfile": { "vmSize": ctx.size.name },
        "storageProfile": storage_profile,
        "osProfile": os_profile(ctx),
        "networkProfile": { "networkInterfaces": network_interfaces }
    });
    if machine.data_disks.iter().any(|d| !d.shared && d.sku == DiskSku::Ultra) {
        properties["additionalCapabilities"] = json!({ "ultraSSDEnabled": true });
    }

    let mut resource = json!({
        "type": VM_TYPE,
        "apiVersion": COMPUTE_API,
        "name": machine.name,
        "location": "[parameters('location')]",
        "dependsOn": depends_on,
        "properties": properties
    });
    if ctx.zonal {
        resource["zones"] = json!(["[parameters('zone')]"]);
    }
    resource
}

/// Every resource for one machine: public IPs and NICs first, then the VM.
pub fn machine_resources(ctx: &MachineContext<'_>) -> Vec<Value> {
    let mut resources = Vec::new();
    for (i, nic) in ctx.machine.nics.iter().enumerate() {
        if nic.public_ip {
            resources.push(public_ip(ctx.machine, nic));
        }
        resources.push(network_interface(ctx, i, nic));
    }
    resources.push(virtual_machine(ctx));
    resources
}

#[cfg(test)]
mod tests {
    use crate::domain::catalog::DiskController;
    use crate::domain::model::DataDisk;
    use crate::testing::{catalogs, machine};

    use super::*;

    fn emit(machine: &Machine) -> Vec<Value> {
        let catalogs = catalogs();
        let ctx = MachineContext {
            machine,
            size: catalogs.size(&machine.size).unwrap(),
            image: catalogs.image(&machine.image).unwrap(),
            address: Ipv4Addr::new(10, 0, 0, 10),
            custom_data: String::new(),
            zonal: false,
        };
        machine_resources(&ctx)
    }

    #[test]
    fn primary_nic_gets_static_address_and_public_ip_dependency() {
        let mut vm = machine("a", "vm1", "Standard_D4s_v5");
        vm.image = "ubuntu-2204-gen2".into();
        vm.nics[0].public_ip = true;

        let resources = emit(&vm);

        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0]["name"], "vm1-nic1-pip");
        let nic = &resources[1];
        let ip = &nic["properties"]["ipConfigurations"][0]["properties"];
        assert_eq!(ip["privateIPAddress"], "10.0.0.10");
        assert_eq!(
            nic["dependsOn"][1],
            "[resourceId('Microsoft.Network/publicIPAddresses', 'vm1-nic1-pip')]"
        );
        assert_eq!(nic["properties"]["enableAcceleratedNetworking"], true);
    }

    #[test]
    fn controller_type_only_for_gen2_machine_and_image() {
        let mut vm = machine("a", "vm1", "Standard_E4bds_v5");
        vm.image = "ubuntu-2204-gen2".into();
        vm.disk_controller = DiskController::Nvme;
        let resources = emit(&vm);
        let profile = &resources[1]["properties"]["storageProfile"];
        assert_eq!(profile["diskControllerType"], "NVMe");

        let mut gen1 = machine("b", "vm2", "Standard_B2s");
        gen1.generation = Generation::Gen1;
        gen1.image = "ubuntu-2204-gen1".into();
        let resources = emit(&gen1);
        assert!(resources[1]["properties"]["storageProfile"].get("diskControllerType").is_none());
    }

    #[test]
    fn ultra_local_disk_enables_capability_and_ephemeral_os_uses_local_cache() {
        let mut vm = machine("a", "vm1", "Standard_D8ds_v5");
        vm.image = "ubuntu-2204-gen2".into();
        vm.ephemeral_os_disk = true;
        vm.data_disks.push(DataDisk::new(64, DiskSku::Ultra));

        let resources = emit(&vm);
        let properties = &resources[1]["properties"];

        assert_eq!(properties["additionalCapabilities"]["ultraSSDEnabled"], true);
        assert_eq!(properties["storageProfile"]["osDisk"]["diffDiskSettings"]["option"], "Local");
        assert_eq!(properties["storageProfile"]["osDisk"]["caching"], "ReadOnly");
    }

    #[test]
    fn vm_depends_on_shared_disk_once() {
        let mut vm = machine("a", "vm1", "Standard_D4s_v5");
        vm.image = "ubuntu-2204-gen2".into();
        vm.data_disks = vec![DataDisk::shared("sd-1", 64, DiskSku::Premium)];
        let resources = emit(&vm);
        let depends_on = resources[1]["dependsOn"].as_array().unwrap();
        assert_eq!(depends_on.len(), 2);
        assert_eq!(depends_on[1], "[resourceId('Microsoft.Compute/disks', 'sd-1')]");
    }

    #[test]
    fn dns_label_is_lowercase_and_safe() {
        assert_eq!(dns_label_prefix("Web01", "eth_0"), "web01-eth-0");
    }

    #[test]
    fn dns_label_leaves_room_for_unique_suffix() {
        let name = format!("a{}", "b".repeat(59));
        let prefix = dns_label_prefix(&name, "nic1");
        assert_eq!(prefix.len(), MAX_DNS_LABEL_PREFIX_LEN);
        assert!(prefix.starts_with("abbb"));
        assert!(prefix.len() + 1 + 13 <= MAX_DNS_LABEL_LEN);

        // A cut that lands on a separator does not leave a trailing hyphen.
        let name = "c".repeat(48);
        assert_eq!(dns_label_prefix(&name, "nic1"), name);
    }
}
