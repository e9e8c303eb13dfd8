//! Fixed identifiers of the emitted document. Import depends on these staying stable.

pub const SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#";
pub const CONTENT_VERSION: &str = "1.0.0.0";
pub const GENERATOR_NAME: &str = env!("CARGO_PKG_NAME");
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NETWORK_API: &str = "2023-09-01";
pub const COMPUTE_API: &str = "2023-09-01";
pub const DISK_API: &str = "2023-04-02";
pub const STORAGE_API: &str = "2023-01-01";
pub const PRIVATE_DNS_API: &str = "2020-06-01";

pub const NSG_TYPE: &str = "Microsoft.Network/networkSecurityGroups";
pub const VNET_TYPE: &str = "Microsoft.Network/virtualNetworks";
pub const SUBNET_TYPE: &str = "Microsoft.Network/virtualNetworks/subnets";
pub const PUBLIC_IP_TYPE: &str = "Microsoft.Network/publicIPAddresses";
pub const NIC_TYPE: &str = "Microsoft.Network/networkInterfaces";
pub const DISK_TYPE: &str = "Microsoft.Compute/disks";
pub const VM_TYPE: &str = "Microsoft.Compute/virtualMachines";
pub const STORAGE_ACCOUNT_TYPE: &str = "Microsoft.Storage/storageAccounts";
pub const FILE_SHARE_TYPE: &str = "Microsoft.Storage/storageAccounts/fileServices/shares";
pub const PRIVATE_ENDPOINT_TYPE: &str = "Microsoft.Network/privateEndpoints";
pub const DNS_ZONE_GROUP_TYPE: &str = "Microsoft.Network/privateEndpoints/privateDnsZoneGroups";
pub const PRIVATE_DNS_ZONE_TYPE: &str = "Microsoft.Network/privateDnsZones";
pub const DNS_ZONE_LINK_TYPE: &str = "Microsoft.Network/privateDnsZones/virtualNetworkLinks";

pub const NSG_NAME: &str = "nsg";
pub const VNET_NAME: &str = "vnet";
pub const SUBNET_NAME: &str = "default";
pub const VNET_PREFIX: &str = "10.0.0.0/16";
pub const SUBNET_PREFIX: &str = "10.0.0.0/24";
/// Network part of every primary NIC address.
pub const SUBNET_BASE: [u8; 3] = [10, 0, 0];
/// Host number of the first machine's primary NIC.
pub const FIRST_HOST: u8 = 10;
/// Highest usable host number; Azure reserves .255.
pub const LAST_HOST: u8 = 254;

pub const SSH_RULE_NAME: &str = "AllowSSH";
pub const SSH_RULE_PRIORITY: u32 = 1000;
pub const CUSTOM_RULE_BASE_PRIORITY: u32 = 1010;
pub const CUSTOM_RULE_PRIORITY_STEP: u32 = 10;

pub const OS_DISK_SKU: &str = "StandardSSD_LRS";
pub const ZONES: [&str; 3] = ["1", "2", "3"];
pub const DEFAULT_ZONE: &str = "1";

pub const DEFAULT_INTERPRETER: &str = "#!/bin/bash";
pub const REBOOT_COMMAND: &str = "shutdown -r +1";

pub const FILE_DNS_ZONE: &str = "privatelink.file.core.windows.net";
pub const FILE_ENDPOINT_SUFFIX: &str = ".file.core.windows.net";
pub const DNS_LINK_NAME: &str = "vnet-link";

/// `[resourceId('<type>', '<name>')]` expression.
pub fn resource_id(resource_type: &str, name: &str) -> String {
    format!("[resourceId('{}', '{}')]", resource_type, name)
}

/// `[resourceId('<type>', '<parent>', '<child>')]` expression for a child resource.
pub fn child_resource_id(resource_type: &str, parent: &str, child: &str) -> String {
    format!("[resourceId('{}', '{}', '{}')]", resource_type, parent, child)
}

pub fn subnet_id() -> String {
    child_resource_id(SUBNET_TYPE, VNET_NAME, SUBNET_NAME)
}

pub fn nic_resource_name(machine: &str, nic: &str) -> String {
    format!("{}-{}", machine, nic)
}

pub fn data_disk_name(machine: &str, lun: usize) -> String {
    format!("{}-data-{}", machine, lun)
}

pub fn os_disk_name(machine: &str) -> String {
    format!("{}-osdisk", machine)
}
