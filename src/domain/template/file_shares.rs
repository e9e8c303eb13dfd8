//! Azure Files add-on: one private DNS zone shared by both protocols, then an account, share,
//! private endpoint and zone binding per enabled protocol.

use serde_json::{Map, Value, json};

use super::constants::*;
use crate::domain::model::{FileShareProtocol, StorageOptions};

/// Template variable holding the storage account name for a protocol.
pub fn account_variable(protocol: FileShareProtocol) -> String {
    format!("{}AccountName", protocol.slug())
}

fn account_expr(protocol: FileShareProtocol) -> String {
    format!("variables('{}')", account_variable(protocol))
}

fn account_id(protocol: FileShareProtocol) -> String {
    format!("[resourceId('{}', {})]", STORAGE_ACCOUNT_TYPE, account_expr(protocol))
}

fn endpoint_name(protocol: FileShareProtocol) -> String {
    format!("{}-pe", protocol.slug())
}

/// `[concat(...)]` resource name of the share under its account.
pub fn share_resource_name(protocol: FileShareProtocol, share: &str) -> String {
    format!("[concat({}, '/default/{}')]", account_expr(protocol), share)
}

/// Resources, variables and outputs contributed by the storage add-on.
#[derive(Debug, Default)]
pub struct FileShareResources {
    pub variables: Map<String, Value>,
    pub resources: Vec<Value>,
    pub outputs: Map<String, Value>,
}

pub fn build(storage: &StorageOptions) -> FileShareResources {
    let mut built = FileShareResources::default();
    if !storage.any_enabled() {
        return built;
    }

    built.resources.push(dns_zone());
    built.resources.push(dns_zone_link());

    for (protocol, share) in storage.enabled() {
        built.variables.insert(
            account_variable(protocol),
            json!(format!("[concat('{}', uniqueString(resourceGroup().id))]", protocol.slug())),
        );
        built.resources.push(storage_account(protocol));
        built.resources.push(file_share(protocol, share));
        built.resources.push(private_endpoint(protocol));
        built.resources.push(dns_zone_group(protocol));

        built.outputs.insert(
            format!("{}StorageAccountName", protocol.slug()),
            json!({ "type": "string", "value": format!("[{}]", account_expr(protocol)) }),
        );
        built.outputs.insert(
            format!("{}MountPath", protocol.slug()),
            json!({ "type": "string", "value": mount_path(protocol, share) }),
        );
    }
    built
}

/// UNC path for SMB, `host:/path` for NFS.
pub fn mount_path(protocol: FileShareProtocol, share: &str) -> String {
    let account = account_expr(protocol);
    match protocol {
        FileShareProtocol::Smb => {
            format!("[concat('\\\\', {}, '{}\\{}')]", account, FILE_ENDPOINT_SUFFIX, share)
        }
        FileShareProtocol::Nfs => {
            format!(
                "[concat({}, '{}:/', {}, '/{}')]",
                account, FILE_ENDPOINT_SUFFIX, account, share
            )
        }
    }
}

fn dns_zone() -> Value {
    json!({
        "type": PRIVATE_DNS_ZONE_TYPE,
        "apiVersion": PRIVATE_DNS_API,
        "name": FILE_DNS_ZONE,
        "location": "global"
    })
}

fn dns_zone_link() -> Value {
    json!({
        "type": DNS_ZONE_LINK_TYPE,
        "apiVersion": PRIVATE_DNS_API,
        "name": format!("{}/{}", FILE_DNS_ZONE, DNS_LINK_NAME),
        "location": "global",
        "dependsOn": [
            resource_id(PRIVATE_DNS_ZONE_TYPE, FILE_DNS_ZONE),
            resource_id(VNET_TYPE, VNET_NAME)
        ],
        "properties": {
            "registrationEnabled": false,
            "virtualNetwork": { "id": resource_id(VNET_TYPE, VNET_NAME) }
        }
    })
}

fn storage_account(protocol: FileShareProtocol) -> Value {
    let (kind, sku, https_only) = match protocol {
        FileShareProtocol::Smb => ("StorageV2", "Standard_LRS", true),
        FileShareProtocol::Nfs => ("FileStorage", "Premium_LRS", false),
    };
    json!({
        "type": STORAGE_ACCOUNT_TYPE,
        "apiVersion": STORAGE_API,
        "name": format!("[{}]", account_expr(protocol)),
        "location": "[parameters('location')]",
        "kind": kind,
        "sku": { "name": sku },
        "properties": {
            "minimumTlsVersion": "TLS1_2",
            "supportsHttpsTrafficOnly": https_only,
            "publicNetworkAccess": "Disabled"
        }
    })
}

fn file_share(protocol: FileShareProtocol, share: &str) -> Value {
    let mut properties = json!({
        "enabledProtocols": protocol.as_str(),
        "shareQuota": 100
    });
    if protocol == FileShareProtocol::Nfs {
        properties["rootSquash"] = json!("NoRootSquash");
    }
    json!({
        "type": FILE_SHARE_TYPE,
        "apiVersion": STORAGE_API,
        "name": share_resource_name(protocol, share),
        "dependsOn": [account_id(protocol)],
        "properties": properties
    })
}

fn private_endpoint(protocol: FileShareProtocol) -> Value {
    let name = endpoint_name(protocol);
    json!({
        "type": PRIVATE_ENDPOINT_TYPE,
        "apiVersion": NETWORK_API,
        "name": name,
        "location": "[parameters('location')]",
        "dependsOn": [account_id(protocol), subnet_id()],
        "properties": {
            "subnet": { "id": subnet_id() },
            "privateLinkServiceConnections": [{
                "name": format!("{}-connection", name),
                "properties": {
                    "privateLinkServiceId": account_id(protocol),
                    "groupIds": ["file"]
                }
            }]
        }
    })
}

fn dns_zone_group(protocol: FileShareProtocol) -> Value {
    let endpoint = endpoint_name(protocol);
    json!({
        "type": DNS_ZONE_GROUP_TYPE,
        "apiVersion": NETWORK_API,
        "name": format!("{}/default", endpoint),
        "dependsOn": [
            resource_id(PRIVATE_ENDPOINT_TYPE, &endpoint),
            resource_id(PRIVATE_DNS_ZONE_TYPE, FILE_DNS_ZONE)
        ],
        "properties": {
            "privateDnsZoneConfigs": [{
                "name": "file",
                "properties": {
                    "privateDnsZoneId": resource_id(PRIVATE_DNS_ZONE_TYPE, FILE_DNS_ZONE)
                }
            }]
        }
    })
}
