//! Security group, virtual network and subnet shared by every machine.

use serde_json::{Value, json};

use super::constants::*;
use crate::domain::model::{NsgProtocol, NsgRule, parse_port_range};

fn security_rule(name: &str, priority: u32, protocol: &str, port: &str, source: &str) -> Value {
    json!({
        "name": name,
        "properties": {
            "priority": priority,
            "direction": "Inbound",
            "access": "Allow",
            "protocol": protocol,
            "sourcePortRange": "*",
            "destinationPortRange": port,
            "sourceAddressPrefix": source,
            "destinationAddressPrefix": "*"
        }
    })
}

/// Port or range as emitted, with surrounding and inner whitespace removed.
pub fn port_range(rule: &NsgRule) -> String {
    match parse_port_range(&rule.port) {
        Some((low, high)) if low == high => low.to_string(),
        Some((low, high)) => format!("{}-{}", low, high),
        None => rule.port.trim().to_string(),
    }
}

/// Name of the `index`-th custom rule.
pub fn custom_rule_name(index: usize, rule: &NsgRule) -> String {
    let protocol = match rule.protocol {
        NsgProtocol::Tcp => "tcp",
        NsgProtocol::Udp => "udp",
    };
    format!("Custom-{}-{}-{}", index + 1, protocol, port_range(rule).replace('-', "to"))
}

pub fn custom_rule_priority(index: usize) -> u32 {
    CUSTOM_RULE_BASE_PRIORITY + CUSTOM_RULE_PRIORITY_STEP * index as u32
}

pub fn security_group(rules: &[NsgRule]) -> Value {
    let ssh = security_rule(SSH_RULE_NAME, SSH_RULE_PRIORITY, "Tcp", "22", "*");
    let mut security_rules = vec![ssh];
    for (i, rule) in rules.iter().enumerate() {
        security_rules.push(security_rule(
            &custom_rule_name(i, rule),
            custom_rule_priority(i),
            &rule.protocol.to_string(),
            &port_range(rule),
            &rule.source.to_string(),
        ));
    }

    json!({
        "type": NSG_TYPE,
        "apiVersion": NETWORK_API,
        "name": NSG_NAME,
        "location": "[parameters('location')]",
        "properties": { "securityRules": security_rules }
    })
}

pub fn virtual_network() -> Value {
    json!({
        "type": VNET_TYPE,
        "apiVersion": NETWORK_API,
        "name": VNET_NAME,
        "location": "[parameters('location')]",
        "properties": {
            "addressSpace": { "addressPrefixes": [VNET_PREFIX] }
        }
    })
}

pub fn subnet() -> Value {
    json!({
        "type": SUBNET_TYPE,
        "apiVersion": NETWORK_API,
        "name": format!("{}/{}", VNET_NAME, SUBNET_NAME),
        "dependsOn": [
            resource_id(VNET_TYPE, VNET_NAME),
            resource_id(NSG_TYPE, NSG_NAME)
        ],
        "properties": {
            "addressPrefix": SUBNET_PREFIX,
            "networkSecurityGroup": { "id": resource_id(NSG_TYPE, NSG_NAME) },
            "privateEndpointNetworkPolicies": "Disabled"
        }
    })
}
