//! Deterministic private addresses and the hosts-file sync fragment built from them.

use std::net::Ipv4Addr;

use minijinja::{Environment, context};
use serde::Serialize;

use super::constants::{FIRST_HOST, LAST_HOST, SUBNET_BASE};
use crate::domain::AppError;
use crate::domain::model::Machine;

const HOSTS_SYNC_TEMPLATE: &str = include_str!("../../assets/templates/hosts_sync.sh.j2");
const HOSTS_SYNC_NAME: &str = "hosts_sync.sh";

pub const FRAGMENT_BEGIN: &str = "# >>> vmtemplate hosts sync >>>";
pub const FRAGMENT_END: &str = "# <<< vmtemplate hosts sync <<<";
const HOSTS_BEGIN: &str = "# BEGIN vmtemplate hosts";
const HOSTS_END: &str = "# END vmtemplate hosts";

/// Primary NIC address of one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub name: String,
    pub address: Ipv4Addr,
}

/// Assign sequential addresses in machine-list order.
pub fn assign_addresses(machines: &[Machine]) -> Result<Vec<HostEntry>, AppError> {
    let capacity = usize::from(LAST_HOST - FIRST_HOST) + 1;
    if machines.len() > capacity {
        return Err(AppError::config_error(format!(
            "{} machines exceed the {} addresses available in the subnet",
            machines.len(),
            capacity
        )));
    }

    Ok(machines
        .iter()
        .zip(FIRST_HOST..=LAST_HOST)
        .map(|(machine, host)| HostEntry {
            name: machine.name.clone(),
            address: Ipv4Addr::new(SUBNET_BASE[0], SUBNET_BASE[1], SUBNET_BASE[2], host),
        })
        .collect())
}

/// Render the shell fragment that rewrites the managed block of `/etc/hosts`.
///
/// Reapplying it replaces the block instead of appending another copy.
pub fn hosts_fragment(hosts: &[HostEntry]) -> Result<String, AppError> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template(HOSTS_SYNC_NAME, HOSTS_SYNC_TEMPLATE)
        .map_err(|e| AppError::Render(format!("failed to register '{}': {}", HOSTS_SYNC_NAME, e)))?;

    let template = env
        .get_template(HOSTS_SYNC_NAME)
        .map_err(|e| AppError::Render(format!("failed to load '{}': {}", HOSTS_SYNC_NAME, e)))?;
    template
        .render(context! {
            hosts => hosts,
            fragment_begin => FRAGMENT_BEGIN,
            fragment_end => FRAGMENT_END,
            hosts_begin => HOSTS_BEGIN,
            hosts_end => HOSTS_END,
        })
        .map_err(|e| AppError::Render(format!("failed to render '{}': {}", HOSTS_SYNC_NAME, e)))
}

/// Remove a previously inserted fragment so it is never duplicated.
pub fn strip_fragment(payload: &str) -> String {
    let mut out = Vec::new();
    let mut inside = false;
    for line in payload.lines() {
        if line.trim_end() == FRAGMENT_BEGIN {
            inside = true;
            continue;
        }
        if inside {
            if line.trim_end() == FRAGMENT_END {
                inside = false;
            }
            continue;
        }
        out.push(line);
    }
    let mut stripped = out.join("\n");
    if payload.ends_with('\n') && !stripped.is_empty() {
        stripped.push('\n');
    }
    stripped
}

/// Insert the fragment at the top of a payload, after its interpreter line if it has one.
pub fn insert_fragment(payload: &str, fragment: &str) -> String {
    let payload = strip_fragment(payload);
    let first_content = payload.lines().find(|line| !line.trim().is_empty());
    match first_content {
        Some(line) if line.trim_start().starts_with("#!") => {
            let (before, after) = payload.split_once(line).unwrap_or((payload.as_str(), ""));
            let after = after.strip_prefix('\n').unwrap_or(after);
            format!("{}{}\n{}{}", before, line, fragment, after)
        }
        _ => format!("{}{}", fragment, payload),
    }
}
