/// Longest machine name Azure accepts for a Linux VM resource.
pub const MAX_MACHINE_NAME_LEN: usize = 64;

/// Longest public IP resource name; bounds the NIC name through `<machine>-<nic>-pip`.
pub const MAX_PUBLIC_IP_NAME_LEN: usize = 80;

/// Longest managed disk resource name; shared disk ids become disk names.
pub const MAX_SHARED_DISK_ID_LEN: usize = 80;

const MIN_SHARE_NAME_LEN: usize = 3;
const MAX_SHARE_NAME_LEN: usize = 63;

/// Name of the public IP resource emitted for a NIC.
pub fn public_ip_name(machine: &str, nic: &str) -> String {
    format!("{}-{}-pip", machine, nic)
}

/// Checks a machine name against the resource naming rule.
///
/// Checks:
/// - Non-empty and at most 64 characters
/// - ASCII letters, digits and '-' only
/// - Starts and ends with a letter or digit
pub fn machine_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name is required");
    }
    if name.len() > MAX_MACHINE_NAME_LEN {
        return Some("name must be at most 64 characters");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Some("name may contain only letters, digits and hyphens");
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Some("name must start and end with a letter or digit");
    }
    if name.len() < 2 {
        return Some("name must be at least 2 characters");
    }
    None
}

/// Checks an Azure Files share name.
///
/// Checks:
/// - 3 to 63 characters
/// - Lowercase letters, digits and '-' only
/// - No leading, trailing or consecutive hyphens
pub fn share_name_problem(name: &str) -> Option<&'static str> {
    if name.len() < MIN_SHARE_NAME_LEN || name.len() > MAX_SHARE_NAME_LEN {
        return Some("share name must be 3-63 characters");
    }
    if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Some("share name may contain only lowercase letters, digits and hyphens");
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Some("share name must start and end with a letter or digit");
    }
    if name.contains("--") {
        return Some("share name must not contain consecutive hyphens");
    }
    None
}

/// Checks a shared disk id, which is emitted as a disk resource name and inside
/// `resourceId(...)` expressions.
///
/// Checks:
/// - Non-empty and at most 80 characters
/// - ASCII letters, digits, '-', '_' and '.' only
/// - Starts with a letter or digit, ends with a letter, digit or '_'
pub fn shared_disk_id_problem(id: &str) -> Option<&'static str> {
    if id.is_empty() {
        return Some("shared disk has no id");
    }
    if id.len() > MAX_SHARED_DISK_ID_LEN {
        return Some("shared disk id must be at most 80 characters");
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) {
        return Some("shared disk id may contain only letters, digits, '-', '_' and '.'");
    }
    if !id.starts_with(|c: char| c.is_ascii_alphanumeric())
        || !id.ends_with(|c: char| c.is_ascii_alphanumeric() || c == '_')
    {
        return Some("shared disk id must start alphanumeric and end alphanumeric or '_'");
    }
    None
}
