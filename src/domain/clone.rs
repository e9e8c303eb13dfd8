//! Naming for cloned machines.

const CLONE_MARKER: &str = "-clone";

/// Strip a trailing `-clone` or `-clone-N` suffix.
fn clone_base(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    if let Some(pos) = lower.rfind(CLONE_MARKER) {
        let rest = &lower[pos + CLONE_MARKER.len()..];
        let numbered = rest
            .strip_prefix('-')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
        if rest.is_empty() || numbered {
            return &name[..pos];
        }
    }
    name
}

/// Next free `<base>-clone-N` name, where `base` has any clone suffix removed.
///
/// Comparison against existing names ignores case, matching the uniqueness rule.
pub fn clone_name(source: &str, existing: &[&str]) -> String {
    let base = clone_base(source);
    (1u32..)
        .map(|n| format!("{}{}-{}", base, CLONE_MARKER, n))
        .find(|candidate| !existing.iter().any(|e| e.eq_ignore_ascii_case(candidate)))
        .unwrap_or_else(|| format!("{}{}", base, CLONE_MARKER))
}
