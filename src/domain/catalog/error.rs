/// Catalog integrity failure. Carries every issue found, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Catalog validation failed with {} issue(s):\n  - {}",
    .issues.len(),
    .issues.join("\n  - ")
)]
pub struct CatalogError {
    pub issues: Vec<String>,
}
