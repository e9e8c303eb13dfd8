//! Startup integrity checks for the image and size catalogs.
//!
//! Checks run over the raw JSON documents so that every problem can be reported in one pass;
//! typed deserialization would stop at the first malformed field.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};

use super::error::CatalogError;
use super::{Architecture, DiskController, DiskSku, Generation, RawCatalogs};
use crate::domain::catalog::AccelNetMode;

/// Validate both catalogs, collecting all issues.
pub fn check(raw: &RawCatalogs) -> Result<(), CatalogError> {
    let mut issues = Vec::new();
    check_images(&raw.images, &mut issues);
    check_sizes(&raw.sizes, &mut issues);

    if issues.is_empty() { Ok(()) } else { Err(CatalogError { issues }) }
}

fn check_images(images: &Value, issues: &mut Vec<String>) {
    let Some(entries) = images.as_array() else {
        issues.push("image catalog must be a JSON array".into());
        return;
    };

    let mut keys: HashMap<String, usize> = HashMap::new();
    let mut refs: HashMap<(String, String, String, String), String> = HashMap::new();

    for (index, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            issues.push(format!("image #{}: entry must be an object", index));
            continue;
        };

        let label = match non_empty_str(obj, "key") {
            Some(key) => {
                if let Some(first) = keys.insert(key.to_string(), index) {
                    issues.push(format!(
                        "image '{}': duplicate key (entries #{} and #{})",
                        key, first, index
                    ));
                }
                format!("image '{}'", key)
            }
            None => {
                issues.push(format!("image #{}: key must be a non-empty string", index));
                format!("image #{}", index)
            }
        };

        check_enum(obj, "arch", &label, &names(Architecture::ALL.map(|a| a.as_str())), issues);
        check_enum(obj, "gen", &label, &names(Generation::ALL.map(|g| g.as_str())), issues);
        for flag in ["nvmeCapable", "scsiCapable"] {
            if !obj.get(flag).is_some_and(Value::is_boolean) {
                issues.push(format!("{}: {} must be a boolean", label, flag));
            }
        }
        if !obj.get("label").is_some_and(Value::is_string) {
            issues.push(format!("{}: label must be a string", label));
        }

        let Some(image_ref) = obj.get("ref").and_then(Value::as_object) else {
            issues.push(format!("{}: ref must be an object", label));
            continue;
        };
        let mut complete = true;
        for part in ["publisher", "offer", "sku", "version"] {
            if non_empty_str(image_ref, part).is_none() {
                issues.push(format!("{}: ref.{} must be a non-empty string", label, part));
                complete = false;
            }
        }
        if complete {
            let tuple = (
                str_field(image_ref, "publisher"),
                str_field(image_ref, "offer"),
                str_field(image_ref, "sku"),
                str_field(image_ref, "version"),
            );
            if let Some(previous) = refs.get(&tuple) {
                issues.push(format!(
                    "{}: ref {}/{}/{}/{} duplicates {}",
                    label, tuple.0, tuple.1, tuple.2, tuple.3, previous
                ));
            } else {
                refs.insert(tuple, label.clone());
            }
        }
    }
}

fn check_sizes(sizes: &Value, issues: &mut Vec<String>) {
    let Some(entries) = sizes.as_array() else {
        issues.push("size catalog must be a JSON array".into());
        return;
    };

    let mut seen: HashMap<String, usize> = HashMap::new();

    for (index, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            issues.push(format!("size #{}: entry must be an object", index));
            continue;
        };

        let label = match non_empty_str(obj, "name") {
            Some(name) => {
                if let Some(first) = seen.insert(name.to_string(), index) {
                    issues.push(format!(
                        "size '{}': duplicate name (entries #{} and #{})",
                        name, first, index
                    ));
                }
                format!("size '{}'", name)
            }
            None => {
                issues.push(format!("size #{}: name must be a non-empty string", index));
                format!("size #{}", index)
            }
        };

        let Some(tags) = obj.get("tags").and_then(Value::as_object) else {
            issues.push(format!("{}: tags must be an object", label));
            continue;
        };

        check_enum_list(
            tags,
            "architectures",
            &label,
            &names(Architecture::ALL.map(|a| a.as_str())),
            issues,
        );
        let generations = check_enum_list(
            tags,
            "generations",
            &label,
            &names(Generation::ALL.map(|g| g.as_str())),
            issues,
        );
        check_controllers(tags, &generations, &label, issues);
        check_sku_support(tags, &label, issues);
        let modes = names(AccelNetMode::ALL.map(|m| m.as_str()));
        check_enum(tags, "accelNetMode", &label, &modes, issues);

        for field in ["maxNics", "maxDataDisks"] {
            let valid = tags
                .get(field)
                .and_then(Value::as_u64)
                .is_some_and(|n| n > 0 && u32::try_from(n).is_ok());
            if !valid {
                issues.push(format!("{}: {} must be a positive integer", label, field));
            }
        }

        for field in ["ephemeralOsDiskSupported", "sharedDiskSupported"] {
            if tags.get(field).is_some_and(|v| !v.is_boolean()) {
                issues.push(format!("{}: {} must be a boolean when present", label, field));
            }
        }
    }
}

fn check_controllers(
    tags: &Map<String, Value>,
    generations: &BTreeSet<String>,
    label: &str,
    issues: &mut Vec<String>,
) {
    let Some(by_gen) = tags.get("diskControllersByGen").and_then(Value::as_object) else {
        issues.push(format!("{}: diskControllersByGen must be an object", label));
        return;
    };

    for key in by_gen.keys() {
        if !generations.contains(key) {
            issues.push(format!(
                "{}: diskControllersByGen lists generation '{}' which is not in generations",
                label, key
            ));
        }
    }

    let allowed = names(DiskController::ALL.map(|c| c.as_str()));
    for generation in generations {
        let list = by_gen.get(generation).and_then(Value::as_array);
        match list {
            Some(controllers) if !controllers.is_empty() => {
                for controller in controllers {
                    let known = controller.as_str().is_some_and(|c| allowed.contains(c));
                    if !known {
                        issues.push(format!(
                            "{}: diskControllersByGen['{}'] has unknown controller {} \
                             (allowed: {})",
                            label,
                            generation,
                            controller,
                            joined(&allowed)
                        ));
                    }
                }
            }
            _ => issues.push(format!(
                "{}: diskControllersByGen must list at least one controller for generation '{}'",
                label, generation
            )),
        }
    }
}

fn check_sku_support(tags: &Map<String, Value>, label: &str, issues: &mut Vec<String>) {
    let Some(support) = tags.get("diskSkuSupport").and_then(Value::as_object) else {
        issues.push(format!("{}: diskSkuSupport must be an object", label));
        return;
    };

    for sku in DiskSku::ALL {
        if !support.get(sku.as_str()).is_some_and(Value::is_boolean) {
            issues.push(format!("{}: diskSkuSupport.{} must be a boolean", label, sku));
        }
    }
    let known = names(DiskSku::ALL.map(|s| s.as_str()));
    for key in support.keys() {
        if !known.contains(key) {
            issues.push(format!("{}: diskSkuSupport has unknown SKU '{}'", label, key));
        }
    }
}

/// Check a required string field against a closed set of values.
fn check_enum(
    obj: &Map<String, Value>,
    field: &str,
    label: &str,
    allowed: &BTreeSet<String>,
    issues: &mut Vec<String>,
) {
    match obj.get(field).and_then(Value::as_str) {
        Some(value) if allowed.contains(value) => {}
        Some(value) => issues.push(format!(
            "{}: {} '{}' is not one of {}",
            label,
            field,
            value,
            joined(allowed)
        )),
        None => issues.push(format!("{}: {} must be one of {}", label, field, joined(allowed))),
    }
}

/// Check a non-empty array of closed-set strings; returns the valid members found.
fn check_enum_list(
    obj: &Map<String, Value>,
    field: &str,
    label: &str,
    allowed: &BTreeSet<String>,
    issues: &mut Vec<String>,
) -> BTreeSet<String> {
    let mut valid = BTreeSet::new();
    let Some(values) = obj.get(field).and_then(Value::as_array) else {
        issues.push(format!("{}: {} must be a non-empty array", label, field));
        return valid;
    };
    if values.is_empty() {
        issues.push(format!("{}: {} must be a non-empty array", label, field));
    }
    for value in values {
        match value.as_str() {
            Some(s) if allowed.contains(s) => {
                valid.insert(s.to_string());
            }
            _ => issues.push(format!(
                "{}: {} has unknown value {} (allowed: {})",
                label,
                field,
                value,
                joined(allowed)
            )),
        }
    }
    valid
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    obj.get(field).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn str_field(obj: &Map<String, Value>, field: &str) -> String {
    obj.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn names<const N: usize>(values: [&str; N]) -> BTreeSet<String> {
    values.into_iter().map(str::to_string).collect()
}

fn joined(values: &BTreeSet<String>) -> String {
    values.iter().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn image(key: &str, sku: &str) -> Value {
        json!({
            "key": key, "arch": "x64", "gen": "Gen2", "nvmeCapable": true, "scsiCapable": true,
            "label": key,
            "ref": {"publisher": "Canonical", "offer": "ubuntu", "sku": sku, "version": "latest"}
        })
    }

    fn size(name: &str) -> Value {
        json!({
            "name": name,
            "tags": {
                "architectures": ["x64"],
                "generations": ["Gen1", "Gen2"],
                "diskControllersByGen": {"Gen1": ["SCSI"], "Gen2": ["SCSI", "NVMe"]},
                "diskSkuSupport": {
                    "Standard_LRS": true, "StandardSSD_LRS": true, "Premium_LRS": true,
                    "PremiumV2_LRS": false, "UltraSSD_LRS": false
                },
                "accelNetMode": "optional",
                "maxNics": 2,
                "maxDataDisks": 4
            }
        })
    }

    fn issues_for(images: Value, sizes: Value) -> Vec<String> {
        match check(&RawCatalogs { images, sizes }) {
            Ok(()) => Vec::new(),
            Err(err) => err.issues,
        }
    }

    #[test]
    fn accepts_well_formed_catalogs() {
        let issues = issues_for(json!([image("a", "1"), image("b", "2")]), json!([size("S1")]));
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn rejects_duplicate_keys_and_refs() {
        let issues = issues_for(json!([image("a", "1"), image("a", "1")]), json!([]));
        assert!(issues.iter().any(|i| i.contains("duplicate key")));
        assert!(issues.iter().any(|i| i.contains("duplicates image 'a'")));
    }

    #[test]
    fn rejects_incomplete_ref() {
        let mut entry = image("a", "1");
        entry["ref"]["version"] = json!("");
        let issues = issues_for(json!([entry]), json!([]));
        assert_eq!(issues, vec!["image 'a': ref.version must be a non-empty string".to_string()]);
    }

    #[test]
    fn names_size_and_generation_when_controllers_missing() {
        let mut entry = size("Standard_X");
        entry["tags"]["diskControllersByGen"] = json!({"Gen1": ["SCSI"], "Gen2": []});
        let issues = issues_for(json!([]), json!([entry]));
        assert_eq!(
            issues,
            vec![concat!(
                "size 'Standard_X': diskControllersByGen must list at least one controller ",
                "for generation 'Gen2'"
            )
            .to_string()]
        );
    }

    #[test]
    fn rejects_controller_for_undeclared_generation_and_unknown_controller() {
        let mut entry = size("S");
        entry["tags"]["generations"] = json!(["Gen2"]);
        entry["tags"]["diskControllersByGen"] = json!({"Gen1": ["SCSI"], "Gen2": ["IDE"]});
        let issues = issues_for(json!([]), json!([entry]));
        assert!(issues.iter().any(|i| i.contains("generation 'Gen1' which is not in generations")));
        assert!(issues.iter().any(|i| i.contains("unknown controller \"IDE\"")));
    }

    #[test]
    fn requires_every_sku_and_rejects_unknown_ones() {
        let mut entry = size("S");
        entry["tags"]["diskSkuSupport"] = json!({
            "Standard_LRS": true, "StandardSSD_LRS": true, "Premium_LRS": true,
            "PremiumV2_LRS": false, "Premium_ZRS": true
        });
        let issues = issues_for(json!([]), json!([entry]));
        let has = |expected: &str| issues.iter().any(|i| i == expected);
        assert!(has("size 'S': diskSkuSupport.UltraSSD_LRS must be a boolean"));
        assert!(has("size 'S': diskSkuSupport has unknown SKU 'Premium_ZRS'"));
    }

    #[test]
    fn collects_all_issues_across_entries() {
        let mut bad_size = size("S");
        bad_size["tags"]["maxNics"] = json!(0);
        bad_size["tags"]["accelNetMode"] = json!("sometimes");
        bad_size["tags"]["sharedDiskSupported"] = json!("yes");
        bad_size["tags"]["architectures"] = json!([]);
        let issues =
            issues_for(json!([image("a", "1"), {"key": ""}]), json!([bad_size, size("S")]));

        assert!(issues.iter().any(|i| i == "size 'S': maxNics must be a positive integer"));
        assert!(issues.iter().any(|i| i.contains("accelNetMode 'sometimes'")));
        assert!(issues.iter().any(|i| i.contains("sharedDiskSupported must be a boolean")));
        assert!(issues.iter().any(|i| i.contains("architectures must be a non-empty array")));
        assert!(issues.iter().any(|i| i.contains("image #1: key must be a non-empty string")));
        assert!(issues.iter().any(|i| i.contains("duplicate name")));
        assert!(issues.len() >= 6);
    }

    #[test]
    fn non_array_documents_are_rejected() {
        let issues = issues_for(json!({}), json!("sizes"));
        assert_eq!(
            issues,
            vec![
                "image catalog must be a JSON array".to_string(),
                "size catalog must be a JSON array".to_string()
            ]
        );
    }
}
