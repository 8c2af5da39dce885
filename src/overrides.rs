//! Descriptor override merging.
//!
//! A build-specific override tree is merged onto the base descriptor tree in
//! place; the base becomes the tree of record and the override is discarded.
//! The one non-obvious rule: an override that assigns an artifact's `path`
//! invalidates every checksum on the merged entry, because the old digests
//! describe content the entry no longer references. The rule fires on the
//! presence of the `path` assignment, not on a value comparison.

use serde_json::Value;

/// Checksum fields dropped when an override reassigns an artifact's path.
const CHECKSUM_KEYS: [&str; 3] = ["md5", "sha1", "sha256"];

/// Merge `overrides` onto `base` in place.
///
/// Scalar fields in the override replace the base field; fields absent from
/// the override are left untouched. Nested objects merge recursively. The
/// `artifacts` list is merged per entry by `name` (see [`merge_artifacts`]).
pub fn merge(base: &mut Value, overrides: &Value) {
    if !base.is_object() || !overrides.is_object() {
        // non-object overrides replace wholesale
        *base = overrides.clone();
        return;
    }
    let Some(over_map) = overrides.as_object() else {
        return;
    };
    let Some(base_map) = base.as_object_mut() else {
        return;
    };

    for (key, over_val) in over_map {
        match base_map.get_mut(key) {
            Some(base_val) => {
                if key == "artifacts" && base_val.is_array() && over_val.is_array() {
                    merge_artifacts(base_val, over_val);
                } else if base_val.is_object() && over_val.is_object() {
                    merge(base_val, over_val);
                } else {
                    *base_val = over_val.clone();
                }
            }
            None => {
                base_map.insert(key.clone(), over_val.clone());
            }
        }
    }
}

/// Merge an override artifacts list into the base list, matching entries by
/// `name`. Matched entries get every override field overwritten; if the
/// override set `path`, the merged entry loses its checksum fields.
/// Unmatched override entries are appended as new artifacts.
fn merge_artifacts(base: &mut Value, overrides: &Value) {
    let (Some(base_list), Some(over_list)) = (base.as_array_mut(), overrides.as_array()) else {
        return;
    };

    for entry in over_list {
        let name = entry.get("name").and_then(Value::as_str);
        let position = name.and_then(|n| {
            base_list
                .iter()
                .position(|candidate| candidate.get("name").and_then(Value::as_str) == Some(n))
        });
        match position {
            Some(position) => {
                let reassigns_path = entry.get("path").is_some();
                if let (Some(target), Some(fields)) =
                    (base_list[position].as_object_mut(), entry.as_object())
                {
                    for (key, value) in fields {
                        target.insert(key.clone(), value.clone());
                    }
                    if reassigns_path {
                        for key in CHECKSUM_KEYS {
                            target.remove(key);
                        }
                    }
                }
            }
            None => base_list.push(entry.clone()),
        }
    }
}
