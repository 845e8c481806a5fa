//! Hashing - SHA-256 fingerprints for offers
//!
//! Same configuration, same hash. Key order never matters.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

use crate::selection::{FinishState, Selection};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v = serde_json::to_value(value)?;
    to_string(&sort_value(v))
}

fn sort_value(v: Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_value(v))).collect())
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(sort_value).collect()),
        other => other,
    }
}

/// Hash over the whole manifest
pub fn compute_manifest_hash<T: Serialize>(manifest: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(manifest)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// offer_hash = sha256(house_id + finish + canonical selection + engine_version)
pub fn compute_offer_hash(
    house_id: &str,
    finish: FinishState,
    selection: &Selection,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let combined = format!(
        "{}:{}:{}:{}",
        house_id,
        canonical_json(&finish)?,
        canonical_json(selection)?,
        engine_version
    );
    Ok(sha256_hex(combined.as_bytes()))
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::selection::ItemValue;
    use serde_json::json;

    #[test]
    fn test_canonical_json_nested_sorted() {
        let obj = json!({"z": {"b": 1, "a": [{"y": 2, "x": 1}]}, "a": 2});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"z":{"a":[{"x":1,"y":2}],"b":1}}"#);
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_offer_hash_tracks_selection() {
        let catalog = Catalog::builtin();
        let items = catalog.items_for("nest_house");
        let mut selection = Selection::defaults(items);

        let h1 = compute_offer_hash("nest_house", FinishState::Unfinished, &selection, "1.0.0").unwrap();
        let h2 = compute_offer_hash("nest_house", FinishState::Unfinished, &selection, "1.0.0").unwrap();
        assert_eq!(h1, h2);

        selection.set(items, "AC", ItemValue::Toggle(true)).unwrap();
        let h3 = compute_offer_hash("nest_house", FinishState::Unfinished, &selection, "1.0.0").unwrap();
        assert_ne!(h1, h3);

        let h4 = compute_offer_hash("nest_house", FinishState::Developer, &selection, "1.0.0").unwrap();
        assert_ne!(h3, h4);
    }
}
