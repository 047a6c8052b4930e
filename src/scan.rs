//! Vault-wide aggregation of multitext property values.
//!
//! Works entirely off the host's already-parsed metadata; documents are never
//! re-parsed here. Only properties declared `multitext` in the declaration
//! store are indexed.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, error};

use crate::types::PropertyValueIndex;
use crate::vault::VaultStore;

/// Declared type tag marking a property as multi-value text.
pub const MULTITEXT_TYPE_TAG: &str = "multitext";

/// Names of properties declared `multitext`.
///
/// Any failure to read or parse the declaration store degrades to an empty
/// set: the scan then finds nothing, which is observable but never fatal.
pub fn multitext_properties<S: VaultStore>(store: &S) -> BTreeSet<String> {
    let raw = match store.read_declarations() {
        Ok(raw) => raw,
        Err(err) => {
            error!("error reading property type declarations: {err}");
            return BTreeSet::new();
        }
    };
    let parsed: Value = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            error!("error parsing property type declarations: {err}");
            return BTreeSet::new();
        }
    };
    let mut names = BTreeSet::new();
    if let Some(types) = parsed.get("types").and_then(Value::as_object) {
        for (name, tag) in types {
            if tag.as_str() == Some(MULTITEXT_TYPE_TAG) {
                names.insert(name.clone());
            }
        }
    }
    debug!(count = names.len(), "loaded multitext property declarations");
    names
}

/// Build the per-property value index over every document in the store.
///
/// Scalars are wrapped as singleton lists, null entries dropped, and the rest
/// coerced to strings. Document lists keep enumeration order and are not
/// de-duplicated. The `BTreeMap` key order gives properties — and each
/// index's values — lexicographically sorted.
pub fn scan_properties<S: VaultStore>(store: &S) -> BTreeMap<String, PropertyValueIndex> {
    let documents = store.list_documents();
    debug!(total = documents.len(), "scanning vault for multitext properties");

    let multitext = multitext_properties(store);
    let mut index: BTreeMap<String, PropertyValueIndex> = BTreeMap::new();
    if multitext.is_empty() {
        return index;
    }

    for doc in documents {
        let Some(metadata) = store.parsed_metadata(&doc) else {
            continue;
        };
        for (key, value) in &metadata {
            if !multitext.contains(key) || value.is_null() {
                continue;
            }
            let entry = index
                .entry(key.clone())
                .or_insert_with(|| PropertyValueIndex::new(key.as_str()));
            for item in normalize_values(value) {
                entry.insert(&item, doc.clone());
            }
        }
    }

    debug!(properties = index.len(), "vault scan complete");
    index
}

fn normalize_values(value: &Value) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .filter(|item| !item.is_null())
        .map(value_to_string)
        .collect()
}

/// String coercion for the value kinds that survive frontmatter parsing.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}
