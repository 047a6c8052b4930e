use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle to one document inside the host vault. The path is relative to the
/// vault root with `/` separators; the store that issued it knows how to
/// resolve it back to real storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub path: String,
}

impl DocumentRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Distinct values seen for one multitext property, plus the documents that
/// carry each value.
///
/// Every member of `values` has an entry in `files`; an empty file list means
/// the value is orphaned (known to the index but used by no document). The
/// `BTreeSet`/`BTreeMap` backing gives callers values and lookup keys in
/// lexicographic order; document lists stay in enumeration order and are not
/// de-duplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyValueIndex {
    pub property: String,
    pub values: BTreeSet<String>,
    pub files: BTreeMap<String, Vec<DocumentRef>>,
}

impl PropertyValueIndex {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            values: BTreeSet::new(),
            files: BTreeMap::new(),
        }
    }

    /// Record one occurrence of `value` in `doc`.
    pub fn insert(&mut self, value: &str, doc: DocumentRef) {
        self.values.insert(value.to_string());
        self.files.entry(value.to_string()).or_default().push(doc);
    }

    /// Record `value` with no backing document.
    pub fn insert_orphan(&mut self, value: &str) {
        self.values.insert(value.to_string());
        self.files.entry(value.to_string()).or_default();
    }

    pub fn remove_value(&mut self, value: &str) {
        self.values.remove(value);
        self.files.remove(value);
    }

    pub fn file_count(&self, value: &str) -> usize {
        self.files.get(value).map_or(0, Vec::len)
    }

    pub fn is_orphaned(&self, value: &str) -> bool {
        self.values.contains(value) && self.file_count(value) == 0
    }
}

/// Session settings persisted by the host. Fields missing from the persisted
/// JSON fall back to their defaults, so a partial settings object merges over
/// the default set.
///
/// `confirm_before_delete` and `show_ribbon_icon` are presentation concerns:
/// the core carries them for the front end but never acts on them itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagerSettings {
    pub show_ribbon_icon: bool,
    pub enable_debug_logging: bool,
    pub show_modified_files_list: bool,
    pub confirm_before_delete: bool,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            show_ribbon_icon: true,
            enable_debug_logging: false,
            show_modified_files_list: true,
            confirm_before_delete: true,
        }
    }
}

/// Outcome of one `delete_value` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    /// Documents that were associated with the value when the batch started.
    pub targeted: usize,
    /// Documents successfully patched and written back.
    pub updated: usize,
    /// Documents whose write failed; excluded from `updated`.
    pub failed_files: Vec<DocumentRef>,
    /// Documents written back, in processing order. Empty when the
    /// `show_modified_files_list` setting is off.
    pub modified_files: Vec<DocumentRef>,
    /// True when the value was orphaned and removed from the index without
    /// touching any document.
    pub orphan_removed: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}
