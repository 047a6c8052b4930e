//! Host document store boundary.
//!
//! The core never owns document identity: it enumerates, reads, and writes
//! documents through [`VaultStore`]. [`DirectoryVault`] is the filesystem
//! implementation, playing the role the host application's vault and
//! metadata cache play for a plugin.

use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::types::{DocumentRef, StoreError};

pub trait VaultStore {
    /// All markdown documents, in a stable enumeration order.
    fn list_documents(&self) -> Vec<DocumentRef>;

    /// Already-parsed top-level frontmatter mapping for `doc`, or `None` when
    /// the document has no parseable frontmatter.
    fn parsed_metadata(&self, doc: &DocumentRef) -> Option<Map<String, Value>>;

    fn read_text(&self, doc: &DocumentRef) -> Result<String, StoreError>;

    fn write_text(&self, doc: &DocumentRef, content: &str) -> Result<(), StoreError>;

    /// Raw content of the property type declaration store.
    fn read_declarations(&self) -> Result<String, StoreError>;
}

/// Filesystem-backed vault rooted at a directory. Documents are the `*.md`
/// files under the root (hidden directories excluded); the declaration store
/// is `<config_dir>/types.json`.
pub struct DirectoryVault {
    root: PathBuf,
    config_dir: String,
}

impl DirectoryVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_dir: ".obsidian".to_string(),
        }
    }

    /// Override the config directory holding `types.json`.
    pub fn with_config_dir(mut self, dir: impl Into<String>) -> Self {
        self.config_dir = dir.into();
        self
    }

    fn resolve(&self, doc: &DocumentRef) -> PathBuf {
        self.root.join(&doc.path)
    }
}

impl VaultStore for DirectoryVault {
    fn list_documents(&self) -> Vec<DocumentRef> {
        let mut documents = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("vault walk error: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(OsStr::to_str) != Some("md") {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            documents.push(DocumentRef::new(
                relative.to_string_lossy().replace('\\', "/"),
            ));
        }
        documents
    }

    fn parsed_metadata(&self, doc: &DocumentRef) -> Option<Map<String, Value>> {
        let content = fs::read_to_string(self.resolve(doc)).ok()?;
        parse_document_metadata(&content)
    }

    fn read_text(&self, doc: &DocumentRef) -> Result<String, StoreError> {
        Ok(fs::read_to_string(self.resolve(doc))?)
    }

    fn write_text(&self, doc: &DocumentRef, content: &str) -> Result<(), StoreError> {
        Ok(fs::write(self.resolve(doc), content)?)
    }

    fn read_declarations(&self) -> Result<String, StoreError> {
        let path = self.root.join(&self.config_dir).join("types.json");
        Ok(fs::read_to_string(path)?)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Parse the frontmatter block at the top of a document into a JSON object.
///
/// The block must open on the first non-blank line and close with a matching
/// `---`; anything else — including YAML that does not parse, or parses to a
/// non-mapping — yields `None` and the document is skipped by the scan.
pub(crate) fn parse_document_metadata(content: &str) -> Option<Map<String, Value>> {
    let lines: Vec<&str> = content.split('\n').collect();
    let first = lines.iter().position(|line| !line.trim().is_empty())?;
    if lines[first].trim_end() != "---" {
        return None;
    }
    let close = (first + 1..lines.len()).find(|&idx| lines[idx].trim_end() == "---")?;
    let body = lines[first + 1..close].join("\n");
    if body.trim().is_empty() {
        return Some(Map::new());
    }
    let yaml: serde_yaml::Value = serde_yaml::from_str(&body).ok()?;
    match serde_json::to_value(yaml).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
