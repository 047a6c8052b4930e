//! Deletion orchestration over one vault session.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::frontmatter::remove_property_value;
use crate::scan::scan_properties;
use crate::types::{DeletionReport, DocumentRef, ManagerSettings, PropertyValueIndex, StoreError};
use crate::vault::VaultStore;

/// Drives the scan / delete lifecycle for one session.
///
/// Owns the in-memory index exclusively; it is rebuilt wholesale after every
/// mutation, never patched incrementally. Front ends own all presentation
/// state and drive this type through [`scan`](Self::scan) and
/// [`delete_value`](Self::delete_value) only. Values that drop to zero
/// documents stay indexed as orphans until removed through the orphan
/// deletion path.
pub struct PropertyValueManager<S: VaultStore> {
    store: S,
    settings: ManagerSettings,
    index: BTreeMap<String, PropertyValueIndex>,
}

impl<S: VaultStore> PropertyValueManager<S> {
    pub fn new(store: S, settings: ManagerSettings) -> Self {
        Self {
            store,
            settings,
            index: BTreeMap::new(),
        }
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &BTreeMap<String, PropertyValueIndex> {
        &self.index
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValueIndex> {
        self.index.get(name)
    }

    /// Rebuild the index from the current vault and declaration store.
    pub fn scan(&mut self) -> &BTreeMap<String, PropertyValueIndex> {
        self.rebuild_index();
        &self.index
    }

    /// Delete `value` of `property` everywhere it appears.
    ///
    /// An orphaned value is dropped from the index with no document I/O. For
    /// a value with documents, each document is patched and written back
    /// independently; a failed write is recorded and the batch continues.
    /// Afterwards the whole index is re-derived from the vault.
    pub fn delete_value(&mut self, property: &str, value: &str) -> DeletionReport {
        let files = match self.index.get(property) {
            Some(entry) if entry.values.contains(value) => {
                entry.files.get(value).cloned().unwrap_or_default()
            }
            _ => return DeletionReport::default(),
        };

        if files.is_empty() {
            debug!(property, value, "removing orphaned value from the index");
            if let Some(entry) = self.index.get_mut(property) {
                entry.remove_value(value);
            }
            return DeletionReport {
                orphan_removed: true,
                ..DeletionReport::default()
            };
        }

        debug!(
            property,
            value,
            targeted = files.len(),
            "removing value from documents"
        );
        let mut report = DeletionReport {
            targeted: files.len(),
            ..DeletionReport::default()
        };
        for doc in &files {
            match self.patch_document(doc, property, value) {
                Ok(()) => {
                    report.updated += 1;
                    if self.settings.show_modified_files_list {
                        report.modified_files.push(doc.clone());
                    }
                }
                Err(err) => {
                    warn!(path = %doc.path, error = %err, "error updating document");
                    report.failed_files.push(doc.clone());
                }
            }
        }

        self.rebuild_index();
        report
    }

    fn patch_document(
        &self,
        doc: &DocumentRef,
        property: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let content = self.store.read_text(doc)?;
        let updated = remove_property_value(&content, property, value);
        self.store.write_text(doc, &updated)
    }

    /// Fresh scan, then carry forward previously known values that no longer
    /// match any document so they surface as orphans.
    fn rebuild_index(&mut self) {
        let previous = std::mem::take(&mut self.index);
        self.index = scan_properties(&self.store);
        for (name, old) in previous {
            for value in old.values {
                let entry = self
                    .index
                    .entry(name.clone())
                    .or_insert_with(|| PropertyValueIndex::new(name.clone()));
                if !entry.values.contains(&value) {
                    entry.insert_orphan(&value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::testing::MemoryVault;

    const DECLARATIONS: &str = r#"{"types": {"tags": "multitext", "status": "multitext"}}"#;

    fn manager(vault: MemoryVault) -> PropertyValueManager<MemoryVault> {
        PropertyValueManager::new(vault, ManagerSettings::default())
    }

    #[test]
    fn deletes_a_value_across_documents_and_rescans() {
        let vault = MemoryVault::new()
            .with_declarations(DECLARATIONS)
            .with_document("a.md", "---\ntags: [rust, cli]\n---\nAlpha")
            .with_document("b.md", "---\ntags:\n  - rust\n  - tui\n---\nBeta");
        let mut manager = manager(vault);
        manager.scan();

        let report = manager.delete_value("tags", "rust");

        assert_eq!(report.targeted, 2);
        assert_eq!(report.updated, 2);
        assert!(report.failed_files.is_empty());
        let modified: Vec<&str> = report
            .modified_files
            .iter()
            .map(|doc| doc.path.as_str())
            .collect();
        assert_eq!(modified, vec!["a.md", "b.md"]);

        assert_eq!(
            manager.store().content("a.md").unwrap(),
            "---\ntags: [cli]\n---\nAlpha"
        );
        assert_eq!(
            manager.store().content("b.md").unwrap(),
            "---\ntags:\n  - tui\n---\nBeta"
        );

        let tags = manager.property("tags").unwrap();
        assert_eq!(tags.file_count("cli"), 1);
        assert_eq!(tags.file_count("tui"), 1);
    }

    #[test]
    fn deleted_value_stays_as_an_orphan_until_removed() {
        let vault = MemoryVault::new()
            .with_declarations(DECLARATIONS)
            .with_document("a.md", "---\ntags: [rust]\n---\n");
        let mut manager = manager(vault);
        manager.scan();

        manager.delete_value("tags", "rust");

        let tags = manager.property("tags").unwrap();
        assert!(tags.is_orphaned("rust"));

        let writes_before = manager.store().write_count();
        let report = manager.delete_value("tags", "rust");
        assert!(report.orphan_removed);
        assert_eq!(report.targeted, 0);
        assert_eq!(manager.store().write_count(), writes_before);
        assert!(!manager.property("tags").unwrap().values.contains("rust"));
    }

    #[test]
    fn one_failed_write_does_not_stop_the_batch() {
        let vault = MemoryVault::new()
            .with_declarations(DECLARATIONS)
            .with_document("a.md", "---\nstatus: done\n---\n")
            .with_document("b.md", "---\nstatus: done\n---\n")
            .with_document("c.md", "---\nstatus: done\n---\n")
            .failing_write("b.md");
        let mut manager = manager(vault);
        manager.scan();

        let report = manager.delete_value("status", "done");

        assert_eq!(report.targeted, 3);
        assert_eq!(report.updated, 2);
        assert_eq!(report.failed_files, vec![DocumentRef::new("b.md")]);
        let modified: Vec<&str> = report
            .modified_files
            .iter()
            .map(|doc| doc.path.as_str())
            .collect();
        assert_eq!(modified, vec!["a.md", "c.md"]);

        assert_eq!(manager.store().content("a.md").unwrap(), "---\n---\n");
        assert_eq!(manager.store().content("c.md").unwrap(), "---\n---\n");
        assert_eq!(
            manager.store().content("b.md").unwrap(),
            "---\nstatus: done\n---\n"
        );
    }

    #[test]
    fn modified_files_list_respects_the_setting() {
        let vault = MemoryVault::new()
            .with_declarations(DECLARATIONS)
            .with_document("a.md", "---\ntags: [rust]\n---\n");
        let settings = ManagerSettings {
            show_modified_files_list: false,
            ..ManagerSettings::default()
        };
        let mut manager = PropertyValueManager::new(vault, settings);
        manager.scan();

        let report = manager.delete_value("tags", "rust");
        assert_eq!(report.updated, 1);
        assert!(report.modified_files.is_empty());
    }

    #[test]
    fn unknown_property_or_value_is_a_no_op() {
        let vault = MemoryVault::new()
            .with_declarations(DECLARATIONS)
            .with_document("a.md", "---\ntags: [rust]\n---\n");
        let mut manager = manager(vault);
        manager.scan();

        assert_eq!(manager.delete_value("nope", "rust"), DeletionReport::default());
        assert_eq!(manager.delete_value("tags", "nope"), DeletionReport::default());
        assert_eq!(manager.store().write_count(), 0);
    }

    #[test]
    fn scan_reflects_documents_added_between_calls() {
        let vault = MemoryVault::new()
            .with_declarations(DECLARATIONS)
            .with_document("a.md", "---\ntags: [rust]\n---\n");
        let mut manager = manager(vault);
        manager.scan();
        assert_eq!(manager.property("tags").unwrap().file_count("rust"), 1);

        let doc = DocumentRef::new("b.md");
        manager
            .store()
            .write_text(&doc, "---\ntags: [rust]\n---\n")
            .unwrap();
        manager.scan();
        assert_eq!(manager.property("tags").unwrap().file_count("rust"), 2);
    }
}
