//! Multitext property value maintenance for markdown vault frontmatter.
//!
//! Scans a vault for properties declared as multi-value text, aggregates the
//! distinct values of each together with the documents using them, and
//! removes a chosen value everywhere it appears. Document edits are targeted
//! text surgery on the frontmatter block — a value is spliced out of its
//! line or list span while the rest of the document is preserved byte for
//! byte.
//!
//! The host application is an external collaborator behind [`VaultStore`];
//! [`DirectoryVault`] covers the plain-filesystem case. Any front end drives
//! a session through [`PropertyValueManager::scan`] and
//! [`PropertyValueManager::delete_value`] and owns its own presentation
//! state.

mod engine;
mod frontmatter;
mod scan;
mod types;
mod vault;

pub use engine::PropertyValueManager;
pub use frontmatter::remove_property_value;
pub use scan::{MULTITEXT_TYPE_TAG, multitext_properties, scan_properties};
pub use types::{DeletionReport, DocumentRef, ManagerSettings, PropertyValueIndex, StoreError};
pub use vault::{DirectoryVault, VaultStore};
