//! Versioned element store
//!
//! The analysis only reads the model through [`VersionedStore`]; it never
//! mutates a snapshot. [`ModelStore`] is the in-memory implementation used by
//! fixtures and tests, [`ModelView`] pins a store to one version and adds
//! tree navigation on top of it.

pub mod memory;
pub mod view;

use evox_core_types::{ElementId, VersionId};

use crate::model::{Diagram, Element, VersionInfo};

pub use memory::{ModelStore, Snapshot};
pub use view::ModelView;

/// Read-only access to versioned model snapshots
pub trait VersionedStore {
    /// Descriptive data of a version, None if the store does not know it
    fn version_info(&self, version: VersionId) -> Option<&VersionInfo>;

    /// The diagram of a version
    fn diagram(&self, version: VersionId) -> Option<&Diagram>;

    /// The counterpart of `element` in `version`
    fn get_in_version(&self, element: &ElementId, version: VersionId) -> Option<&Element>;

    /// Does `element` exist in `version`
    fn exists_in_version(&self, element: &ElementId, version: VersionId) -> bool {
        self.get_in_version(element, version).is_some()
    }
}
