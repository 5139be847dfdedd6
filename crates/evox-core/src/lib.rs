//! Evox Core - Evolution-impact analysis for PSM schema diagrams
//!
//! Given two versions of a PSM diagram, this crate tells a schema generator
//! which generated fragments are still valid:
//! - Versioned element store and tree navigation
//! - Catalogue of change kinds with pure detectors
//! - Scope-driven change detection over the new version
//! - Change set categorization (prune, group, color, representative fix-up)
//! - Invalidation queries over the flattened content model
//! - Serializable impact report with a deterministic digest

pub mod change_set;
pub mod changes;
pub mod content;
pub mod detection;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod registry;
pub mod store;

// Re-export commonly used types
pub use change_set::{AliasRelation, ChangeSet, ImpactReport, NodeColor};
pub use changes::{ChangeKind, ChangeRecord, ChangeScope, EditType, MultiplicityChange, NodeState};
pub use content::ContentItem;
pub use detection::detect_changes;
pub use errors::{ErrorKind, EvolutionError, Result};
pub use model::{Element, ElementKind, Multiplicity};
pub use registry::{ChangeKindDescriptor, ChangeRegistry};
pub use store::{ModelStore, ModelView, VersionedStore};

use evox_core_types::VersionId;

/// Detect and categorize the changes between two versions
///
/// # Errors
///
/// Propagates every error of [`detect_changes`] and [`ChangeSet::categorize`].
pub fn analyze<'a>(
    store: &'a dyn VersionedStore,
    registry: &'a ChangeRegistry,
    old: VersionId,
    new: VersionId,
) -> Result<ChangeSet<'a>> {
    let mut change_set = ChangeSet::detect(store, registry, old, new)?;
    change_set.categorize()?;
    Ok(change_set)
}
