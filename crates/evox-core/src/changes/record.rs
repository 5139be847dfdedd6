use evox_core_types::ElementId;
use serde::{Deserialize, Serialize};

use super::kind::{ChangeKind, EditType};
use crate::model::Multiplicity;

/// Old and new cardinality carried by multiplicity changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplicityChange {
    pub old: Multiplicity,
    pub new: Multiplicity,
}

/// One detected difference between the old and the new version
///
/// Records are immutable once the registry has stamped them;
/// `may_require_revalidation` is filled in from the kind's descriptor, not by
/// the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub target: ElementId,
    /// Second node of a two-node change (old owner, old structural parent)
    pub secondary_target: Option<ElementId>,
    pub edit_type: EditType,
    pub invalidates_content: bool,
    pub invalidates_attributes: bool,
    pub may_require_revalidation: bool,
    /// Cosmetic edit that never forces regeneration of its own target
    pub ignorable: bool,
    pub multiplicity: Option<MultiplicityChange>,
}

impl ChangeRecord {
    pub fn new(kind: ChangeKind, edit_type: EditType, target: ElementId) -> Self {
        Self {
            kind,
            target,
            secondary_target: None,
            edit_type,
            invalidates_content: false,
            invalidates_attributes: false,
            may_require_revalidation: true,
            ignorable: false,
            multiplicity: None,
        }
    }

    pub fn with_secondary(mut self, secondary: Option<ElementId>) -> Self {
        self.secondary_target = secondary;
        self
    }

    pub fn invalidating_content(mut self, invalidates: bool) -> Self {
        self.invalidates_content = invalidates;
        self
    }

    pub fn invalidating_attributes(mut self, invalidates: bool) -> Self {
        self.invalidates_attributes = invalidates;
        self
    }

    pub fn ignorable(mut self, ignorable: bool) -> Self {
        self.ignorable = ignorable;
        self
    }

    pub fn with_multiplicity(mut self, old: Multiplicity, new: Multiplicity) -> Self {
        self.multiplicity = Some(MultiplicityChange { old, new });
        self
    }

    /// Does this record concern `id`, as primary or secondary target
    pub fn touches(&self, id: &ElementId) -> bool {
        &self.target == id || self.secondary_target.as_ref() == Some(id)
    }

    /// Change concerning one node only
    pub fn is_self_targeted(&self) -> bool {
        self.secondary_target.is_none()
    }

    /// Ignorable single-node edits never force a regeneration
    pub fn forces_regeneration(&self) -> bool {
        !(self.ignorable && self.is_self_targeted())
    }
}
