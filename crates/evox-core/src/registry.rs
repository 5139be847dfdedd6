//! Change registry
//!
//! Built once from a static catalogue of [`ChangeKindDescriptor`]s and passed
//! by reference to everything that detects or prunes changes. There is no
//! hidden global: callers decide how long a registry lives.

use std::collections::{BTreeMap, BTreeSet};

use crate::changes::catalogue::CATALOGUE;
use crate::changes::{ChangeKind, ChangeRecord, ChangeScope, DetectionInput, EditType, NodeState};
use crate::detection::DetectionContext;
use crate::errors::{EvolutionError, Result};
use crate::store::ModelView;

/// Pure detection function of one change kind
pub type Detector = fn(&DetectionInput<'_>) -> Vec<ChangeRecord>;

/// Override of the state a record gives its target
pub type StateHook = fn(&ChangeRecord, ModelView<'_>, ModelView<'_>) -> Option<NodeState>;

/// Static declaration of a change kind
#[derive(Clone, Copy)]
pub struct ChangeKindDescriptor {
    pub kind: ChangeKind,
    /// Scopes the detector runs in
    pub scopes: &'static [ChangeScope],
    pub edit_type: EditType,
    /// False for cosmetic kinds that are pruned before categorization
    pub may_require_revalidation: bool,
    pub detect: Detector,
    pub resulting_state: Option<StateHook>,
}

impl std::fmt::Debug for ChangeKindDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeKindDescriptor")
            .field("kind", &self.kind)
            .field("scopes", &self.scopes)
            .field("edit_type", &self.edit_type)
            .field("may_require_revalidation", &self.may_require_revalidation)
            .finish_non_exhaustive()
    }
}

/// Catalogue of change kinds indexed by scope and edit type
#[derive(Debug)]
pub struct ChangeRegistry {
    descriptors: &'static [ChangeKindDescriptor],
    by_kind: BTreeMap<ChangeKind, usize>,
    by_scope: BTreeMap<ChangeScope, Vec<usize>>,
    by_edit_type: BTreeMap<EditType, Vec<ChangeKind>>,
    never_revalidating: BTreeSet<ChangeKind>,
}

impl Default for ChangeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeRegistry {
    /// Registry over the built-in catalogue
    pub fn new() -> Self {
        Self::from_catalogue(CATALOGUE)
    }

    /// Registry over an arbitrary catalogue
    pub fn from_catalogue(descriptors: &'static [ChangeKindDescriptor]) -> Self {
        let mut by_kind = BTreeMap::new();
        let mut by_scope: BTreeMap<ChangeScope, Vec<usize>> = BTreeMap::new();
        let mut by_edit_type: BTreeMap<EditType, Vec<ChangeKind>> = BTreeMap::new();
        let mut never_revalidating = BTreeSet::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            by_kind.insert(descriptor.kind, index);
            for scope in ChangeScope::ALL {
                if descriptor.scopes.contains(&scope) {
                    by_scope.entry(scope).or_default().push(index);
                }
            }
            by_edit_type
                .entry(descriptor.edit_type)
                .or_default()
                .push(descriptor.kind);
            if !descriptor.may_require_revalidation {
                never_revalidating.insert(descriptor.kind);
            }
        }

        tracing::debug!(
            kinds = descriptors.len(),
            never_revalidating = never_revalidating.len(),
            "change registry built"
        );

        Self {
            descriptors,
            by_kind,
            by_scope,
            by_edit_type,
            never_revalidating,
        }
    }

    pub fn descriptor(&self, kind: ChangeKind) -> Option<&ChangeKindDescriptor> {
        self.by_kind.get(&kind).map(|&i| &self.descriptors[i])
    }

    /// Descriptors applicable to `scope`, in catalogue order
    pub fn detectors_for(&self, scope: ChangeScope) -> impl Iterator<Item = &ChangeKindDescriptor> {
        self.by_scope
            .get(&scope)
            .into_iter()
            .flatten()
            .map(|&i| &self.descriptors[i])
    }

    pub fn kinds_with_edit_type(&self, edit_type: EditType) -> &[ChangeKind] {
        self.by_edit_type
            .get(&edit_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True unless the record's kind is declared cosmetic
    pub fn may_require_revalidation(&self, record: &ChangeRecord) -> bool {
        !self.never_revalidating.contains(&record.kind)
    }

    /// State forced by the record's kind, if it declares a hook
    pub fn resulting_state(
        &self,
        record: &ChangeRecord,
        old: ModelView<'_>,
        new: ModelView<'_>,
    ) -> Option<NodeState> {
        let hook = self.descriptor(record.kind)?.resulting_state?;
        hook(record, old, new)
    }

    /// Run every detector of the context's current scope on its current element
    ///
    /// Kinds that compare against the old counterpart are skipped when the
    /// element does not exist in the old version.
    ///
    /// # Errors
    ///
    /// Returns `DetectorKindMismatch` if a detector returns a record of
    /// another kind or edit type.
    pub fn detect_local(&self, context: &DetectionContext<'_>) -> Result<Vec<ChangeRecord>> {
        let (Some(scope), Some(element)) = (context.current_scope(), context.current_element())
        else {
            return Ok(Vec::new());
        };
        let input = DetectionInput::new(context.old_version(), context.new_version(), element);
        let has_old = Self::has_old_counterpart(&input, scope);

        let mut records = Vec::new();
        for descriptor in self.detectors_for(scope) {
            if descriptor.edit_type.requires_old_counterpart() && !has_old {
                continue;
            }
            for mut record in (descriptor.detect)(&input) {
                if record.kind != descriptor.kind || record.edit_type != descriptor.edit_type {
                    return Err(EvolutionError::DetectorKindMismatch {
                        invoked: descriptor.kind,
                        returned: record.kind,
                        edit_type: record.edit_type,
                        target: record.target,
                    });
                }
                record.may_require_revalidation = descriptor.may_require_revalidation;
                records.push(record);
            }
        }
        Ok(records)
    }

    fn has_old_counterpart(input: &DetectionInput<'_>, scope: ChangeScope) -> bool {
        match scope {
            ChangeScope::Diagram => input
                .old
                .diagram()
                .map(|d| &d.id == input.element)
                .unwrap_or(false),
            _ => input.old.contains(input.element),
        }
    }
}
