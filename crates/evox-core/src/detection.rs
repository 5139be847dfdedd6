//! Change detection driver
//!
//! Walks the new version top-down, keeping a scope stack in step with the
//! element being visited, and asks the registry for the local changes of each
//! element. The Diagram scope is detected first, then every root class
//! subtree in diagram order.

use std::collections::BTreeMap;

use evox_core_types::{ElementId, VersionId};

use crate::changes::{ChangeKind, ChangeRecord, ChangeScope, EditType};
use crate::errors::{EvolutionError, Result};
use crate::registry::ChangeRegistry;
use crate::store::{ModelView, VersionedStore};
use crate::{log_op_end, log_op_error, log_op_start};

/// Scopes entered and not yet left, innermost last
#[derive(Debug, Default, Clone)]
pub struct ScopeStack {
    scopes: Vec<ChangeScope>,
}

impl ScopeStack {
    pub fn push(&mut self, scope: ChangeScope) {
        self.scopes.push(scope);
    }

    /// Pop the innermost scope, which must be `expected`
    ///
    /// # Errors
    ///
    /// Returns `UnbalancedScope` if the top of the stack is another scope or
    /// the stack is empty. The stack is left untouched in that case.
    pub fn pop(&mut self, expected: ChangeScope) -> Result<()> {
        let found = self.current();
        if found != Some(expected) {
            return Err(EvolutionError::UnbalancedScope { expected, found });
        }
        self.scopes.pop();
        Ok(())
    }

    pub fn current(&self) -> Option<ChangeScope> {
        self.scopes.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

/// Traversal state handed to the registry at every visited element
pub struct DetectionContext<'a> {
    old: ModelView<'a>,
    new: ModelView<'a>,
    scopes: ScopeStack,
    elements: Vec<&'a ElementId>,
}

impl<'a> DetectionContext<'a> {
    pub fn new(old: ModelView<'a>, new: ModelView<'a>) -> Self {
        Self {
            old,
            new,
            scopes: ScopeStack::default(),
            elements: Vec::new(),
        }
    }

    pub fn old_version(&self) -> ModelView<'a> {
        self.old
    }

    pub fn new_version(&self) -> ModelView<'a> {
        self.new
    }

    pub fn current_scope(&self) -> Option<ChangeScope> {
        self.scopes.current()
    }

    pub fn current_element(&self) -> Option<&'a ElementId> {
        self.elements.last().copied()
    }

    /// Make `element` the current element of a freshly pushed `scope`
    pub fn enter(&mut self, scope: ChangeScope, element: &'a ElementId) {
        self.scopes.push(scope);
        self.elements.push(element);
    }

    /// # Errors
    ///
    /// Returns `UnbalancedScope` if `scope` is not the innermost scope.
    pub fn leave(&mut self, scope: ChangeScope) -> Result<()> {
        self.scopes.pop(scope)?;
        self.elements.pop();
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.scopes.depth()
    }
}

/// Detect every local change between `old` and `new`
///
/// # Errors
///
/// - `VersionNotFound` / `DiagramNotFound` if either version cannot be read
/// - `UnbalancedScope` if the traversal leaves a scope it did not enter
/// - `DetectorKindMismatch` if a detector breaks its declaration
/// - `ConflictingLifecycleRecords` if one target gets both an addition and a
///   removal, or a move together with either
pub fn detect_changes(
    store: &dyn VersionedStore,
    registry: &ChangeRegistry,
    old: VersionId,
    new: VersionId,
) -> Result<Vec<ChangeRecord>> {
    let start = std::time::Instant::now();
    log_op_start!(
        "detect_changes",
        old_version = old.number(),
        new_version = new.number()
    );

    let result = collect(store, registry, old, new);

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(records) => {
            log_op_end!(
                "detect_changes",
                duration_ms = duration_ms,
                record_count = records.len()
            );
        }
        Err(err) => {
            log_op_error!("detect_changes", err, duration_ms = duration_ms);
        }
    }
    result
}

fn collect(
    store: &dyn VersionedStore,
    registry: &ChangeRegistry,
    old: VersionId,
    new: VersionId,
) -> Result<Vec<ChangeRecord>> {
    for version in [old, new] {
        store
            .version_info(version)
            .ok_or(EvolutionError::VersionNotFound { version })?;
    }
    let new_view = ModelView::new(store, new);
    let diagram = new_view.diagram()?;
    let mut context = DetectionContext::new(ModelView::new(store, old), new_view);
    let mut records = Vec::new();

    context.enter(ChangeScope::Diagram, &diagram.id);
    records.extend(registry.detect_local(&context)?);
    for root in &diagram.roots {
        visit(&mut context, registry, root, &mut records)?;
    }
    context.leave(ChangeScope::Diagram)?;

    validate_lifecycle(&records)?;
    Ok(records)
}

fn visit<'a>(
    context: &mut DetectionContext<'a>,
    registry: &ChangeRegistry,
    id: &'a ElementId,
    records: &mut Vec<ChangeRecord>,
) -> Result<()> {
    let element = context.new_version().element(id)?;
    let scope = ChangeScope::of(&element.kind);

    context.enter(scope, id);
    records.extend(registry.detect_local(context)?);
    for child in element.children() {
        visit(context, registry, child, records)?;
    }
    context.leave(scope)
}

/// At most one lifecycle record per target, and none next to a move
fn validate_lifecycle(records: &[ChangeRecord]) -> Result<()> {
    let mut by_target: BTreeMap<&ElementId, Vec<(ChangeKind, EditType)>> = BTreeMap::new();
    for record in records {
        if record.edit_type.is_lifecycle() || record.edit_type == EditType::Migratory {
            by_target
                .entry(&record.target)
                .or_default()
                .push((record.kind, record.edit_type));
        }
    }

    match by_target.into_iter().find(|(_, entries)| entries.len() > 1) {
        Some((target, entries)) => Err(EvolutionError::ConflictingLifecycleRecords {
            target: target.clone(),
            kinds: entries.into_iter().map(|(kind, _)| kind).collect(),
        }),
        None => Ok(()),
    }
}
