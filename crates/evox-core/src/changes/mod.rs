//! Change kinds and their detectors
//!
//! Every concrete change is a pure function `(old, new, element) -> records`
//! registered in [`catalogue::CATALOGUE`] together with the scopes it applies
//! to and its edit type. The helpers below implement the shapes most kinds
//! share (added, moved, child removed, children reordered, field changed).

pub mod association;
pub mod attribute;
pub mod catalogue;
pub mod class;
pub mod component;
pub mod diagram;
pub mod kind;
pub mod record;

use evox_core_types::ElementId;

use crate::model::{Element, ElementKind};
use crate::store::ModelView;

pub use kind::{ChangeKind, ChangeScope, EditType, NodeState};
pub use record::{ChangeRecord, MultiplicityChange};

/// What a detector sees: both versions and the element being visited
///
/// For the Diagram scope `element` is the diagram id.
#[derive(Clone, Copy)]
pub struct DetectionInput<'a> {
    pub old: ModelView<'a>,
    pub new: ModelView<'a>,
    pub element: &'a ElementId,
}

impl<'a> DetectionInput<'a> {
    pub fn new(old: ModelView<'a>, new: ModelView<'a>, element: &'a ElementId) -> Self {
        Self { old, new, element }
    }

    /// The visited element in both versions, if it exists in both
    pub fn counterparts(&self) -> Option<(&'a Element, &'a Element)> {
        Some((self.old.get(self.element)?, self.new.get(self.element)?))
    }
}

/// Fragments affected when `element` appears or disappears
///
/// XML attributes live in the owner's attribute list; everything else is part
/// of the owner's content.
pub(crate) fn lifecycle_flags(element: &Element) -> (bool, bool) {
    match &element.kind {
        ElementKind::Attribute(attribute) if attribute.is_xml_attribute() => (false, true),
        _ => (true, false),
    }
}

pub(crate) fn added(input: &DetectionInput<'_>, kind: ChangeKind) -> Vec<ChangeRecord> {
    let Some(element) = input.new.get(input.element) else {
        return Vec::new();
    };
    if input.old.contains(input.element) {
        return Vec::new();
    }
    let (content, attributes) = lifecycle_flags(element);
    vec![ChangeRecord::new(kind, EditType::Addition, input.element.clone())
        .invalidating_content(content)
        .invalidating_attributes(attributes)]
}

pub(crate) fn moved(input: &DetectionInput<'_>, kind: ChangeKind) -> Vec<ChangeRecord> {
    let Some((old, new)) = input.counterparts() else {
        return Vec::new();
    };
    let old_parent = input.old.structural_parent(input.element);
    if old_parent == input.new.structural_parent(input.element) {
        return Vec::new();
    }
    let (old_content, old_attributes) = lifecycle_flags(old);
    let (new_content, new_attributes) = lifecycle_flags(new);
    vec![
        ChangeRecord::new(kind, EditType::Migratory, input.element.clone())
            .with_secondary(old_parent.cloned())
            .invalidating_content(old_content || new_content)
            .invalidating_attributes(old_attributes || new_attributes),
    ]
}

/// Children listed by `select` in the old element that no longer exist
pub(crate) fn removed_children(
    input: &DetectionInput<'_>,
    kind: ChangeKind,
    select: fn(&Element) -> &[ElementId],
) -> Vec<ChangeRecord> {
    let Some(old) = input.old.get(input.element) else {
        return Vec::new();
    };
    select(old)
        .iter()
        .filter(|child| !input.new.contains(child))
        .filter_map(|child| input.old.get(child))
        .map(|child| {
            let (content, attributes) = lifecycle_flags(child);
            ChangeRecord::new(kind, EditType::Removal, child.id.clone())
                .with_secondary(Some(input.element.clone()))
                .invalidating_content(content)
                .invalidating_attributes(attributes)
        })
        .collect()
}

/// Children present in both versions whose relative order changed
pub(crate) fn reordered(
    input: &DetectionInput<'_>,
    kind: ChangeKind,
    select: fn(&Element) -> &[ElementId],
) -> Vec<ChangeRecord> {
    let Some((old, new)) = input.counterparts() else {
        return Vec::new();
    };
    let (old_children, new_children) = (select(old), select(new));
    let kept_old: Vec<&ElementId> = old_children
        .iter()
        .filter(|c| new_children.contains(c))
        .collect();
    let kept_new: Vec<&ElementId> = new_children
        .iter()
        .filter(|c| old_children.contains(c))
        .collect();
    if kept_old == kept_new {
        return Vec::new();
    }
    vec![ChangeRecord::new(kind, EditType::Sedentary, input.element.clone()).invalidating_content(true)]
}

/// In-place edit detected by comparing a projection of both counterparts
pub(crate) fn sedentary<T: PartialEq>(
    input: &DetectionInput<'_>,
    kind: ChangeKind,
    project: impl Fn(&Element) -> Option<T>,
) -> Option<ChangeRecord> {
    let (old, new) = input.counterparts()?;
    let (old_value, new_value) = (project(old)?, project(new)?);
    (old_value != new_value)
        .then(|| ChangeRecord::new(kind, EditType::Sedentary, input.element.clone()))
}

pub(crate) fn components(element: &Element) -> &[ElementId] {
    element.components()
}

pub(crate) fn attributes(element: &Element) -> &[ElementId] {
    element.attributes()
}
