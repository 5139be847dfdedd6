//! Changes of subordinate components and the container kinds

use super::{
    added, components, lifecycle_flags, moved, removed_children, reordered, sedentary, ChangeKind,
    ChangeRecord, DetectionInput, EditType,
};
use crate::model::ElementKind;

/// Components of the visited owner that no longer exist
///
/// For an association the single child counts as its component.
pub(crate) fn detect_component_removed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    let Some((old, new)) = input.counterparts() else {
        return Vec::new();
    };
    match (old.as_association(), new.as_association()) {
        (Some(old_association), Some(new_association)) => {
            let child = &old_association.child;
            if child == &new_association.child || input.new.contains(child) {
                return Vec::new();
            }
            input
                .old
                .get(child)
                .map(|removed| {
                    let (content, attributes) = lifecycle_flags(removed);
                    ChangeRecord::new(ChangeKind::ComponentRemoved, EditType::Removal, child.clone())
                        .with_secondary(Some(input.element.clone()))
                        .invalidating_content(content)
                        .invalidating_attributes(attributes)
                })
                .into_iter()
                .collect()
        }
        _ => removed_children(input, ChangeKind::ComponentRemoved, components),
    }
}

pub(crate) fn detect_components_reordered(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    reordered(input, ChangeKind::ComponentsReordered, components)
}

pub(crate) fn detect_content_container_added(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    added(input, ChangeKind::ContentContainerAdded)
}

pub(crate) fn detect_content_container_moved(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    moved(input, ChangeKind::ContentContainerMoved)
}

/// The container name is the emitted element name
pub(crate) fn detect_content_container_renamed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    sedentary(input, ChangeKind::ContentContainerRenamed, |e| match &e.kind {
        ElementKind::ContentContainer(container) => Some(container.name.clone()),
        _ => None,
    })
    .into_iter()
    .collect()
}

pub(crate) fn detect_content_choice_added(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    added(input, ChangeKind::ContentChoiceAdded)
}

pub(crate) fn detect_content_choice_moved(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    moved(input, ChangeKind::ContentChoiceMoved)
}

pub(crate) fn detect_attribute_container_added(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    added(input, ChangeKind::AttributeContainerAdded)
}

pub(crate) fn detect_attribute_container_moved(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    moved(input, ChangeKind::AttributeContainerMoved)
}
