//! Class and class-union changes

use super::{added, moved, sedentary, ChangeKind, ChangeRecord, DetectionInput};
use crate::model::{Element, PsmClass};

fn class(element: &Element) -> Option<&PsmClass> {
    element.as_class()
}

pub(crate) fn detect_class_added(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    added(input, ChangeKind::ClassAdded)
}

pub(crate) fn detect_class_moved(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    moved(input, ChangeKind::ClassMoved)
}

pub(crate) fn detect_class_renamed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    sedentary(input, ChangeKind::ClassRenamed, |e| class(e).map(|c| c.name.clone()))
        .map(|record| record.ignorable(true))
        .into_iter()
        .collect()
}

/// Label changed, added or removed
///
/// Gaining or losing a label changes what the owner's content consists of;
/// a plain rename only affects the class's own fragment.
pub(crate) fn detect_element_name_changed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    let Some(record) = sedentary(input, ChangeKind::ClassElementNameChanged, |e| {
        class(e).map(|c| c.element_name.clone())
    }) else {
        return Vec::new();
    };
    let label_toggled = input.old.has_label(input.element) != input.new.has_label(input.element);
    vec![record.invalidating_content(label_toggled)]
}

pub(crate) fn detect_represented_class_changed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    sedentary(input, ChangeKind::RepresentedClassChanged, |e| {
        class(e).map(|c| c.represented_class.clone())
    })
    .map(|record| record.invalidating_content(true).invalidating_attributes(true))
    .into_iter()
    .collect()
}

pub(crate) fn detect_allow_any_attribute_changed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    sedentary(input, ChangeKind::AllowAnyAttributeChanged, |e| {
        class(e).map(|c| c.allow_any_attribute)
    })
    .map(|record| record.invalidating_attributes(true))
    .into_iter()
    .collect()
}

pub(crate) fn detect_union_added(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    added(input, ChangeKind::ClassUnionAdded)
}

pub(crate) fn detect_union_moved(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    moved(input, ChangeKind::ClassUnionMoved)
}
