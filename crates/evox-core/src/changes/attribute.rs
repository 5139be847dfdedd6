//! Attribute changes
//!
//! An attribute directly in a class is an XML attribute of the class's
//! element; inside an attribute container it is emitted as an element and is
//! therefore part of the owner's content.

use super::{
    added, attributes, lifecycle_flags, moved, removed_children, reordered, ChangeKind,
    ChangeRecord, DetectionInput, EditType, NodeState,
};
use crate::model::PsmAttribute;
use crate::store::ModelView;

fn attribute_pair<'a>(input: &DetectionInput<'a>) -> Option<(&'a PsmAttribute, &'a PsmAttribute)> {
    let (old, new) = input.counterparts()?;
    Some((old.as_attribute()?, new.as_attribute()?))
}

/// Sedentary attribute edit flagged against the fragment the attribute lives in
fn attribute_edit(input: &DetectionInput<'_>, kind: ChangeKind) -> ChangeRecord {
    let (content, attributes) = input
        .new
        .get(input.element)
        .map(lifecycle_flags)
        .unwrap_or((true, false));
    ChangeRecord::new(kind, EditType::Sedentary, input.element.clone())
        .invalidating_content(content)
        .invalidating_attributes(attributes)
}

pub(crate) fn detect_removed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    removed_children(input, ChangeKind::AttributeRemoved, attributes)
}

pub(crate) fn detect_reordered(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    reordered(input, ChangeKind::AttributesReordered, attributes)
}

pub(crate) fn detect_added(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    added(input, ChangeKind::AttributeAdded)
}

pub(crate) fn detect_moved(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    moved(input, ChangeKind::AttributeMoved)
}

/// An attribute pulled from its class into an attribute container is a new
/// element as far as the generated content is concerned
pub(crate) fn moved_resulting_state(
    record: &ChangeRecord,
    old: ModelView<'_>,
    new: ModelView<'_>,
) -> Option<NodeState> {
    let before = old.get(&record.target)?.as_attribute()?;
    let after = new.get(&record.target)?.as_attribute()?;
    (before.container.is_none() && after.container.is_some()).then_some(NodeState::Added)
}

/// Renaming is cosmetic while an alias keeps the emitted name stable
pub(crate) fn detect_renamed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    let Some((old, new)) = attribute_pair(input) else {
        return Vec::new();
    };
    if old.name == new.name {
        return Vec::new();
    }
    let emitted_same = old.effective_name() == new.effective_name();
    vec![attribute_edit(input, ChangeKind::AttributeRenamed).ignorable(emitted_same)]
}

pub(crate) fn detect_alias_changed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    let Some((old, new)) = attribute_pair(input) else {
        return Vec::new();
    };
    if old.alias == new.alias {
        return Vec::new();
    }
    let emitted_same = old.effective_name() == new.effective_name();
    vec![attribute_edit(input, ChangeKind::AttributeAliasChanged).ignorable(emitted_same)]
}

pub(crate) fn detect_type_changed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    match attribute_pair(input) {
        Some((old, new)) if old.type_name != new.type_name => {
            vec![attribute_edit(input, ChangeKind::AttributeTypeChanged)]
        }
        _ => Vec::new(),
    }
}

pub(crate) fn detect_default_value_changed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    match attribute_pair(input) {
        Some((old, new)) if old.default_value != new.default_value => {
            vec![attribute_edit(input, ChangeKind::AttributeDefaultValueChanged)]
        }
        _ => Vec::new(),
    }
}

pub(crate) fn detect_multiplicity_changed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    match attribute_pair(input) {
        Some((old, new)) if old.multiplicity != new.multiplicity => {
            vec![attribute_edit(input, ChangeKind::AttributeMultiplicityChanged)
                .with_multiplicity(old.multiplicity, new.multiplicity)]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeContainer, ElementKind, PsmClass};
    use crate::store::ModelStore;
    use evox_core_types::{ElementId, VersionId};

    fn store_with_code() -> (ModelStore, VersionId, VersionId) {
        let mut store = ModelStore::new("Products");
        let v1 = store.latest();
        let snapshot = store.snapshot_mut(v1).unwrap();
        let product = snapshot.add_root_class("product", PsmClass::new("Product").with_element_name("product"));
        snapshot
            .add_attribute(&product, "code", PsmAttribute::new("code"))
            .unwrap();
        let v2 = store.branch(v1, "edited").unwrap();
        (store, v1, v2)
    }

    fn edit_code(store: &mut ModelStore, version: VersionId, edit: impl FnOnce(&mut PsmAttribute)) {
        let element = store
            .snapshot_mut(version)
            .unwrap()
            .get_mut(&ElementId::from("code"))
            .unwrap();
        if let ElementKind::Attribute(attribute) = &mut element.kind {
            edit(attribute);
        }
    }

    #[test]
    fn test_rename_behind_alias_is_ignorable() {
        let (mut store, v1, v2) = store_with_code();
        edit_code(&mut store, v1, |a| a.alias = Some("sku".to_string()));
        edit_code(&mut store, v2, |a| {
            a.alias = Some("sku".to_string());
            a.name = "productCode".to_string();
        });
        let code = ElementId::from("code");
        let input = DetectionInput::new(ModelView::new(&store, v1), ModelView::new(&store, v2), &code);

        let records = detect_renamed(&input);
        assert_eq!(records.len(), 1);
        assert!(records[0].ignorable);
        assert!(records[0].invalidates_attributes);
    }

    #[test]
    fn test_move_into_container_resolves_to_added() {
        let (mut store, v1, v2) = store_with_code();
        let snapshot = store.snapshot_mut(v2).unwrap();
        let holder = snapshot
            .add_component(
                &ElementId::from("product"),
                "holder",
                ElementKind::AttributeContainer(AttributeContainer::default()),
            )
            .unwrap();
        snapshot.move_to(&ElementId::from("code"), &holder).unwrap();

        let code = ElementId::from("code");
        let (old, new) = (ModelView::new(&store, v1), ModelView::new(&store, v2));
        let records = detect_moved(&DetectionInput::new(old, new, &code));

        assert_eq!(records.len(), 1);
        assert!(records[0].invalidates_content);
        assert!(records[0].invalidates_attributes);
        assert_eq!(moved_resulting_state(&records[0], old, new), Some(NodeState::Added));
    }
}
