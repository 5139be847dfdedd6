/// Scenario 3: Attribute Added To A Represented Class
///
/// `Line` is a structural representative of `Item`. When `Item` gains an
/// attribute, the `line` fragment reuses it and must be regenerated although
/// no record targets `Line`.
mod common;

use common::{attribute, categorized, edit, id, labelled, two_versions};
use evox_core::model::Multiplicity;
use evox_core::{ChangeKind, ChangeRegistry, EditType, NodeColor, NodeState};

fn represented_item_gains_sku() -> (evox_core::ModelStore, evox_core_types::VersionId, evox_core_types::VersionId) {
    let (mut store, old, new) = two_versions(|s| {
        let order = s.add_root_class("order", labelled("Order"));
        s.add_class_under(
            &order,
            "line",
            labelled("Line").representing(id("item")),
            Multiplicity::MANY,
        )
        .unwrap();
        let item = s.add_root_class("item", labelled("Item"));
        s.add_attribute(&item, "code", attribute("code")).unwrap();
    });
    edit(&mut store, new, |s| {
        s.add_attribute(&id("item"), "sku", attribute("sku")).unwrap();
    });
    (store, old, new)
}

#[test]
fn test_scenario_03_addition_record_under_item() {
    // GIVEN Item gaining attribute sku
    let (store, old, new) = represented_item_gains_sku();
    let registry = ChangeRegistry::new();

    // WHEN the change set is categorized
    let change_set = categorized(&store, &registry, old, new);

    // THEN one addition targets sku and Item is Red
    let additions: Vec<_> = change_set
        .records()
        .iter()
        .filter(|r| r.edit_type == EditType::Addition)
        .collect();
    assert_eq!(additions.len(), 1);
    assert_eq!(additions[0].kind, ChangeKind::AttributeAdded);
    assert_eq!(additions[0].target, id("sku"));
    assert_eq!(change_set.get_state(&id("sku")).unwrap(), NodeState::Added);
    assert_eq!(
        change_set.color_of(&id("item")).unwrap(),
        Some(NodeColor::Red)
    );
}

#[test]
fn test_scenario_03_representative_promoted_by_fix_up() {
    // GIVEN Item gaining attribute sku
    let (store, old, new) = represented_item_gains_sku();
    let registry = ChangeRegistry::new();

    // WHEN the change set is categorized
    let change_set = categorized(&store, &registry, old, new);

    // THEN Line is Red without any record of its own
    let line = id("line");
    assert!(change_set
        .records()
        .iter()
        .all(|r| r.target != line && r.secondary_target.as_ref() != Some(&line)));
    assert_eq!(change_set.color_of(&line).unwrap(), Some(NodeColor::Red));
    assert!(change_set.attributes_invalidated(&line).unwrap());
    assert!(!change_set.content_invalidated(&line).unwrap());

    // AND its owner is Blue, the association between them insignificant-blue
    assert_eq!(
        change_set.color_of(&id("order")).unwrap(),
        Some(NodeColor::Blue)
    );
    assert!(change_set
        .insignificant_blue_nodes()
        .unwrap()
        .contains(&id("line.assoc")));

    // AND the fix-up promotion comes after the colored tree in red order
    assert_eq!(change_set.red_nodes().unwrap(), &[id("item"), line]);
}

#[test]
fn test_scenario_03_representative_content_reuses_item() {
    // GIVEN Item gaining attribute sku
    let (store, _old, new) = represented_item_gains_sku();
    let view = evox_core::ModelView::new(&store, new);

    // WHEN the attribute list of line is built
    let items = evox_core::content::attributes_of(view, &id("line")).unwrap();

    // THEN it is Item's attributes inlined behind an alias
    let leaves: Vec<&str> = evox_core::content::leaf_elements(&items)
        .iter()
        .map(|leaf| leaf.as_str())
        .collect();
    assert_eq!(leaves, vec!["code", "sku"]);
    assert!(matches!(
        &items[0],
        evox_core::ContentItem::AliasInlined { represented, .. } if represented == &id("item")
    ));
}

#[test]
fn test_scenario_03_new_representative_invalidates_content() {
    // GIVEN Line becoming a representative of Item in the new version
    let (mut store, old, new) = two_versions(|s| {
        let order = s.add_root_class("order", labelled("Order"));
        s.add_class_under(&order, "line", labelled("Line"), Multiplicity::MANY)
            .unwrap();
        let item = s.add_root_class("item", labelled("Item"));
        s.add_class_under(&item, "price", labelled("Price"), Multiplicity::ONE)
            .unwrap();
    });
    edit(&mut store, new, |s| {
        if let evox_core::ElementKind::Class(class) = &mut s.get_mut(&id("line")).unwrap().kind {
            class.represented_class = Some(id("item"));
        }
    });
    let registry = ChangeRegistry::new();

    // WHEN the change set is categorized
    let change_set = categorized(&store, &registry, old, new);

    // THEN line is regenerated for the inlined content
    let line = id("line");
    assert!(change_set
        .records()
        .iter()
        .any(|r| r.kind == ChangeKind::RepresentedClassChanged && r.target == line));
    assert_eq!(change_set.color_of(&line).unwrap(), Some(NodeColor::Red));
    assert!(change_set.content_invalidated(&line).unwrap());

    // AND Item itself is untouched
    assert_eq!(
        change_set.color_of(&id("item")).unwrap(),
        Some(NodeColor::Green)
    );
}

#[test]
fn test_scenario_03_grouped_representative_leaves_green() {
    // GIVEN an unlabelled line group under order representing Item
    let (mut store, old, new) = two_versions(|s| {
        let order = s.add_root_class("order", labelled("Order"));
        s.add_class_under(
            &order,
            "line",
            evox_core::model::PsmClass::new("Line").representing(id("item")),
            Multiplicity::MANY,
        )
        .unwrap();
        let item = s.add_root_class("item", labelled("Item"));
        s.add_attribute(&item, "code", attribute("code")).unwrap();
    });
    // AND Item gaining attribute sku
    edit(&mut store, new, |s| {
        s.add_attribute(&id("item"), "sku", attribute("sku")).unwrap();
    });
    let registry = ChangeRegistry::new();

    // WHEN the change set is categorized
    let change_set = categorized(&store, &registry, old, new);

    // THEN the group and its owner are both Red
    let line = id("line");
    assert!(change_set.is_content_group_node(&line).unwrap());
    assert_eq!(change_set.color_of(&line).unwrap(), Some(NodeColor::Red));
    assert_eq!(
        change_set.color_of(&id("order")).unwrap(),
        Some(NodeColor::Red)
    );
    assert!(!change_set.green_nodes().unwrap().contains(&line));
    assert!(change_set.attributes_invalidated(&line).unwrap());

    // AND the group is promoted before its owner
    assert_eq!(
        change_set.red_nodes().unwrap(),
        &[id("item"), line, id("order")]
    );
}
