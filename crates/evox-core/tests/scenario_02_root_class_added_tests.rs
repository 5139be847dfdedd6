/// Scenario 2: Root Class Added
///
/// A labelled root `Order` appears in the new version without an old
/// counterpart.
mod common;

use common::{categorized, edit, id, labelled, two_versions};
use evox_core::{ChangeKind, ChangeRegistry, NodeColor, NodeState};

#[test]
fn test_scenario_02_new_root_is_added_and_red() {
    // GIVEN a diagram with Customer, and Order added in the new version
    let (mut store, old, new) = two_versions(|s| {
        s.add_root_class("customer", labelled("Customer"));
    });
    edit(&mut store, new, |s| {
        s.add_root_class("order", labelled("Order"));
    });
    let registry = ChangeRegistry::new();

    // WHEN the change set is categorized
    let change_set = categorized(&store, &registry, old, new);

    // THEN Order is Added and Red
    let order = id("order");
    assert_eq!(change_set.get_state(&order).unwrap(), NodeState::Added);
    assert_eq!(change_set.color_of(&order).unwrap(), Some(NodeColor::Red));
    assert!(change_set
        .records()
        .iter()
        .any(|r| r.kind == ChangeKind::ClassAdded && r.target == order));

    // AND the existing root is unaffected
    let customer = id("customer");
    assert_eq!(change_set.color_of(&customer).unwrap(), Some(NodeColor::Green));
    assert!(change_set.blue_nodes().unwrap().is_empty());
    assert!(change_set.insignificant_blue_nodes().unwrap().is_empty());
}

#[test]
fn test_scenario_02_added_child_contributes_to_parent_content() {
    // GIVEN Order with a new Line child in the new version
    let (mut store, old, new) = two_versions(|s| {
        s.add_root_class("order", labelled("Order"));
    });
    edit(&mut store, new, |s| {
        s.add_class_under(&id("order"), "line", labelled("Line"), evox_core::Multiplicity::MANY)
            .unwrap();
    });
    let registry = ChangeRegistry::new();

    // WHEN the change set is categorized
    let change_set = categorized(&store, &registry, old, new);

    // THEN Line is Added and invalidates its own content slot
    let line = id("line");
    assert_eq!(change_set.get_state(&line).unwrap(), NodeState::Added);
    assert!(change_set.content_invalidated(&line).unwrap());
    assert!(!change_set.attributes_invalidated(&line).unwrap());

    // AND the owner must rebuild its content, listed after the deeper node
    let order = id("order");
    assert!(change_set.content_invalidated(&order).unwrap());
    assert_eq!(change_set.red_nodes().unwrap(), &[line, order]);
}

#[test]
fn test_scenario_02_element_missing_from_old_version_is_added_without_record() {
    // GIVEN a change set built over no records at all
    let (mut store, old, new) = two_versions(|s| {
        s.add_root_class("order", labelled("Order"));
    });
    edit(&mut store, new, |s| {
        s.add_root_class("invoice", labelled("Invoice"));
    });
    let registry = ChangeRegistry::new();
    let mut change_set = evox_core::ChangeSet::new(&store, &registry, old, new, Vec::new());

    // WHEN categorized
    change_set.categorize().unwrap();

    // THEN the state still follows version membership
    assert_eq!(change_set.get_state(&id("invoice")).unwrap(), NodeState::Added);
    assert_eq!(change_set.get_state(&id("order")).unwrap(), NodeState::AsItWas);
    assert_eq!(
        change_set.color_of(&id("invoice")).unwrap(),
        Some(NodeColor::Red)
    );
}
