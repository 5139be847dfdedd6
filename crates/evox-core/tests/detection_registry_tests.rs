//! Detection driver and change registry contracts
mod common;

use common::{attribute, edit, id, labelled, two_versions};
use evox_core::changes::DetectionInput;
use evox_core::detection::{DetectionContext, ScopeStack};
use evox_core::model::Multiplicity;
use evox_core::{
    detect_changes, ChangeKind, ChangeKindDescriptor, ChangeRecord, ChangeRegistry, ChangeScope,
    ChangeSet, EditType, ErrorKind, EvolutionError, ModelView,
};
use evox_core_types::VersionId;

fn claims_a_move(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    vec![ChangeRecord::new(
        ChangeKind::ClassMoved,
        EditType::Migratory,
        input.element.clone(),
    )]
}

static MISDECLARED: &[ChangeKindDescriptor] = &[ChangeKindDescriptor {
    kind: ChangeKind::ClassAdded,
    scopes: &[ChangeScope::Class],
    edit_type: EditType::Addition,
    may_require_revalidation: true,
    detect: claims_a_move,
    resulting_state: None,
}];

#[test]
fn test_detector_returning_foreign_kind_is_rejected() {
    // GIVEN a catalogue whose ClassAdded detector reports moves
    let (store, old, new) = two_versions(|s| {
        s.add_root_class("order", labelled("Order"));
    });
    let registry = ChangeRegistry::from_catalogue(MISDECLARED);

    // WHEN changes are detected
    let err = detect_changes(&store, &registry, old, new).unwrap_err();

    // THEN the mismatch is reported as a consistency error
    assert_eq!(err.code(), "ERR_DETECTOR_KIND_MISMATCH");
    assert_eq!(err.kind(), ErrorKind::Consistency);
    assert!(matches!(
        err,
        EvolutionError::DetectorKindMismatch {
            invoked: ChangeKind::ClassAdded,
            returned: ChangeKind::ClassMoved,
            ..
        }
    ));
}

#[test]
fn test_unbalanced_scope_is_rejected() {
    // GIVEN a context inside a Class scope
    let (store, old, new) = two_versions(|s| {
        s.add_root_class("order", labelled("Order"));
    });
    let order = id("order");
    let mut context =
        DetectionContext::new(ModelView::new(&store, old), ModelView::new(&store, new));
    context.enter(ChangeScope::Class, &order);

    // WHEN leaving a scope that was never entered
    let err = context.leave(ChangeScope::Association).unwrap_err();

    // THEN the stack is left as it was
    assert_eq!(
        err,
        EvolutionError::UnbalancedScope {
            expected: ChangeScope::Association,
            found: Some(ChangeScope::Class),
        }
    );
    assert_eq!(context.depth(), 1);
    assert_eq!(context.current_element(), Some(&order));
    assert!(context.leave(ChangeScope::Class).is_ok());
}

#[test]
fn test_scope_stack_tracks_nesting() {
    let mut stack = ScopeStack::default();
    stack.push(ChangeScope::Diagram);
    stack.push(ChangeScope::Class);

    assert_eq!(stack.current(), Some(ChangeScope::Class));
    stack.pop(ChangeScope::Class).unwrap();
    stack.pop(ChangeScope::Diagram).unwrap();
    assert!(stack.is_empty());
}

#[test]
fn test_unknown_version_is_a_lookup_error() {
    let (store, old, _new) = two_versions(|s| {
        s.add_root_class("order", labelled("Order"));
    });
    let registry = ChangeRegistry::new();

    let err = detect_changes(&store, &registry, old, VersionId::new(42)).unwrap_err();

    assert_eq!(err.code(), "ERR_VERSION_NOT_FOUND");
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

#[test]
fn test_removed_root_is_reported_and_ungrouped() {
    // GIVEN a root class dropped from the new version
    let (mut store, old, new) = two_versions(|s| {
        s.add_root_class("order", labelled("Order"));
        s.add_root_class("legacy", labelled("Legacy"));
    });
    edit(&mut store, new, |s| s.remove_subtree(&id("legacy")).unwrap());
    let registry = ChangeRegistry::new();

    // WHEN the change set is categorized
    let mut change_set = ChangeSet::detect(&store, &registry, old, new).unwrap();
    change_set.categorize().unwrap();

    // THEN the removal affects no emitted fragment
    let ungrouped = change_set.ungrouped_records().unwrap();
    assert_eq!(ungrouped.len(), 1);
    assert_eq!(ungrouped[0].kind, ChangeKind::RootClassRemoved);
    assert_eq!(ungrouped[0].target, id("legacy"));
    assert!(change_set.red_nodes().unwrap().is_empty());
}

#[test]
fn test_moved_attribute_touches_both_owners() {
    // GIVEN an attribute moved from Customer to Order
    let (mut store, old, new) = two_versions(|s| {
        let order = s.add_root_class("order", labelled("Order"));
        s.add_class_under(&order, "customer", labelled("Customer"), Multiplicity::ONE)
            .unwrap();
        s.add_attribute(&id("customer"), "email", attribute("email"))
            .unwrap();
    });
    edit(&mut store, new, |s| {
        s.move_to(&id("email"), &id("order")).unwrap()
    });
    let registry = ChangeRegistry::new();

    // WHEN the change set is categorized
    let change_set = common::categorized(&store, &registry, old, new);

    // THEN the move is grouped under both fragments, which turn Red
    let moves: Vec<_> = change_set
        .records()
        .iter()
        .filter(|r| r.kind == ChangeKind::AttributeMoved)
        .collect();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].secondary_target, Some(id("customer")));
    assert_eq!(
        change_set.get_state(&id("email")).unwrap(),
        evox_core::NodeState::Moved
    );
    assert_eq!(change_set.grouped_records(&id("order")).unwrap().len(), 1);
    assert_eq!(change_set.grouped_records(&id("customer")).unwrap().len(), 1);
    assert_eq!(
        change_set.red_nodes().unwrap(),
        &[id("customer"), id("order")]
    );
}

#[test]
fn test_queries_before_categorize_fail() {
    let (store, old, new) = two_versions(|s| {
        s.add_root_class("order", labelled("Order"));
    });
    let registry = ChangeRegistry::new();
    let change_set = ChangeSet::detect(&store, &registry, old, new).unwrap();

    let err = change_set.red_nodes().unwrap_err();

    assert_eq!(err, EvolutionError::NotCategorized);
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(change_set.report().is_err());
}
