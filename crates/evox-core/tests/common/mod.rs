use evox_core::model::{ElementKind, Multiplicity, PsmAttribute, PsmClass};
use evox_core::store::Snapshot;
use evox_core::{ChangeRegistry, ChangeSet, ModelStore};
use evox_core_types::{ElementId, VersionId};

/// Shorthand for element ids in assertions
#[allow(dead_code)]
pub fn id(raw: &str) -> ElementId {
    ElementId::from(raw)
}

/// Labelled class (emits an XML element of the same name in lower case)
#[allow(dead_code)]
pub fn labelled(name: &str) -> PsmClass {
    PsmClass::new(name).with_element_name(name.to_lowercase())
}

/// Store with an initial version built by `build`, branched once
///
/// Returns the store with (old, new) versions; the new version starts as a
/// copy of the old one.
#[allow(dead_code)]
pub fn two_versions(build: impl FnOnce(&mut Snapshot)) -> (ModelStore, VersionId, VersionId) {
    let mut store = ModelStore::new("Fixture");
    let old = store.latest();
    build(store.snapshot_mut(old).expect("initial version exists"));
    let new = store.branch(old, "edited").expect("branch from initial");
    (store, old, new)
}

/// Apply edits to one version of the store
#[allow(dead_code)]
pub fn edit(store: &mut ModelStore, version: VersionId, apply: impl FnOnce(&mut Snapshot)) {
    apply(store.snapshot_mut(version).expect("version exists"));
}

/// Detect and categorize, panicking on any consistency error
#[allow(dead_code)]
pub fn categorized<'a>(
    store: &'a ModelStore,
    registry: &'a ChangeRegistry,
    old: VersionId,
    new: VersionId,
) -> ChangeSet<'a> {
    evox_core::analyze(store, registry, old, new).expect("analysis succeeds")
}

/// Set the multiplicity of an association in a snapshot
#[allow(dead_code)]
pub fn set_association_multiplicity(
    snapshot: &mut Snapshot,
    association: &ElementId,
    multiplicity: Multiplicity,
) {
    match &mut snapshot.get_mut(association).expect("association exists").kind {
        ElementKind::Association(a) => a.multiplicity = multiplicity,
        other => panic!("{} is not an association: {:?}", association, other),
    }
}

/// Set or clear the element label of a class in a snapshot
#[allow(dead_code)]
pub fn set_label(snapshot: &mut Snapshot, class: &ElementId, label: Option<&str>) {
    match &mut snapshot.get_mut(class).expect("class exists").kind {
        ElementKind::Class(c) => c.element_name = label.map(str::to_string),
        other => panic!("{} is not a class: {:?}", class, other),
    }
}

/// Plain string attribute
#[allow(dead_code)]
pub fn attribute(name: &str) -> PsmAttribute {
    PsmAttribute::new(name).with_type("string")
}
