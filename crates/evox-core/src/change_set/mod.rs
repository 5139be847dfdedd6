//! Change set: aggregation, categorization and invalidation queries
//!
//! A [`ChangeSet`] owns the records detected for one (old, new) version pair.
//! [`ChangeSet::categorize`] runs four phases in order:
//!
//! 1. prune records of kinds that never require revalidation
//! 2. group records by target and by nearest significant-or-group node
//! 3. color every significant and group node Red, Blue or Green
//! 4. propagate colors across structural representatives until stable
//!
//! Queries are only answered once categorization has completed.
//!
//! ## Red list order
//!
//! Red nodes are listed deepest first. A node promoted to Red because an
//! association leads to a Red group node is inserted immediately before that
//! group node; nodes promoted by the representative fix-up are appended.

mod coloring;
mod grouping;
mod queries;
mod report;
mod representatives;

use std::collections::{BTreeSet, HashMap, HashSet};

use evox_core_types::{ElementId, VersionId};
use serde::{Deserialize, Serialize};

use crate::changes::ChangeRecord;
use crate::detection::detect_changes;
use crate::errors::{EvolutionError, Result};
use crate::model::ElementKind;
use crate::registry::ChangeRegistry;
use crate::store::{ModelView, VersionedStore};
use crate::{log_op_end, log_op_error, log_op_start};

pub use report::ImpactReport;
pub use representatives::AliasRelation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeColor {
    /// The node's own fragment must be regenerated
    Red,
    /// Unaffected itself, but contains a Red or Blue descendant
    Blue,
    /// Fully reusable
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Collected,
    Pruned,
    Grouped,
    Colored,
    Categorized,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Collected => "collected",
            Phase::Pruned => "pruned",
            Phase::Grouped => "grouped",
            Phase::Colored => "colored",
            Phase::Categorized => "categorized",
        }
    }
}

/// Everything derived by `categorize()`, rebuilt from scratch on each run
#[derive(Debug, Default)]
struct Categorization {
    /// Records that survived pruning
    records: Vec<ChangeRecord>,
    /// Record indices by primary and secondary target
    by_target: HashMap<ElementId, Vec<usize>>,
    /// Record indices by nearest significant-or-group node
    by_group: HashMap<ElementId, Vec<usize>>,
    /// Records affecting nothing emitted
    ungrouped: Vec<usize>,
    aliases: AliasRelation,
    group_nodes: BTreeSet<ElementId>,
    /// Group nodes that had an element label in the old version
    lost_label: BTreeSet<ElementId>,
    red: Vec<ElementId>,
    /// Membership index over `red`
    red_index: HashSet<ElementId>,
    blue: BTreeSet<ElementId>,
    green: BTreeSet<ElementId>,
    /// Non-significant nodes with colored descendants
    insignificant_blue: BTreeSet<ElementId>,
}

impl Categorization {
    /// Append to the red list unless already Red
    fn push_red(&mut self, id: &ElementId) {
        if self.red_index.insert(id.clone()) {
            self.red.push(id.clone());
        }
    }

    /// Insert into the red list at `at` unless already Red
    fn insert_red(&mut self, at: usize, id: &ElementId) {
        if self.red_index.insert(id.clone()) {
            self.red.insert(at, id.clone());
        }
    }
}

/// Changes between two versions and their classification
pub struct ChangeSet<'a> {
    old: ModelView<'a>,
    new: ModelView<'a>,
    registry: &'a ChangeRegistry,
    detected: Vec<ChangeRecord>,
    phase: Phase,
    state: Categorization,
}

impl<'a> ChangeSet<'a> {
    /// Change set over already detected records
    pub fn new(
        store: &'a dyn VersionedStore,
        registry: &'a ChangeRegistry,
        old: VersionId,
        new: VersionId,
        records: Vec<ChangeRecord>,
    ) -> Self {
        Self {
            old: ModelView::new(store, old),
            new: ModelView::new(store, new),
            registry,
            detected: records,
            phase: Phase::Collected,
            state: Categorization::default(),
        }
    }

    /// Detect the changes between `old` and `new` and collect them
    ///
    /// # Errors
    ///
    /// Propagates every error of [`detect_changes`].
    pub fn detect(
        store: &'a dyn VersionedStore,
        registry: &'a ChangeRegistry,
        old: VersionId,
        new: VersionId,
    ) -> Result<Self> {
        let records = detect_changes(store, registry, old, new)?;
        Ok(Self::new(store, registry, old, new, records))
    }

    /// Every detected record, including pruned ones
    pub fn records(&self) -> &[ChangeRecord] {
        &self.detected
    }

    pub fn old_view(&self) -> ModelView<'a> {
        self.old
    }

    pub fn new_view(&self) -> ModelView<'a> {
        self.new
    }

    pub fn is_categorized(&self) -> bool {
        self.phase == Phase::Categorized
    }

    /// Run all categorization phases
    ///
    /// Always starts over from the detected records, so calling it again
    /// yields the same result.
    ///
    /// # Errors
    ///
    /// - `DiagramNotFound` / `ElementNotFound` if the new version is incomplete
    /// - `OverlappingColors` if a node ends up in two color sets
    ///
    /// On error the change set is left uncategorized.
    pub fn categorize(&mut self) -> Result<()> {
        let start = std::time::Instant::now();
        log_op_start!(
            "categorize",
            old_version = self.old.version().number(),
            new_version = self.new.version().number()
        );

        self.state = Categorization::default();
        self.phase = Phase::Collected;
        let result = self.run_phases();

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => {
                log_op_end!(
                    "categorize",
                    duration_ms = duration_ms,
                    red_count = self.state.red.len(),
                    record_count = self.state.records.len()
                );
            }
            Err(err) => {
                self.phase = Phase::Collected;
                log_op_error!("categorize", err, duration_ms = duration_ms);
            }
        }
        result
    }

    fn run_phases(&mut self) -> Result<()> {
        self.prune()?;
        self.group()?;
        self.color()?;
        self.fix_up()?;
        self.check_disjoint()
    }

    fn prune(&mut self) -> Result<()> {
        self.enter_phase(Phase::Collected, Phase::Pruned, "prune")?;
        let registry = self.registry;
        self.state.records = self
            .detected
            .iter()
            .filter(|record| registry.may_require_revalidation(record))
            .cloned()
            .collect();
        tracing::debug!(
            kept = self.state.records.len(),
            pruned = self.detected.len() - self.state.records.len(),
            "records pruned"
        );
        Ok(())
    }

    /// Move from `expected` to `next`, refusing to run a phase out of order
    fn enter_phase(&mut self, expected: Phase, next: Phase, phase: &'static str) -> Result<()> {
        if self.phase != expected {
            return Err(EvolutionError::PhaseOrder {
                phase,
                state: self.phase.name(),
            });
        }
        self.phase = next;
        Ok(())
    }

    fn ensure_categorized(&self) -> Result<()> {
        if self.is_categorized() {
            Ok(())
        } else {
            Err(EvolutionError::NotCategorized)
        }
    }

    fn check_disjoint(&self) -> Result<()> {
        let overlap = |id: &ElementId| EvolutionError::OverlappingColors {
            element_id: id.clone(),
        };
        let mut red = HashSet::new();
        for id in &self.state.red {
            if !red.insert(id) || self.state.blue.contains(id) || self.state.green.contains(id) {
                return Err(overlap(id));
            }
        }
        match self.state.blue.intersection(&self.state.green).next() {
            Some(id) => Err(overlap(id)),
            None => Ok(()),
        }
    }

    /// Labelled class, content container, or attribute inside an attribute container
    pub(crate) fn is_significant(&self, id: &ElementId) -> bool {
        self.new.get(id).is_some_and(|element| match &element.kind {
            ElementKind::ContentContainer(_) => true,
            ElementKind::Class(class) => class.element_name.is_some(),
            ElementKind::Attribute(attribute) => attribute.container.is_some(),
            _ => false,
        })
    }

    pub(crate) fn is_significant_or_group(&self, id: &ElementId) -> bool {
        self.state.group_nodes.contains(id) || self.is_significant(id)
    }

    fn is_red(&self, id: &ElementId) -> bool {
        self.state.red_index.contains(id)
    }

    fn node_color(&self, id: &ElementId) -> Option<NodeColor> {
        if self.is_red(id) {
            Some(NodeColor::Red)
        } else if self.state.blue.contains(id) {
            Some(NodeColor::Blue)
        } else if self.state.green.contains(id) {
            Some(NodeColor::Green)
        } else {
            None
        }
    }
}

impl std::fmt::Debug for ChangeSet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSet")
            .field("old", &self.old.version())
            .field("new", &self.new.version())
            .field("phase", &self.phase)
            .field("detected", &self.detected.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Multiplicity, PsmAttribute, PsmClass};
    use crate::store::ModelStore;

    fn store() -> ModelStore {
        let mut store = ModelStore::new("Shop");
        let v1 = store.latest();
        let snapshot = store.snapshot_mut(v1).unwrap();
        let shop = snapshot.add_root_class("shop", PsmClass::new("Shop").with_element_name("shop"));
        snapshot
            .add_class_under(&shop, "item", PsmClass::new("Item").with_element_name("item"), Multiplicity::MANY)
            .unwrap();
        let v2 = store.branch(v1, "edited").unwrap();
        store
            .snapshot_mut(v2)
            .unwrap()
            .add_attribute(&ElementId::from("item"), "price", PsmAttribute::new("price"))
            .unwrap();
        store
    }

    #[test]
    fn test_phase_out_of_order_is_rejected() {
        let store = store();
        let registry = ChangeRegistry::new();
        let mut change_set =
            ChangeSet::new(&store, &registry, VersionId::INITIAL, store.latest(), Vec::new());

        let err = change_set.color().unwrap_err();
        assert_eq!(
            err,
            EvolutionError::PhaseOrder {
                phase: "color",
                state: "collected",
            }
        );
    }

    #[test]
    fn test_queries_require_categorize() {
        let store = store();
        let registry = ChangeRegistry::new();
        let change_set =
            ChangeSet::detect(&store, &registry, VersionId::INITIAL, store.latest()).unwrap();

        let err = change_set.get_state(&ElementId::from("item")).unwrap_err();
        assert_eq!(err, EvolutionError::NotCategorized);
    }

    #[test]
    fn test_overlap_is_detected() {
        let store = store();
        let registry = ChangeRegistry::new();
        let mut change_set =
            ChangeSet::new(&store, &registry, VersionId::INITIAL, store.latest(), Vec::new());
        change_set.state.push_red(&ElementId::from("item"));
        change_set.state.green.insert(ElementId::from("item"));

        assert_eq!(
            change_set.check_disjoint().unwrap_err().code(),
            "ERR_OVERLAPPING_COLORS"
        );
    }

    #[test]
    fn test_deep_chain_lists_each_red_node_once() {
        let mut store = ModelStore::new("Chain");
        let v1 = store.latest();
        let snapshot = store.snapshot_mut(v1).unwrap();
        let mut owner = snapshot.add_root_class("c0", PsmClass::new("C0").with_element_name("c0"));
        for n in 1..300 {
            let id = ElementId::from_string(format!("c{n}"));
            let class = PsmClass::new(format!("C{n}")).with_element_name(format!("c{n}"));
            snapshot
                .add_class_under(&owner, id.clone(), class, Multiplicity::ONE)
                .unwrap();
            owner = id;
        }
        let v2 = store.branch(v1, "edited").unwrap();
        store
            .snapshot_mut(v2)
            .unwrap()
            .add_attribute(&owner, "leaf", PsmAttribute::new("leaf"))
            .unwrap();
        let registry = ChangeRegistry::new();
        let mut change_set = ChangeSet::detect(&store, &registry, v1, v2).unwrap();

        change_set.categorize().unwrap();
        change_set.categorize().unwrap();

        assert_eq!(change_set.red_nodes().unwrap(), &[owner.clone()]);
        assert_eq!(change_set.blue_nodes().unwrap().len(), 299);
        assert_eq!(change_set.color_of(&owner).unwrap(), Some(NodeColor::Red));
        assert!(change_set.check_disjoint().is_ok());
    }

    #[test]
    fn test_added_attribute_makes_owner_red() {
        let store = store();
        let registry = ChangeRegistry::new();
        let mut change_set =
            ChangeSet::detect(&store, &registry, VersionId::INITIAL, store.latest()).unwrap();
        change_set.categorize().unwrap();

        let item = ElementId::from("item");
        assert_eq!(change_set.color_of(&item).unwrap(), Some(NodeColor::Red));
        assert_eq!(
            change_set.color_of(&ElementId::from("shop")).unwrap(),
            Some(NodeColor::Blue)
        );
        assert!(change_set.attributes_invalidated(&item).unwrap());
        assert!(!change_set.content_invalidated(&item).unwrap());
    }
}
