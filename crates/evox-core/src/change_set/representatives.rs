use std::collections::{BTreeMap, BTreeSet};

use evox_core_types::ElementId;

use super::{ChangeSet, NodeColor, Phase};
use crate::errors::Result;
use crate::store::ModelView;

/// Transitive closure of the structural-representative relation
///
/// `represents[r]` holds every class whose content `r` reuses, directly or
/// through a chain of representatives; `represented_by` is its inverse.
/// Cycles are cut where a chain revisits a class.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AliasRelation {
    represents: BTreeMap<ElementId, BTreeSet<ElementId>>,
    represented_by: BTreeMap<ElementId, BTreeSet<ElementId>>,
}

impl AliasRelation {
    /// # Errors
    ///
    /// Returns `DiagramNotFound` if the version carries no diagram.
    pub fn build(view: ModelView<'_>) -> Result<Self> {
        let mut relation = Self::default();
        for id in view.tree_nodes()? {
            let mut seen = BTreeSet::new();
            let mut next = view.represented_class(id);
            while let Some(represented) = next {
                if represented == id || !seen.insert(represented.clone()) {
                    break;
                }
                relation.insert(id, represented);
                next = view.represented_class(represented);
            }
        }
        Ok(relation)
    }

    fn insert(&mut self, representative: &ElementId, represented: &ElementId) {
        self.represents
            .entry(representative.clone())
            .or_default()
            .insert(represented.clone());
        self.represented_by
            .entry(represented.clone())
            .or_default()
            .insert(representative.clone());
    }

    /// Classes `representative` reuses, directly or transitively
    pub fn represents(&self, representative: &ElementId) -> impl Iterator<Item = &ElementId> {
        self.represents.get(representative).into_iter().flatten()
    }

    pub fn represented_by(&self, represented: &ElementId) -> impl Iterator<Item = &ElementId> {
        self.represented_by.get(represented).into_iter().flatten()
    }

    pub fn is_represented(&self, id: &ElementId) -> bool {
        self.represented_by.contains_key(id)
    }

    /// Every (representative, represented) pair in a stable order
    pub fn pairs(&self) -> impl Iterator<Item = (&ElementId, &ElementId)> {
        self.represents
            .iter()
            .flat_map(|(r, targets)| targets.iter().map(move |b| (r, b)))
    }

    pub fn is_empty(&self) -> bool {
        self.represents.is_empty()
    }
}

impl<'a> ChangeSet<'a> {
    /// Carry colors from represented classes over to their representatives
    ///
    /// Repeats until a full pass promotes nothing, so colors travel along
    /// representative chains of any length.
    pub(super) fn fix_up(&mut self) -> Result<()> {
        self.enter_phase(Phase::Colored, Phase::Categorized, "fix_up")?;
        let pairs: Vec<(ElementId, ElementId)> = self
            .state
            .aliases
            .pairs()
            .map(|(r, b)| (r.clone(), b.clone()))
            .collect();

        let mut passes = 0;
        loop {
            passes += 1;
            let mut promoted = false;
            for (representative, represented) in &pairs {
                promoted |= self.propagate(representative, represented);
            }
            if !promoted {
                break;
            }
        }
        tracing::debug!(pairs = pairs.len(), passes, "representatives fixed up");
        Ok(())
    }

    /// Promote the representative's anchors from the represented class's color
    ///
    /// The anchors are the nearest significant-or-group node and the nearest
    /// significant node, so an unlabelled group representing a class moves
    /// along with its labelled owner.
    fn propagate(&mut self, representative: &ElementId, represented: &ElementId) -> bool {
        let new = self.new;
        let sig_or_group = |id: &ElementId| self.is_significant_or_group(id);
        let significant = |id: &ElementId| self.is_significant(id);

        let mut anchors: Vec<&ElementId> = Vec::with_capacity(2);
        for anchor in [
            new.nearest(representative, sig_or_group),
            new.nearest(representative, significant),
        ]
        .into_iter()
        .flatten()
        {
            if !anchors.contains(&anchor) {
                anchors.push(anchor);
            }
        }
        let source = new.nearest(represented, sig_or_group);
        let source_red = [source, new.nearest(represented, significant)]
            .into_iter()
            .flatten()
            .any(|id| self.is_red(id));
        let source_blue = source.is_some_and(|id| self.node_color(id) == Some(NodeColor::Blue));

        let mut promoted = false;
        for anchor in anchors {
            promoted |= self.promote(anchor, source_red, source_blue);
        }
        promoted
    }

    fn promote(&mut self, anchor: &ElementId, source_red: bool, source_blue: bool) -> bool {
        match self.node_color(anchor) {
            Some(NodeColor::Red) => false,
            _ if source_red => {
                self.state.blue.remove(anchor);
                self.state.green.remove(anchor);
                self.state.push_red(anchor);
                self.mark_ancestors(anchor);
                true
            }
            Some(NodeColor::Green) | None if source_blue => {
                self.state.green.remove(anchor);
                self.state.blue.insert(anchor.clone());
                self.mark_ancestors(anchor);
                true
            }
            _ => false,
        }
    }

    /// Strict ancestors of a promoted node become Blue unless Red
    fn mark_ancestors(&mut self, id: &ElementId) {
        for ancestor in self.new.ancestors_or_self(id).into_iter().skip(1) {
            if self.is_significant_or_group(ancestor) {
                if !self.is_red(ancestor) {
                    self.state.green.remove(ancestor);
                    self.state.blue.insert(ancestor.clone());
                }
            } else {
                self.state.insignificant_blue.insert(ancestor.clone());
            }
        }
    }
}
