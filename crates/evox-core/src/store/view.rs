use std::collections::HashSet;

use evox_core_types::{ElementId, VersionId};

use super::VersionedStore;
use crate::errors::{EvolutionError, Result};
use crate::model::{Diagram, Element, ElementKind};

/// A store pinned to one version, with tree navigation
#[derive(Clone, Copy)]
pub struct ModelView<'a> {
    store: &'a dyn VersionedStore,
    version: VersionId,
}

impl<'a> ModelView<'a> {
    pub fn new(store: &'a dyn VersionedStore, version: VersionId) -> Self {
        Self { store, version }
    }

    pub fn version(&self) -> VersionId {
        self.version
    }

    pub fn store(&self) -> &'a dyn VersionedStore {
        self.store
    }

    /// Does the element exist in this version
    pub fn contains(&self, id: &ElementId) -> bool {
        self.store.exists_in_version(id, self.version)
    }

    pub fn get(&self, id: &ElementId) -> Option<&'a Element> {
        self.store.get_in_version(id, self.version)
    }

    /// # Errors
    ///
    /// Returns `ElementNotFound` if the element does not exist in this version.
    pub fn element(&self, id: &ElementId) -> Result<&'a Element> {
        self.get(id).ok_or_else(|| EvolutionError::ElementNotFound {
            element_id: id.clone(),
            version: self.version,
        })
    }

    /// # Errors
    ///
    /// Returns `DiagramNotFound` if the version carries no diagram.
    pub fn diagram(&self) -> Result<&'a Diagram> {
        self.store
            .diagram(self.version)
            .ok_or(EvolutionError::DiagramNotFound {
                version: self.version,
            })
    }

    pub fn parent(&self, id: &ElementId) -> Option<&'a ElementId> {
        self.get(id)?.parent.as_ref()
    }

    /// Children in traversal order; empty for unknown elements
    pub fn children(&self, id: &ElementId) -> Vec<&'a ElementId> {
        self.get(id).map(|e| e.children()).unwrap_or_default()
    }

    /// The element followed by its ancestors up to the root
    pub fn ancestors_or_self(&self, id: &ElementId) -> Vec<&'a ElementId> {
        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        let mut current = self.get(id);
        while let Some(element) = current {
            // a malformed snapshot could link back to a node already on the path
            if !on_path.insert(&element.id) {
                break;
            }
            path.push(&element.id);
            current = element.parent.as_ref().and_then(|p| self.get(p));
        }
        path
    }

    /// Nearest ancestor-or-self satisfying `predicate`
    pub fn nearest(
        &self,
        id: &ElementId,
        predicate: impl Fn(&ElementId) -> bool,
    ) -> Option<&'a ElementId> {
        self.ancestors_or_self(id)
            .into_iter()
            .find(|candidate| predicate(candidate))
    }

    /// Owner of an element, looking through the association above a class
    pub fn structural_parent(&self, id: &ElementId) -> Option<&'a ElementId> {
        let parent = self.parent(id)?;
        match self.get(parent).map(|p| &p.kind) {
            Some(ElementKind::Association(_)) => self.parent(parent),
            _ => Some(parent),
        }
    }

    pub fn is_root_class(&self, id: &ElementId) -> bool {
        self.get(id)
            .map(|e| e.as_class().is_some() && e.parent.is_none())
            .unwrap_or(false)
    }

    pub fn has_label(&self, id: &ElementId) -> bool {
        self.get(id).map(Element::has_label).unwrap_or(false)
    }

    /// Class represented by `id`, if `id` is a structural representative
    pub fn represented_class(&self, id: &ElementId) -> Option<&'a ElementId> {
        self.get(id)?.as_class()?.represented_class.as_ref()
    }

    /// Every node reachable from the diagram roots, in depth-first pre-order
    ///
    /// # Errors
    ///
    /// Returns `DiagramNotFound` if the version carries no diagram.
    pub fn tree_nodes(&self) -> Result<Vec<&'a ElementId>> {
        let mut nodes = Vec::new();
        let mut seen = HashSet::new();
        let mut pending: Vec<&'a ElementId> = self.diagram()?.roots.iter().rev().collect();
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            nodes.push(id);
            pending.extend(self.children(id).into_iter().rev());
        }
        Ok(nodes)
    }
}
