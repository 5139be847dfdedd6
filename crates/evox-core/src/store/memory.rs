use std::collections::{BTreeMap, HashMap};

use evox_core_types::{ElementId, VersionId};

use super::VersionedStore;
use crate::errors::{EvolutionError, Result};
use crate::model::{
    Association, ClassUnion, Diagram, Element, ElementKind, Multiplicity, PsmAttribute, PsmClass,
    VersionInfo,
};

/// One immutable-by-contract version of the model
///
/// The editing helpers exist to build fixtures before analysis starts; the
/// analysis itself only reads snapshots through [`VersionedStore`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub info: VersionInfo,
    pub diagram: Diagram,
    pub(crate) elements: HashMap<ElementId, Element>,
}

impl Snapshot {
    fn new(info: VersionInfo, diagram: Diagram) -> Self {
        Self {
            info,
            diagram,
            elements: HashMap::new(),
        }
    }

    /// Get an element by ID
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Get a mutable reference to an element by ID
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if the element is not part of this snapshot.
    pub fn get_mut(&mut self, id: &ElementId) -> Result<&mut Element> {
        let version = self.info.id;
        self.elements
            .get_mut(id)
            .ok_or_else(|| EvolutionError::ElementNotFound {
                element_id: id.clone(),
                version,
            })
    }

    /// Number of elements in this snapshot
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Insert an element without linking it to a parent
    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.id.clone(), element);
    }

    /// Add a class as a new diagram root
    pub fn add_root_class(&mut self, id: impl Into<ElementId>, class: PsmClass) -> ElementId {
        let id = id.into();
        self.diagram.roots.push(id.clone());
        self.insert(Element::new(id.clone(), None, ElementKind::Class(class)));
        id
    }

    /// Add a class below `owner` through a new association
    ///
    /// The association gets the id `<class id>.assoc`, which is returned.
    ///
    /// # Errors
    ///
    /// `ElementNotFound` / `InvalidOwner` if `owner` cannot hold components.
    pub fn add_class_under(
        &mut self,
        owner: &ElementId,
        id: impl Into<ElementId>,
        class: PsmClass,
        multiplicity: Multiplicity,
    ) -> Result<ElementId> {
        let id = id.into();
        let association_id = Self::association_id(&id);
        self.attach_association(owner, &association_id, &id, multiplicity)?;
        self.insert(Element::new(
            id,
            Some(association_id.clone()),
            ElementKind::Class(class),
        ));
        Ok(association_id)
    }

    /// Add an empty class union below `owner` through a new association
    ///
    /// # Errors
    ///
    /// `ElementNotFound` / `InvalidOwner` if `owner` cannot hold components.
    pub fn add_union_under(
        &mut self,
        owner: &ElementId,
        id: impl Into<ElementId>,
        multiplicity: Multiplicity,
    ) -> Result<ElementId> {
        let id = id.into();
        let association_id = Self::association_id(&id);
        self.attach_association(owner, &association_id, &id, multiplicity)?;
        self.insert(Element::new(
            id,
            Some(association_id.clone()),
            ElementKind::ClassUnion(ClassUnion::default()),
        ));
        Ok(association_id)
    }

    /// Add a content container, content choice or attribute container to `owner`
    ///
    /// # Errors
    ///
    /// `ElementNotFound` / `InvalidOwner` if `owner` cannot hold components.
    pub fn add_component(
        &mut self,
        owner: &ElementId,
        id: impl Into<ElementId>,
        kind: ElementKind,
    ) -> Result<ElementId> {
        let id = id.into();
        self.insert(Element::new(id.clone(), None, kind));
        self.attach_or_discard(&id, owner)?;
        Ok(id)
    }

    /// Add an attribute to a class or attribute container
    ///
    /// # Errors
    ///
    /// `ElementNotFound` / `InvalidOwner` if `owner` cannot hold attributes.
    pub fn add_attribute(
        &mut self,
        owner: &ElementId,
        id: impl Into<ElementId>,
        attribute: PsmAttribute,
    ) -> Result<ElementId> {
        let id = id.into();
        self.insert(Element::new(
            id.clone(),
            None,
            ElementKind::Attribute(attribute),
        ));
        self.attach_or_discard(&id, owner)?;
        Ok(id)
    }

    /// Move an element (with its subtree) under a new owner
    ///
    /// # Errors
    ///
    /// `ElementNotFound` / `InvalidOwner` if either end cannot be resolved.
    pub fn move_to(&mut self, id: &ElementId, new_owner: &ElementId) -> Result<()> {
        self.detach(id)?;
        self.attach(id, new_owner)
    }

    /// Unlink an element from its parent (or from the diagram roots)
    ///
    /// # Errors
    ///
    /// `ElementNotFound` if the element is unknown.
    pub fn detach(&mut self, id: &ElementId) -> Result<()> {
        let parent = self.get_mut(id)?.parent.take();
        match parent {
            Some(parent_id) => {
                let parent = self.get_mut(&parent_id)?;
                if let Some(components) = parent.components_mut() {
                    components.retain(|c| c != id);
                }
                if let Some(attributes) = parent.attributes_mut() {
                    attributes.retain(|a| a != id);
                }
            }
            None => self.diagram.roots.retain(|r| r != id),
        }
        Ok(())
    }

    /// Remove an element and everything below it
    ///
    /// # Errors
    ///
    /// `ElementNotFound` if the element is unknown.
    pub fn remove_subtree(&mut self, id: &ElementId) -> Result<()> {
        self.detach(id)?;
        let mut pending = vec![id.clone()];
        while let Some(current) = pending.pop() {
            if let Some(element) = self.elements.remove(&current) {
                pending.extend(element.children().into_iter().cloned());
            }
        }
        Ok(())
    }

    fn association_id(child: &ElementId) -> ElementId {
        ElementId::from_string(format!("{}.assoc", child))
    }

    fn attach_association(
        &mut self,
        owner: &ElementId,
        association_id: &ElementId,
        child: &ElementId,
        multiplicity: Multiplicity,
    ) -> Result<()> {
        self.insert(Element::new(
            association_id.clone(),
            None,
            ElementKind::Association(Association {
                name: None,
                child: child.clone(),
                multiplicity,
            }),
        ));
        self.attach_or_discard(association_id, owner)
    }

    fn attach_or_discard(&mut self, id: &ElementId, owner_id: &ElementId) -> Result<()> {
        let attached = self.attach(id, owner_id);
        if attached.is_err() {
            self.elements.remove(id);
        }
        attached
    }

    fn attach(&mut self, id: &ElementId, owner_id: &ElementId) -> Result<()> {
        let is_attribute = matches!(self.get_mut(id)?.kind, ElementKind::Attribute(_));
        let is_association = matches!(self.get_mut(id)?.kind, ElementKind::Association(_));
        let invalid = || EvolutionError::InvalidOwner {
            element_id: id.clone(),
            owner_id: owner_id.clone(),
        };

        let owner = self.get_mut(owner_id)?;
        let owner_is_container = matches!(owner.kind, ElementKind::AttributeContainer(_));
        let owner_is_union = matches!(owner.kind, ElementKind::ClassUnion(_));
        if is_attribute {
            owner.attributes_mut().ok_or_else(invalid)?.push(id.clone());
        } else if owner_is_union && !is_association {
            return Err(invalid());
        } else {
            owner.components_mut().ok_or_else(invalid)?.push(id.clone());
        }

        let element = self.get_mut(id)?;
        element.parent = Some(owner_id.clone());
        if let ElementKind::Attribute(attribute) = &mut element.kind {
            attribute.container = owner_is_container.then(|| owner_id.clone());
        }
        Ok(())
    }
}

/// In-memory versioned model store
///
/// Holds one [`Snapshot`] per version. Not thread-safe (no Arc/RwLock);
/// designed for the single-threaded analysis pass.
#[derive(Debug, Clone)]
pub struct ModelStore {
    snapshots: BTreeMap<VersionId, Snapshot>,
}

impl ModelStore {
    /// Create a store holding an empty initial version
    pub fn new(diagram_name: impl Into<String>) -> Self {
        Self::with_diagram(ElementId::new(), diagram_name)
    }

    /// Create a store whose diagram has a fixed id
    pub fn with_diagram(diagram_id: ElementId, diagram_name: impl Into<String>) -> Self {
        let info = VersionInfo::new(VersionId::INITIAL, "initial");
        let mut snapshots = BTreeMap::new();
        snapshots.insert(
            VersionId::INITIAL,
            Snapshot::new(info, Diagram::new(diagram_id, diagram_name)),
        );
        Self { snapshots }
    }

    /// The most recent version
    pub fn latest(&self) -> VersionId {
        self.snapshots
            .keys()
            .next_back()
            .copied()
            .unwrap_or(VersionId::INITIAL)
    }

    /// Create a new version as a copy of `from`
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `from` does not exist.
    pub fn branch(&mut self, from: VersionId, label: impl Into<String>) -> Result<VersionId> {
        let mut snapshot = self.snapshot(from)?.clone();
        let id = self.latest().next();
        snapshot.info = VersionInfo::new(id, label);
        self.snapshots.insert(id, snapshot);
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `VersionNotFound` if the version does not exist.
    pub fn snapshot(&self, version: VersionId) -> Result<&Snapshot> {
        self.snapshots
            .get(&version)
            .ok_or(EvolutionError::VersionNotFound { version })
    }

    /// # Errors
    ///
    /// Returns `VersionNotFound` if the version does not exist.
    pub fn snapshot_mut(&mut self, version: VersionId) -> Result<&mut Snapshot> {
        self.snapshots
            .get_mut(&version)
            .ok_or(EvolutionError::VersionNotFound { version })
    }

    /// All versions in ascending order
    pub fn versions(&self) -> impl Iterator<Item = &VersionInfo> {
        self.snapshots.values().map(|s| &s.info)
    }
}

impl VersionedStore for ModelStore {
    fn version_info(&self, version: VersionId) -> Option<&VersionInfo> {
        self.snapshots.get(&version).map(|s| &s.info)
    }

    fn diagram(&self, version: VersionId) -> Option<&Diagram> {
        self.snapshots.get(&version).map(|s| &s.diagram)
    }

    fn get_in_version(&self, element: &ElementId, version: VersionId) -> Option<&Element> {
        self.snapshots.get(&version)?.get(element)
    }
}
