use evox_core_types::ElementId;
use serde::{Deserialize, Serialize};

use super::multiplicity::Multiplicity;

/// A node of the PSM tree as it exists in one version
///
/// The same logical node carries the same `id` in every version; its
/// `parent` and `kind` payload may differ between snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    /// Tree parent (None for root classes)
    pub parent: Option<ElementId>,
    pub kind: ElementKind,
}

/// Closed set of PSM node kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Class(PsmClass),
    ClassUnion(ClassUnion),
    Association(Association),
    ContentContainer(ContentContainer),
    ContentChoice(ContentChoice),
    AttributeContainer(AttributeContainer),
    Attribute(PsmAttribute),
}

/// PSM class
///
/// A class with an `element_name` emits an XML element; without one its
/// attributes and content are merged into whatever includes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsmClass {
    pub name: String,
    pub element_name: Option<String>,
    /// XML attributes (attributes placed directly in the class)
    pub attributes: Vec<ElementId>,
    /// Associations, content containers, content choices and attribute containers
    pub components: Vec<ElementId>,
    /// Class whose content and attributes this class reuses
    pub represented_class: Option<ElementId>,
    pub allow_any_attribute: bool,
}

impl PsmClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_name: None,
            attributes: Vec::new(),
            components: Vec::new(),
            represented_class: None,
            allow_any_attribute: false,
        }
    }

    pub fn with_element_name(mut self, element_name: impl Into<String>) -> Self {
        self.element_name = Some(element_name.into());
        self
    }

    pub fn representing(mut self, represented: ElementId) -> Self {
        self.represented_class = Some(represented);
        self
    }

    pub fn is_structural_representative(&self) -> bool {
        self.represented_class.is_some()
    }
}

/// Union of alternative classes reached through one association
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassUnion {
    /// Associations leading to the alternatives
    pub components: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub name: Option<String>,
    /// Class or class union below this association
    pub child: ElementId,
    pub multiplicity: Multiplicity,
}

/// Wrapper element around a group of subordinate components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentContainer {
    pub name: String,
    pub components: Vec<ElementId>,
}

/// Choice between subordinate components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentChoice {
    pub components: Vec<ElementId>,
}

/// Holder turning its attributes into XML elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeContainer {
    pub attributes: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsmAttribute {
    pub name: String,
    pub alias: Option<String>,
    pub type_name: Option<String>,
    pub multiplicity: Multiplicity,
    pub default_value: Option<String>,
    /// Owning attribute container, None when the attribute sits in its class
    pub container: Option<ElementId>,
}

impl PsmAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            type_name: None,
            multiplicity: Multiplicity::ONE,
            default_value: None,
            container: None,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    /// Name used in the generated schema
    pub fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Attributes inside a container are emitted as elements
    pub fn is_xml_attribute(&self) -> bool {
        self.container.is_none()
    }
}

impl Element {
    pub fn new(id: ElementId, parent: Option<ElementId>, kind: ElementKind) -> Self {
        Self { id, parent, kind }
    }

    pub fn as_class(&self) -> Option<&PsmClass> {
        match &self.kind {
            ElementKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_association(&self) -> Option<&Association> {
        match &self.kind {
            ElementKind::Association(association) => Some(association),
            _ => None,
        }
    }

    pub fn as_attribute(&self) -> Option<&PsmAttribute> {
        match &self.kind {
            ElementKind::Attribute(attribute) => Some(attribute),
            _ => None,
        }
    }

    /// Ordered subordinate components, empty for kinds that have none
    pub fn components(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Class(c) => &c.components,
            ElementKind::ClassUnion(u) => &u.components,
            ElementKind::ContentContainer(c) => &c.components,
            ElementKind::ContentChoice(c) => &c.components,
            _ => &[],
        }
    }

    pub(crate) fn components_mut(&mut self) -> Option<&mut Vec<ElementId>> {
        match &mut self.kind {
            ElementKind::Class(c) => Some(&mut c.components),
            ElementKind::ClassUnion(u) => Some(&mut u.components),
            ElementKind::ContentContainer(c) => Some(&mut c.components),
            ElementKind::ContentChoice(c) => Some(&mut c.components),
            _ => None,
        }
    }

    /// Ordered attributes of a class or attribute container
    pub fn attributes(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Class(c) => &c.attributes,
            ElementKind::AttributeContainer(c) => &c.attributes,
            _ => &[],
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> Option<&mut Vec<ElementId>> {
        match &mut self.kind {
            ElementKind::Class(c) => Some(&mut c.attributes),
            ElementKind::AttributeContainer(c) => Some(&mut c.attributes),
            _ => None,
        }
    }

    /// Children in traversal order
    ///
    /// Class: attributes then components. Association: its child.
    /// Everything else: its components or attributes.
    pub fn children(&self) -> Vec<&ElementId> {
        match &self.kind {
            ElementKind::Class(c) => c.attributes.iter().chain(c.components.iter()).collect(),
            ElementKind::Association(a) => vec![&a.child],
            ElementKind::AttributeContainer(c) => c.attributes.iter().collect(),
            ElementKind::Attribute(_) => Vec::new(),
            _ => self.components().iter().collect(),
        }
    }

    /// Class carrying an element label
    pub fn has_label(&self) -> bool {
        self.as_class()
            .map(|c| c.element_name.is_some())
            .unwrap_or(false)
    }
}
