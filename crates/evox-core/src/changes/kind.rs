use serde::{Deserialize, Serialize};

use crate::model::ElementKind;

/// Node kinds a change can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeScope {
    Diagram,
    Class,
    ClassUnion,
    Association,
    ContentContainer,
    ContentChoice,
    AttributeContainer,
    Attribute,
}

impl ChangeScope {
    pub const ALL: [ChangeScope; 8] = [
        ChangeScope::Diagram,
        ChangeScope::Class,
        ChangeScope::ClassUnion,
        ChangeScope::Association,
        ChangeScope::ContentContainer,
        ChangeScope::ContentChoice,
        ChangeScope::AttributeContainer,
        ChangeScope::Attribute,
    ];

    /// Scope the driver pushes when it visits an element of this kind
    pub fn of(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Class(_) => ChangeScope::Class,
            ElementKind::ClassUnion(_) => ChangeScope::ClassUnion,
            ElementKind::Association(_) => ChangeScope::Association,
            ElementKind::ContentContainer(_) => ChangeScope::ContentContainer,
            ElementKind::ContentChoice(_) => ChangeScope::ContentChoice,
            ElementKind::AttributeContainer(_) => ChangeScope::AttributeContainer,
            ElementKind::Attribute(_) => ChangeScope::Attribute,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EditType {
    /// Node exists only in the new version
    Addition,
    /// Node exists only in the old version
    Removal,
    /// Node changed its structural position
    Migratory,
    /// In-place edit
    Sedentary,
}

impl EditType {
    /// Detectors of this edit type compare against the old counterpart of
    /// the visited element, so they only run when it exists
    pub fn requires_old_counterpart(self) -> bool {
        !matches!(self, EditType::Addition)
    }

    /// Addition and Removal delimit a node's lifetime
    pub fn is_lifecycle(self) -> bool {
        matches!(self, EditType::Addition | EditType::Removal)
    }
}

/// Every concrete change the registry can detect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeKind {
    DiagramRenamed,
    RootClassRemoved,

    ClassAdded,
    ClassMoved,
    ClassRenamed,
    ClassElementNameChanged,
    RepresentedClassChanged,
    AllowAnyAttributeChanged,

    ComponentRemoved,
    ComponentsReordered,

    ClassUnionAdded,
    ClassUnionMoved,

    AssociationAdded,
    AssociationMoved,
    AssociationRenamed,
    AssociationMultiplicityChanged,

    ContentContainerAdded,
    ContentContainerMoved,
    ContentContainerRenamed,

    ContentChoiceAdded,
    ContentChoiceMoved,

    AttributeContainerAdded,
    AttributeContainerMoved,

    AttributeRemoved,
    AttributesReordered,
    AttributeAdded,
    AttributeMoved,
    AttributeRenamed,
    AttributeAliasChanged,
    AttributeTypeChanged,
    AttributeDefaultValueChanged,
    AttributeMultiplicityChanged,
}

/// Resulting state of a node in the new version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    AsItWas,
    Added,
    Moved,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentChoice;

    #[test]
    fn test_only_additions_skip_old_counterpart() {
        assert!(!EditType::Addition.requires_old_counterpart());
        assert!(EditType::Removal.requires_old_counterpart());
        assert!(EditType::Migratory.requires_old_counterpart());
        assert!(EditType::Sedentary.requires_old_counterpart());
    }

    #[test]
    fn test_scope_of_element_kind() {
        let kind = ElementKind::ContentChoice(ContentChoice::default());
        assert_eq!(ChangeScope::of(&kind), ChangeScope::ContentChoice);
    }
}
