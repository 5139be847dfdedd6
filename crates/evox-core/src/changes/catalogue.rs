//! Compile-time list of every change kind

use super::ChangeKind as K;
use super::EditType::{Addition, Migratory, Removal, Sedentary};
use super::{association, attribute, class, component, diagram};
use super::{ChangeKind, ChangeScope, EditType};
use crate::registry::{ChangeKindDescriptor, Detector};

const DIAGRAM: &[ChangeScope] = &[ChangeScope::Diagram];
const CLASS: &[ChangeScope] = &[ChangeScope::Class];
const CLASS_UNION: &[ChangeScope] = &[ChangeScope::ClassUnion];
const ASSOCIATION: &[ChangeScope] = &[ChangeScope::Association];
const CONTENT_CONTAINER: &[ChangeScope] = &[ChangeScope::ContentContainer];
const CONTENT_CHOICE: &[ChangeScope] = &[ChangeScope::ContentChoice];
const ATTRIBUTE_CONTAINER: &[ChangeScope] = &[ChangeScope::AttributeContainer];
const ATTRIBUTE: &[ChangeScope] = &[ChangeScope::Attribute];

/// Nodes with an ordered component list
const COMPONENT_OWNERS: &[ChangeScope] = &[
    ChangeScope::Class,
    ChangeScope::ClassUnion,
    ChangeScope::ContentContainer,
    ChangeScope::ContentChoice,
];

/// Component owners plus associations, whose child can disappear
const COMPONENT_REMOVAL: &[ChangeScope] = &[
    ChangeScope::Class,
    ChangeScope::ClassUnion,
    ChangeScope::ContentContainer,
    ChangeScope::ContentChoice,
    ChangeScope::Association,
];

const ATTRIBUTE_OWNERS: &[ChangeScope] = &[ChangeScope::Class, ChangeScope::AttributeContainer];

const fn kind(
    kind: ChangeKind,
    scopes: &'static [ChangeScope],
    edit_type: EditType,
    detect: Detector,
) -> ChangeKindDescriptor {
    ChangeKindDescriptor {
        kind,
        scopes,
        edit_type,
        may_require_revalidation: true,
        detect,
        resulting_state: None,
    }
}

const fn cosmetic(descriptor: ChangeKindDescriptor) -> ChangeKindDescriptor {
    ChangeKindDescriptor {
        may_require_revalidation: false,
        ..descriptor
    }
}

pub static CATALOGUE: &[ChangeKindDescriptor] = &[
    cosmetic(kind(K::DiagramRenamed, DIAGRAM, Sedentary, diagram::detect_renamed)),
    kind(K::RootClassRemoved, DIAGRAM, Removal, diagram::detect_root_removed),
    kind(K::ClassAdded, CLASS, Addition, class::detect_class_added),
    kind(K::ClassMoved, CLASS, Migratory, class::detect_class_moved),
    cosmetic(kind(K::ClassRenamed, CLASS, Sedentary, class::detect_class_renamed)),
    kind(K::ClassElementNameChanged, CLASS, Sedentary, class::detect_element_name_changed),
    kind(K::RepresentedClassChanged, CLASS, Sedentary, class::detect_represented_class_changed),
    kind(K::AllowAnyAttributeChanged, CLASS, Sedentary, class::detect_allow_any_attribute_changed),
    kind(K::ComponentRemoved, COMPONENT_REMOVAL, Removal, component::detect_component_removed),
    kind(K::ComponentsReordered, COMPONENT_OWNERS, Sedentary, component::detect_components_reordered),
    kind(K::ClassUnionAdded, CLASS_UNION, Addition, class::detect_union_added),
    kind(K::ClassUnionMoved, CLASS_UNION, Migratory, class::detect_union_moved),
    kind(K::AssociationAdded, ASSOCIATION, Addition, association::detect_added),
    kind(K::AssociationMoved, ASSOCIATION, Migratory, association::detect_moved),
    cosmetic(kind(K::AssociationRenamed, ASSOCIATION, Sedentary, association::detect_renamed)),
    kind(K::AssociationMultiplicityChanged, ASSOCIATION, Sedentary, association::detect_multiplicity_changed),
    kind(K::ContentContainerAdded, CONTENT_CONTAINER, Addition, component::detect_content_container_added),
    kind(K::ContentContainerMoved, CONTENT_CONTAINER, Migratory, component::detect_content_container_moved),
    kind(K::ContentContainerRenamed, CONTENT_CONTAINER, Sedentary, component::detect_content_container_renamed),
    kind(K::ContentChoiceAdded, CONTENT_CHOICE, Addition, component::detect_content_choice_added),
    kind(K::ContentChoiceMoved, CONTENT_CHOICE, Migratory, component::detect_content_choice_moved),
    kind(K::AttributeContainerAdded, ATTRIBUTE_CONTAINER, Addition, component::detect_attribute_container_added),
    kind(K::AttributeContainerMoved, ATTRIBUTE_CONTAINER, Migratory, component::detect_attribute_container_moved),
    kind(K::AttributeRemoved, ATTRIBUTE_OWNERS, Removal, attribute::detect_removed),
    kind(K::AttributesReordered, ATTRIBUTE_CONTAINER, Sedentary, attribute::detect_reordered),
    kind(K::AttributeAdded, ATTRIBUTE, Addition, attribute::detect_added),
    ChangeKindDescriptor {
        resulting_state: Some(attribute::moved_resulting_state),
        ..kind(K::AttributeMoved, ATTRIBUTE, Migratory, attribute::detect_moved)
    },
    kind(K::AttributeRenamed, ATTRIBUTE, Sedentary, attribute::detect_renamed),
    kind(K::AttributeAliasChanged, ATTRIBUTE, Sedentary, attribute::detect_alias_changed),
    kind(K::AttributeTypeChanged, ATTRIBUTE, Sedentary, attribute::detect_type_changed),
    kind(K::AttributeDefaultValueChanged, ATTRIBUTE, Sedentary, attribute::detect_default_value_changed),
    kind(K::AttributeMultiplicityChanged, ATTRIBUTE, Sedentary, attribute::detect_multiplicity_changed),
];
