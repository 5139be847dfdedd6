pub mod element;
pub mod multiplicity;
pub mod version;

pub use element::{
    Association, AttributeContainer, ClassUnion, ContentChoice, ContentContainer, Element,
    ElementKind, PsmAttribute, PsmClass,
};
pub use multiplicity::Multiplicity;
pub use version::{Diagram, VersionInfo};
