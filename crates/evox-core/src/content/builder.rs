use evox_core_types::ElementId;

use super::ContentItem;
use crate::errors::Result;
use crate::model::{Association, ElementKind, Multiplicity};
use crate::store::ModelView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facet {
    Content,
    Attributes,
}

/// Element content of `node`'s fragment
///
/// # Errors
///
/// Returns `ElementNotFound` if a referenced child is missing from the view.
pub fn content_of(view: ModelView<'_>, node: &ElementId) -> Result<Vec<ContentItem>> {
    Builder::new(view).expand(node, Facet::Content)
}

/// XML attributes of `node`'s fragment, including those merged from
/// unlabelled classes and represented classes
///
/// # Errors
///
/// Returns `ElementNotFound` if a referenced child is missing from the view.
pub fn attributes_of(view: ModelView<'_>, node: &ElementId) -> Result<Vec<ContentItem>> {
    Builder::new(view).expand(node, Facet::Attributes)
}

struct Builder<'a> {
    view: ModelView<'a>,
    /// Classes currently being inlined; a represented class already on this
    /// stack is emitted as an empty alias
    expanding: Vec<ElementId>,
}

impl<'a> Builder<'a> {
    fn new(view: ModelView<'a>) -> Self {
        Self {
            view,
            expanding: Vec::new(),
        }
    }

    fn expand(&mut self, node: &ElementId, facet: Facet) -> Result<Vec<ContentItem>> {
        let element = self.view.element(node)?;
        let mut items = Vec::new();

        if let Some(represented) = element.as_class().and_then(|c| c.represented_class.as_ref()) {
            items.push(self.alias(node, represented, facet)?);
        }
        if facet == Facet::Attributes {
            if let ElementKind::Class(class) = &element.kind {
                for attribute in &class.attributes {
                    items.push(self.simple(attribute, None)?);
                }
            }
        }
        for component in element.components() {
            items.extend(self.component(component, facet)?);
        }
        Ok(items)
    }

    fn alias(
        &mut self,
        representative: &ElementId,
        represented: &ElementId,
        facet: Facet,
    ) -> Result<ContentItem> {
        let items = if self.expanding.contains(represented) || !self.view.contains(represented) {
            Vec::new()
        } else {
            self.expanding.push(represented.clone());
            let items = self.expand(represented, facet);
            self.expanding.pop();
            items?
        };
        Ok(ContentItem::AliasInlined {
            representative: representative.clone(),
            represented: represented.clone(),
            items,
        })
    }

    fn simple(&self, id: &ElementId, via: Option<&Association>) -> Result<ContentItem> {
        let element = self.view.element(id)?;
        let multiplicity = match (via, element.as_attribute()) {
            (Some(association), _) => association.multiplicity,
            (None, Some(attribute)) => attribute.multiplicity,
            (None, None) => Multiplicity::ONE,
        };
        Ok(ContentItem::Simple {
            element: id.clone(),
            via: via.and(element.parent.clone()),
            multiplicity,
        })
    }

    fn component(&mut self, id: &ElementId, facet: Facet) -> Result<Vec<ContentItem>> {
        let element = self.view.element(id)?;
        let items = match (&element.kind, facet) {
            (ElementKind::Association(association), _) => {
                self.through_association(id, association, facet)?
            }
            (ElementKind::ContentContainer(_), Facet::Content) => vec![self.simple(id, None)?],
            (ElementKind::ContentChoice(choice), _) => {
                let mut options = Vec::new();
                for option in &choice.components {
                    options.push(self.component(option, facet)?);
                }
                self.choice(id, None, Multiplicity::ONE, options, facet)
            }
            (ElementKind::AttributeContainer(container), Facet::Content) => {
                let mut items = Vec::new();
                for attribute in &container.attributes {
                    items.push(self.simple(attribute, None)?);
                }
                items
            }
            _ => Vec::new(),
        };
        Ok(items)
    }

    fn through_association(
        &mut self,
        association_id: &ElementId,
        association: &Association,
        facet: Facet,
    ) -> Result<Vec<ContentItem>> {
        let child_id = &association.child;
        let child = self.view.element(child_id)?;
        let via = Some(association_id.clone());
        let multiplicity = association.multiplicity;

        let items = match &child.kind {
            ElementKind::Class(class) if class.element_name.is_some() => match facet {
                Facet::Content => vec![self.simple(child_id, Some(association))?],
                Facet::Attributes => Vec::new(),
            },
            ElementKind::Class(_) => {
                let items = self.expand(child_id, facet)?;
                if facet == Facet::Attributes && items.is_empty() {
                    Vec::new()
                } else {
                    vec![ContentItem::Group {
                        containing: child_id.clone(),
                        via,
                        multiplicity,
                        items,
                    }]
                }
            }
            ElementKind::ClassUnion(union) => {
                let mut options = Vec::new();
                for alternative in &union.components {
                    options.push(self.component(alternative, facet)?);
                }
                self.choice(child_id, via, multiplicity, options, facet)
            }
            _ => Vec::new(),
        };
        Ok(items)
    }

    /// Attribute choices with nothing in any alternative are dropped
    fn choice(
        &self,
        id: &ElementId,
        via: Option<ElementId>,
        multiplicity: Multiplicity,
        options: Vec<Vec<ContentItem>>,
        facet: Facet,
    ) -> Vec<ContentItem> {
        if facet == Facet::Attributes && options.iter().all(Vec::is_empty) {
            return Vec::new();
        }
        vec![ContentItem::Choice {
            choice: id.clone(),
            via,
            multiplicity,
            options,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::leaf_elements;
    use crate::model::{ContentChoice, PsmAttribute, PsmClass};
    use crate::store::ModelStore;
    use evox_core_types::VersionId;

    fn names(items: &[ContentItem]) -> Vec<&str> {
        leaf_elements(items).iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn test_unlabelled_child_becomes_group() {
        let mut store = ModelStore::new("Contacts");
        let snapshot = store.snapshot_mut(VersionId::INITIAL).unwrap();
        let person = snapshot.add_root_class("person", PsmClass::new("Person").with_element_name("person"));
        snapshot
            .add_class_under(&person, "address", PsmClass::new("Address"), Multiplicity::ONE)
            .unwrap();
        let address = ElementId::from("address");
        snapshot
            .add_class_under(&address, "street", PsmClass::new("Street").with_element_name("street"), Multiplicity::MANY)
            .unwrap();
        snapshot
            .add_attribute(&address, "zip", PsmAttribute::new("zip"))
            .unwrap();

        let view = ModelView::new(&store, VersionId::INITIAL);
        let content = content_of(view, &person).unwrap();
        assert!(matches!(&content[0], ContentItem::Group { containing, .. } if containing == &address));
        assert_eq!(names(&content), vec!["street"]);
        assert!(content[0].children()[0].is_optional());

        let attributes = attributes_of(view, &person).unwrap();
        assert_eq!(names(&attributes), vec!["zip"]);
    }

    #[test]
    fn test_optional_association_on_the_path() {
        let mut store = ModelStore::new("Contacts");
        let snapshot = store.snapshot_mut(VersionId::INITIAL).unwrap();
        let person = snapshot.add_root_class("person", PsmClass::new("Person").with_element_name("person"));
        snapshot
            .add_class_under(&person, "address", PsmClass::new("Address"), Multiplicity::OPTIONAL)
            .unwrap();
        let address = ElementId::from("address");
        snapshot
            .add_class_under(&address, "street", PsmClass::new("Street").with_element_name("street"), Multiplicity::ONE)
            .unwrap();

        let view = ModelView::new(&store, VersionId::INITIAL);
        let content = content_of(view, &person).unwrap();
        let street = content[0].children()[0];

        assert!(!street.is_optional());
        assert!(street.is_optional_in(&view, &person).unwrap());
        assert!(!street.is_optional_in(&view, &address).unwrap());
    }

    #[test]
    fn test_optional_in_follows_representative() {
        let mut store = ModelStore::new("Catalog");
        let snapshot = store.snapshot_mut(VersionId::INITIAL).unwrap();
        let catalog = snapshot.add_root_class("catalog", PsmClass::new("Catalog").with_element_name("catalog"));
        snapshot
            .add_class_under(&catalog, "item", PsmClass::new("Item").with_element_name("item"), Multiplicity::OPTIONAL)
            .unwrap();
        let item = ElementId::from("item");
        snapshot
            .add_class_under(&item, "price", PsmClass::new("Price").with_element_name("price"), Multiplicity::ONE)
            .unwrap();
        let line = snapshot.add_root_class(
            "line",
            PsmClass::new("Line").with_element_name("line").representing(item.clone()),
        );

        let view = ModelView::new(&store, VersionId::INITIAL);
        let content = content_of(view, &line).unwrap();
        let price = match &content[..] {
            [ContentItem::AliasInlined { items, .. }] => &items[0],
            other => panic!("unexpected content {:?}", other),
        };

        assert_eq!(price.element().as_str(), "price");
        assert!(!price.is_optional());
        assert!(!price.is_optional_in(&view, &line).unwrap());
        assert!(price.is_optional_in(&view, &catalog).unwrap());
    }

    #[test]
    fn test_representative_cycle_terminates() {
        let mut store = ModelStore::new("Loop");
        let snapshot = store.snapshot_mut(VersionId::INITIAL).unwrap();
        let a = snapshot.add_root_class(
            "a",
            PsmClass::new("A").with_element_name("a").representing(ElementId::from("b")),
        );
        let b = snapshot.add_root_class(
            "b",
            PsmClass::new("B").with_element_name("b").representing(a.clone()),
        );
        snapshot.add_attribute(&b, "code", PsmAttribute::new("code")).unwrap();

        let view = ModelView::new(&store, VersionId::INITIAL);
        let attributes = attributes_of(view, &a).unwrap();
        assert_eq!(names(&attributes), vec!["code"]);
    }

    #[test]
    fn test_content_choice_options() {
        let mut store = ModelStore::new("Payments");
        let snapshot = store.snapshot_mut(VersionId::INITIAL).unwrap();
        let payment = snapshot.add_root_class("payment", PsmClass::new("Payment").with_element_name("payment"));
        let choice = snapshot
            .add_component(&payment, "method", ElementKind::ContentChoice(ContentChoice::default()))
            .unwrap();
        for name in ["card", "cash"] {
            snapshot
                .add_class_under(&choice, name, PsmClass::new(name).with_element_name(name), Multiplicity::ONE)
                .unwrap();
        }

        let content = content_of(ModelView::new(&store, VersionId::INITIAL), &payment).unwrap();
        match &content[..] {
            [ContentItem::Choice { options, .. }] => assert_eq!(options.len(), 2),
            other => panic!("unexpected content {:?}", other),
        }
    }
}
