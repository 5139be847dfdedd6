use std::collections::{BTreeSet, HashSet};

use evox_core_types::ElementId;

use super::{ChangeSet, NodeColor};
use crate::changes::{ChangeRecord, EditType, MultiplicityChange, NodeState};
use crate::content::{attributes_of, content_of, ContentItem};
use crate::errors::Result;
use crate::model::ElementKind;

/// Which part of a fragment an invalidation query asks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Facet {
    Content,
    Attributes,
}

impl Facet {
    fn flagged_by(self, record: &ChangeRecord) -> bool {
        match self {
            Facet::Content => record.invalidates_content,
            Facet::Attributes => record.invalidates_attributes,
        }
    }
}

type Visited = HashSet<(ElementId, Facet)>;

impl<'a> ChangeSet<'a> {
    /// Resulting state of `id` in the new version
    ///
    /// A kind's resulting-state hook wins over the edit type of the records
    /// targeting the node; a node missing from the old version is Added even
    /// without a record.
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn get_state(&self, id: &ElementId) -> Result<NodeState> {
        self.ensure_categorized()?;
        let targeting = self.records_targeting(id);

        if let Some(state) = targeting
            .iter()
            .find_map(|r| self.registry.resulting_state(r, self.old, self.new))
        {
            return Ok(state);
        }
        if targeting.iter().any(|r| r.edit_type == EditType::Addition) {
            return Ok(NodeState::Added);
        }
        if targeting.iter().any(|r| r.edit_type == EditType::Migratory) {
            return Ok(NodeState::Moved);
        }
        if self.new.contains(id) && !self.old.contains(id) {
            return Ok(NodeState::Added);
        }
        Ok(NodeState::AsItWas)
    }

    /// Must the element content generated for `id` be rebuilt
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn content_invalidated(&self, id: &ElementId) -> Result<bool> {
        self.ensure_categorized()?;
        self.invalidated(id, Facet::Content, &mut Visited::new())
    }

    /// Must the attributes generated for `id` be rebuilt
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn attributes_invalidated(&self, id: &ElementId) -> Result<bool> {
        self.ensure_categorized()?;
        self.invalidated(id, Facet::Attributes, &mut Visited::new())
    }

    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn multiplicity_changed(&self, id: &ElementId) -> Result<bool> {
        Ok(self.get_multiplicity_change(id)?.is_some())
    }

    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn get_multiplicity_change(&self, id: &ElementId) -> Result<Option<MultiplicityChange>> {
        self.ensure_categorized()?;
        Ok(self
            .records_targeting(id)
            .into_iter()
            .find_map(|r| r.multiplicity))
    }

    /// Is the nearest significant-or-group ancestor of `id` a group node
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn is_under_content_group(&self, id: &ElementId) -> Result<bool> {
        self.ensure_categorized()?;
        Ok(self
            .new
            .ancestors_or_self(id)
            .into_iter()
            .skip(1)
            .find(|ancestor| self.is_significant_or_group(ancestor))
            .is_some_and(|ancestor| self.state.group_nodes.contains(ancestor)))
    }

    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn is_content_group_node(&self, id: &ElementId) -> Result<bool> {
        self.ensure_categorized()?;
        Ok(self.state.group_nodes.contains(id))
    }

    /// Did the group node `id` have an element label in the old version
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn lost_label(&self, id: &ElementId) -> Result<bool> {
        self.ensure_categorized()?;
        Ok(self.state.lost_label.contains(id))
    }

    /// Color of a significant or group node, None for other nodes
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn color_of(&self, id: &ElementId) -> Result<Option<NodeColor>> {
        self.ensure_categorized()?;
        Ok(self.node_color(id))
    }

    /// Green, or uncolored and untouched by any record since the old version
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn is_green(&self, id: &ElementId) -> Result<bool> {
        self.ensure_categorized()?;
        Ok(match self.node_color(id) {
            Some(color) => color == NodeColor::Green,
            None => {
                !self.state.insignificant_blue.contains(id)
                    && !self.state.by_target.contains_key(id)
                    && self.old.contains(id)
            }
        })
    }

    /// Red nodes, deepest first
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn red_nodes(&self) -> Result<&[ElementId]> {
        self.ensure_categorized()?;
        Ok(&self.state.red)
    }

    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn blue_nodes(&self) -> Result<&BTreeSet<ElementId>> {
        self.ensure_categorized()?;
        Ok(&self.state.blue)
    }

    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn green_nodes(&self) -> Result<&BTreeSet<ElementId>> {
        self.ensure_categorized()?;
        Ok(&self.state.green)
    }

    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn insignificant_blue_nodes(&self) -> Result<&BTreeSet<ElementId>> {
        self.ensure_categorized()?;
        Ok(&self.state.insignificant_blue)
    }

    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn group_nodes(&self) -> Result<&BTreeSet<ElementId>> {
        self.ensure_categorized()?;
        Ok(&self.state.group_nodes)
    }

    /// Records grouped under the significant-or-group node `id`
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn grouped_records(&self, id: &ElementId) -> Result<Vec<&ChangeRecord>> {
        self.ensure_categorized()?;
        Ok(self
            .state
            .by_group
            .get(id)
            .into_iter()
            .flatten()
            .map(|&index| &self.state.records[index])
            .collect())
    }

    /// Records that affect no emitted fragment
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` before `categorize()`.
    pub fn ungrouped_records(&self) -> Result<Vec<&ChangeRecord>> {
        self.ensure_categorized()?;
        Ok(self
            .state
            .ungrouped
            .iter()
            .map(|&index| &self.state.records[index])
            .collect())
    }

    /// Records whose primary target is `id`
    fn records_targeting(&self, id: &ElementId) -> Vec<&ChangeRecord> {
        self.state
            .by_target
            .get(id)
            .into_iter()
            .flatten()
            .map(|&index| &self.state.records[index])
            .filter(|record| &record.target == id)
            .collect()
    }

    fn invalidated(&self, id: &ElementId, facet: Facet, visited: &mut Visited) -> Result<bool> {
        if !visited.insert((id.clone(), facet)) {
            return Ok(false);
        }

        let flagged = self
            .state
            .by_group
            .get(id)
            .into_iter()
            .flatten()
            .map(|&index| &self.state.records[index])
            .any(|record| record.forces_regeneration() && facet.flagged_by(record));
        if flagged {
            return Ok(true);
        }

        if self.get_state(id)? == NodeState::Added && self.contributes(id, facet)? {
            return Ok(true);
        }

        if let Some(represented) = self.new.represented_class(id) {
            if self.newly_representative(id) && self.has_items(represented, facet)? {
                return Ok(true);
            }
            if self.invalidated(represented, facet, visited)? {
                return Ok(true);
            }
        }

        let items = self.items(id, facet)?;
        self.items_invalidated(&items, facet, visited)
    }

    /// Inlined representative content and merged groups reachable from `items`
    fn items_invalidated(
        &self,
        items: &[ContentItem],
        facet: Facet,
        visited: &mut Visited,
    ) -> Result<bool> {
        for item in items {
            let invalidated = match item {
                ContentItem::Simple { .. } => false,
                ContentItem::AliasInlined {
                    representative,
                    represented,
                    items,
                } => {
                    (self.newly_representative(representative) && !items.is_empty())
                        || self.invalidated(represented, facet, visited)?
                }
                ContentItem::Group { containing, .. } => {
                    self.invalidated(containing, facet, visited)?
                }
                ContentItem::Choice { options, .. } => {
                    let mut any = false;
                    for option in options {
                        if self.items_invalidated(option, facet, visited)? {
                            any = true;
                            break;
                        }
                    }
                    any
                }
            };
            if invalidated {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn items(&self, id: &ElementId, facet: Facet) -> Result<Vec<ContentItem>> {
        if !self.new.contains(id) {
            return Ok(Vec::new());
        }
        match facet {
            Facet::Content => content_of(self.new, id),
            Facet::Attributes => attributes_of(self.new, id),
        }
    }

    fn has_items(&self, id: &ElementId, facet: Facet) -> Result<bool> {
        Ok(!self.items(id, facet)?.is_empty())
    }

    /// Represents a class it did not represent in the old version
    fn newly_representative(&self, id: &ElementId) -> bool {
        match self.new.represented_class(id) {
            Some(represented) => self.old.represented_class(id) != Some(represented),
            None => false,
        }
    }

    /// Does `id` feed this facet of its owner's fragment
    fn contributes(&self, id: &ElementId, facet: Facet) -> Result<bool> {
        let Some(element) = self.new.get(id) else {
            return Ok(false);
        };
        if self.new.structural_parent(id).is_none() {
            return Ok(false);
        }
        Ok(match &element.kind {
            ElementKind::Attribute(attribute) if attribute.is_xml_attribute() => {
                facet == Facet::Attributes
            }
            ElementKind::Class(class) if class.element_name.is_none() => {
                self.has_items(id, facet)?
            }
            _ => facet == Facet::Content,
        })
    }
}
