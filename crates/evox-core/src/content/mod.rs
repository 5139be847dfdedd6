//! Logical content projection
//!
//! A [`ContentItem`] list describes what a significant node's generated
//! fragment is built from: plain elements, content inlined from a represented
//! class, alternatives of a choice or union, and groups merged from unlabelled
//! classes. The change set reasons about optionality and greenness on these
//! items instead of re-walking the tree.

mod builder;
mod inline;

use std::collections::{HashMap, HashSet};

use evox_core_types::ElementId;
use serde::{Deserialize, Serialize};

use crate::change_set::{ChangeSet, NodeColor};
use crate::errors::Result;
use crate::model::{Element, Multiplicity};
use crate::store::ModelView;

pub use builder::{attributes_of, content_of};
pub use inline::{inline, inline_but_leave_choices, inline_but_leave_sr_content, leaf_elements};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum ContentItem {
    /// One emitted element (labelled class, content container or attribute)
    Simple {
        element: ElementId,
        /// Association leading to the element, if any
        via: Option<ElementId>,
        multiplicity: Multiplicity,
    },
    /// Content of `represented` reused by its structural representative
    AliasInlined {
        representative: ElementId,
        represented: ElementId,
        items: Vec<ContentItem>,
    },
    /// Alternatives of a content choice or class union
    Choice {
        choice: ElementId,
        via: Option<ElementId>,
        multiplicity: Multiplicity,
        options: Vec<Vec<ContentItem>>,
    },
    /// Content of an unlabelled class merged into its owner
    Group {
        containing: ElementId,
        via: Option<ElementId>,
        multiplicity: Multiplicity,
        items: Vec<ContentItem>,
    },
}

impl ContentItem {
    /// The tree node the item stands for
    pub fn element(&self) -> &ElementId {
        match self {
            ContentItem::Simple { element, .. } => element,
            ContentItem::AliasInlined { representative, .. } => representative,
            ContentItem::Choice { choice, .. } => choice,
            ContentItem::Group { containing, .. } => containing,
        }
    }

    pub fn via(&self) -> Option<&ElementId> {
        match self {
            ContentItem::Simple { via, .. }
            | ContentItem::Choice { via, .. }
            | ContentItem::Group { via, .. } => via.as_ref(),
            ContentItem::AliasInlined { .. } => None,
        }
    }

    pub fn multiplicity(&self) -> Multiplicity {
        match self {
            ContentItem::Simple { multiplicity, .. }
            | ContentItem::Choice { multiplicity, .. }
            | ContentItem::Group { multiplicity, .. } => *multiplicity,
            ContentItem::AliasInlined { .. } => Multiplicity::ONE,
        }
    }

    /// Direct sub-items, choice options concatenated
    pub fn children(&self) -> Vec<&ContentItem> {
        match self {
            ContentItem::Simple { .. } => Vec::new(),
            ContentItem::AliasInlined { items, .. } | ContentItem::Group { items, .. } => {
                items.iter().collect()
            }
            ContentItem::Choice { options, .. } => options.iter().flatten().collect(),
        }
    }

    /// Lower bound 0, or an optional sub-item or alternative
    pub fn is_optional(&self) -> bool {
        if self.multiplicity().is_optional() {
            return true;
        }
        match self {
            ContentItem::Simple { .. } => false,
            ContentItem::AliasInlined { items, .. } | ContentItem::Group { items, .. } => {
                items.iter().any(ContentItem::is_optional)
            }
            ContentItem::Choice { options, .. } => options
                .iter()
                .any(|option| option.is_empty() || option.iter().any(ContentItem::is_optional)),
        }
    }

    /// Optional when seen from `ancestor`
    ///
    /// Besides the item's own optionality, any association with lower bound 0
    /// between the item and `ancestor` makes it optional in that context.
    /// Content inlined from a represented class is seen through the
    /// representative, so the path leaves the represented class at the
    /// representative that reuses it.
    ///
    /// # Errors
    ///
    /// Returns `DiagramNotFound` if the version carries no diagram.
    pub fn is_optional_in(&self, view: &ModelView<'_>, ancestor: &ElementId) -> Result<bool> {
        if self.is_optional() {
            return Ok(true);
        }
        let mut representatives: HashMap<&ElementId, Vec<&ElementId>> = HashMap::new();
        for id in view.tree_nodes()? {
            if let Some(represented) = view.represented_class(id) {
                representatives.entry(represented).or_default().push(id);
            }
        }
        let mut visited = HashSet::new();
        Ok(
            optional_on_path(*view, &representatives, self.element(), ancestor, &mut visited)
                .unwrap_or(false),
        )
    }

    /// Every leaf element is green
    ///
    /// Choices and groups additionally require their own node to be green.
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` if the change set has not been categorized.
    pub fn is_green(&self, change_set: &ChangeSet<'_>) -> Result<bool> {
        match self {
            ContentItem::Simple { element, .. } => change_set.is_green(element),
            ContentItem::Choice { choice: own, .. } | ContentItem::Group { containing: own, .. }
                if change_set.color_of(own)? == Some(NodeColor::Red) =>
            {
                Ok(false)
            }
            _ => {
                for leaf in leaf_elements(std::slice::from_ref(self)) {
                    if !change_set.is_green(leaf)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Would this item force regeneration of a choice it takes part in
    ///
    /// True when it is not green, did not exist in the old version, or its
    /// multiplicity (or that of the association leading to it) changed.
    ///
    /// # Errors
    ///
    /// Returns `NotCategorized` if the change set has not been categorized.
    pub fn invalidates_choice(&self, change_set: &ChangeSet<'_>) -> Result<bool> {
        if !self.is_green(change_set)? || !change_set.old_view().contains(self.element()) {
            return Ok(true);
        }
        if change_set.multiplicity_changed(self.element())? {
            return Ok(true);
        }
        if let Some(via) = self.via() {
            if change_set.multiplicity_changed(via)? {
                return Ok(true);
            }
        }
        for child in self.children() {
            if child.invalidates_choice(change_set)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Is some association between `from` and `ancestor` optional
///
/// None when `ancestor` is not reachable from `from`, neither through its
/// owners nor through a representative of one of them.
fn optional_on_path<'v>(
    view: ModelView<'v>,
    representatives: &HashMap<&'v ElementId, Vec<&'v ElementId>>,
    from: &ElementId,
    ancestor: &ElementId,
    visited: &mut HashSet<ElementId>,
) -> Option<bool> {
    if !visited.insert(from.clone()) {
        return None;
    }
    let mut optional = false;
    for id in view.ancestors_or_self(from) {
        if id == ancestor {
            return Some(optional);
        }
        for representative in representatives.get(id).into_iter().flatten() {
            if let Some(beyond) =
                optional_on_path(view, representatives, representative, ancestor, visited)
            {
                return Some(optional || beyond);
            }
        }
        if let Some(association) = view.get(id).and_then(Element::as_association) {
            optional |= association.multiplicity.is_optional();
        }
    }
    None
}
