//! Flattening of content item lists
//!
//! All three depths keep the leaf set: flattening any of their results fully
//! yields the same elements as flattening the input.

use evox_core_types::ElementId;

use super::ContentItem;

/// Flatten to plain items only
pub fn inline(items: &[ContentItem]) -> Vec<ContentItem> {
    let mut out = Vec::new();
    for item in items {
        match item {
            ContentItem::Simple { .. } => out.push(item.clone()),
            ContentItem::AliasInlined { items, .. } | ContentItem::Group { items, .. } => {
                out.extend(inline(items))
            }
            ContentItem::Choice { options, .. } => {
                for option in options {
                    out.extend(inline(option));
                }
            }
        }
    }
    out
}

/// Flatten aliases and groups, keep choices (and what is inside them) intact
pub fn inline_but_leave_choices(items: &[ContentItem]) -> Vec<ContentItem> {
    let mut out = Vec::new();
    for item in items {
        match item {
            ContentItem::Simple { .. } | ContentItem::Choice { .. } => out.push(item.clone()),
            ContentItem::AliasInlined { items, .. } | ContentItem::Group { items, .. } => {
                out.extend(inline_but_leave_choices(items))
            }
        }
    }
    out
}

/// Flatten groups and choices, keep content inlined from represented classes
pub fn inline_but_leave_sr_content(items: &[ContentItem]) -> Vec<ContentItem> {
    let mut out = Vec::new();
    for item in items {
        match item {
            ContentItem::Simple { .. } | ContentItem::AliasInlined { .. } => {
                out.push(item.clone())
            }
            ContentItem::Group { items, .. } => out.extend(inline_but_leave_sr_content(items)),
            ContentItem::Choice { options, .. } => {
                for option in options {
                    out.extend(inline_but_leave_sr_content(option));
                }
            }
        }
    }
    out
}

/// Elements of every plain item reachable from `items`, in order
pub fn leaf_elements(items: &[ContentItem]) -> Vec<&ElementId> {
    let mut out = Vec::new();
    for item in items {
        match item {
            ContentItem::Simple { element, .. } => out.push(element),
            ContentItem::AliasInlined { items, .. } | ContentItem::Group { items, .. } => {
                out.extend(leaf_elements(items))
            }
            ContentItem::Choice { options, .. } => {
                for option in options {
                    out.extend(leaf_elements(option));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Multiplicity;

    fn simple(id: &str) -> ContentItem {
        ContentItem::Simple {
            element: ElementId::from(id),
            via: None,
            multiplicity: Multiplicity::ONE,
        }
    }

    fn sample() -> Vec<ContentItem> {
        vec![
            simple("a"),
            ContentItem::AliasInlined {
                representative: ElementId::from("r"),
                represented: ElementId::from("b"),
                items: vec![ContentItem::Choice {
                    choice: ElementId::from("c"),
                    via: None,
                    multiplicity: Multiplicity::ONE,
                    options: vec![vec![simple("x")], vec![simple("y")]],
                }],
            },
            ContentItem::Group {
                containing: ElementId::from("g"),
                via: None,
                multiplicity: Multiplicity::ONE,
                items: vec![simple("z")],
            },
        ]
    }

    #[test]
    fn test_depths_stop_at_their_boundary() {
        let items = sample();

        assert_eq!(inline(&items).len(), 4);

        let choices_kept = inline_but_leave_choices(&items);
        assert!(matches!(choices_kept[1], ContentItem::Choice { .. }));
        assert_eq!(choices_kept.len(), 3);

        let aliases_kept = inline_but_leave_sr_content(&items);
        assert!(matches!(aliases_kept[1], ContentItem::AliasInlined { .. }));
        assert_eq!(aliases_kept.len(), 3);
    }

    #[test]
    fn test_leaf_order_follows_items() {
        let items = sample();
        let leaves: Vec<&str> = leaf_elements(&items).iter().map(|id| id.as_str()).collect();
        assert_eq!(leaves, vec!["a", "x", "y", "z"]);
    }
}
