use evox_core_types::ElementId;

use super::{ChangeSet, Phase};
use crate::errors::Result;
use crate::model::ElementKind;

/// Outcome of visiting one subtree
struct Visit {
    /// The node or a descendant received Red, Blue or insignificant-blue
    colored: bool,
    /// Red group node reached through an association, waiting for the
    /// nearest significant ancestor to be promoted before it
    promoting: Option<ElementId>,
}

impl Visit {
    const UNCOLORED: Visit = Visit {
        colored: false,
        promoting: None,
    };
}

impl<'a> ChangeSet<'a> {
    /// Post-order coloring of every diagram root
    pub(super) fn color(&mut self) -> Result<()> {
        self.enter_phase(Phase::Grouped, Phase::Colored, "color")?;
        let diagram = self.new.diagram()?;
        for root in &diagram.roots {
            self.visit(root)?;
        }
        tracing::debug!(
            red = self.state.red.len(),
            blue = self.state.blue.len(),
            green = self.state.green.len(),
            "tree colored"
        );
        Ok(())
    }

    fn visit(&mut self, id: &'a ElementId) -> Result<Visit> {
        let element = self.new.element(id)?;

        let mut any_colored = false;
        let mut promoting = None;
        for child in element.children() {
            let visit = self.visit(child)?;
            any_colored |= visit.colored;
            if promoting.is_none() {
                promoting = visit.promoting;
            }
        }

        if self.is_significant_or_group(id) {
            if self.has_forcing_records(id) || !self.old.contains(id) {
                self.state.push_red(id);
            } else if let Some(group) = promoting {
                let at = self
                    .state
                    .red
                    .iter()
                    .position(|red| red == &group)
                    .unwrap_or(self.state.red.len());
                self.state.insert_red(at, id);
            } else if any_colored {
                self.state.blue.insert(id.clone());
            } else {
                self.state.green.insert(id.clone());
                return Ok(Visit::UNCOLORED);
            }
            return Ok(Visit {
                colored: true,
                promoting: None,
            });
        }

        if any_colored {
            self.state.insignificant_blue.insert(id.clone());
        }
        let promoting = match &element.kind {
            ElementKind::Association(association)
                if self.state.group_nodes.contains(&association.child)
                    && self.is_red(&association.child) =>
            {
                Some(association.child.clone())
            }
            _ => promoting,
        };
        Ok(Visit {
            colored: any_colored,
            promoting,
        })
    }

    /// A grouped record that is not an ignorable single-node edit
    fn has_forcing_records(&self, id: &ElementId) -> bool {
        self.state
            .by_group
            .get(id)
            .into_iter()
            .flatten()
            .any(|&index| self.state.records[index].forces_regeneration())
    }
}
