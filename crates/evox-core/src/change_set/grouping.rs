use evox_core_types::ElementId;

use super::{AliasRelation, ChangeSet, Phase};
use crate::changes::{ChangeKind, ChangeRecord, EditType};
use crate::errors::Result;

impl<'a> ChangeSet<'a> {
    /// Index records by target and by the node whose fragment they affect
    pub(super) fn group(&mut self) -> Result<()> {
        self.enter_phase(Phase::Pruned, Phase::Grouped, "group")?;

        self.state.aliases = AliasRelation::build(self.new)?;
        self.state.group_nodes = self.find_group_nodes()?;
        self.state.lost_label = self
            .state
            .records
            .iter()
            .filter(|r| r.kind == ChangeKind::ClassElementNameChanged)
            .map(|r| &r.target)
            .filter(|id| self.state.group_nodes.contains(*id) && self.old.has_label(id))
            .cloned()
            .collect();

        let keys: Vec<Vec<ElementId>> = self
            .state
            .records
            .iter()
            .map(|record| self.group_keys(record))
            .collect();

        for (index, (record, keys)) in self.state.records.iter().zip(keys).enumerate() {
            self.state
                .by_target
                .entry(record.target.clone())
                .or_default()
                .push(index);
            if let Some(secondary) = &record.secondary_target {
                self.state
                    .by_target
                    .entry(secondary.clone())
                    .or_default()
                    .push(index);
            }
            if keys.is_empty() {
                self.state.ungrouped.push(index);
            }
            for key in keys {
                self.state.by_group.entry(key).or_default().push(index);
            }
        }

        tracing::debug!(
            groups = self.state.by_group.len(),
            group_nodes = self.state.group_nodes.len(),
            ungrouped = self.state.ungrouped.len(),
            "records grouped"
        );
        Ok(())
    }

    /// Unlabelled classes whose content is merged into another fragment:
    /// every non-root one, and roots that some representative reuses
    fn find_group_nodes(&self) -> Result<std::collections::BTreeSet<ElementId>> {
        let mut group_nodes = std::collections::BTreeSet::new();
        for id in self.new.tree_nodes()? {
            let element = self.new.element(id)?;
            let Some(class) = element.as_class() else {
                continue;
            };
            if class.element_name.is_none()
                && (element.parent.is_some() || self.state.aliases.is_represented(id))
            {
                group_nodes.insert(id.clone());
            }
        }
        Ok(group_nodes)
    }

    /// Nodes whose fragment a record affects
    ///
    /// The walk starts at the target, or at the secondary target when the
    /// target is gone. A move also affects the fragment it left.
    fn group_keys(&self, record: &ChangeRecord) -> Vec<ElementId> {
        let present = |id: &&ElementId| self.new.contains(id);
        let start = Some(&record.target)
            .filter(present)
            .or(record.secondary_target.as_ref().filter(present));
        let left_behind = match record.edit_type {
            EditType::Migratory => record.secondary_target.as_ref().filter(present),
            _ => None,
        };

        let mut keys: Vec<ElementId> = Vec::new();
        for from in start.into_iter().chain(left_behind) {
            if let Some(key) = self
                .new
                .nearest(from, |id| self.is_significant_or_group(id))
            {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }
        keys
    }
}
