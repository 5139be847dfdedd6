//! Diagram-level changes

use super::{ChangeKind, ChangeRecord, DetectionInput, EditType};

pub(crate) fn detect_renamed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    let (Ok(old), Ok(new)) = (input.old.diagram(), input.new.diagram()) else {
        return Vec::new();
    };
    if old.name == new.name {
        return Vec::new();
    }
    vec![ChangeRecord::new(ChangeKind::DiagramRenamed, EditType::Sedentary, new.id.clone()).ignorable(true)]
}

/// Old roots that are gone from the new version entirely
///
/// A root that became a subordinate class still exists and is reported as
/// moved by its own scope.
pub(crate) fn detect_root_removed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    let Ok(old) = input.old.diagram() else {
        return Vec::new();
    };
    old.roots
        .iter()
        .filter(|root| !input.new.contains(root))
        .map(|root| {
            ChangeRecord::new(ChangeKind::RootClassRemoved, EditType::Removal, root.clone())
                .invalidating_content(true)
        })
        .collect()
}
