use super::{added, moved, sedentary, ChangeKind, ChangeRecord, DetectionInput, EditType};

pub(crate) fn detect_added(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    added(input, ChangeKind::AssociationAdded)
}

pub(crate) fn detect_moved(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    moved(input, ChangeKind::AssociationMoved)
}

pub(crate) fn detect_renamed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    sedentary(input, ChangeKind::AssociationRenamed, |e| {
        e.as_association().map(|a| a.name.clone())
    })
    .map(|record| record.ignorable(true))
    .into_iter()
    .collect()
}

pub(crate) fn detect_multiplicity_changed(input: &DetectionInput<'_>) -> Vec<ChangeRecord> {
    let Some((old, new)) = input.counterparts() else {
        return Vec::new();
    };
    let (Some(old), Some(new)) = (old.as_association(), new.as_association()) else {
        return Vec::new();
    };
    if old.multiplicity == new.multiplicity {
        return Vec::new();
    }
    vec![ChangeRecord::new(
        ChangeKind::AssociationMultiplicityChanged,
        EditType::Sedentary,
        input.element.clone(),
    )
    .invalidating_content(true)
    .with_multiplicity(old.multiplicity, new.multiplicity)]
}
