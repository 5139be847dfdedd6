use chrono::{DateTime, Utc};
use evox_core_types::{ElementId, VersionId};
use serde::{Deserialize, Serialize};

/// Descriptive data attached to one snapshot of the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub id: VersionId,
    pub label: String,
    /// When the snapshot was branched
    pub created_at: DateTime<Utc>,
}

impl VersionInfo {
    pub fn new(id: VersionId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            created_at: Utc::now(),
        }
    }
}

/// PSM diagram: the forest of root classes of one version
///
/// The diagram keeps its id across versions like any other element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: ElementId,
    pub name: String,
    /// Root classes in display order
    pub roots: Vec<ElementId>,
}

impl Diagram {
    pub fn new(id: ElementId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            roots: Vec::new(),
        }
    }
}
