//! Serializable summary of a categorized change set
//!
//! The digest covers the color assignment only, so two runs over the same
//! version pair produce the same digest regardless of when they ran.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use evox_core_types::{ElementId, VersionId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ChangeSet;
use crate::changes::ChangeRecord;
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub old_version: VersionId,
    pub new_version: VersionId,
    pub generated_at: DateTime<Utc>,
    /// Records that survived pruning
    pub records: Vec<ChangeRecord>,
    /// Red nodes, deepest first
    pub red: Vec<ElementId>,
    pub blue: BTreeSet<ElementId>,
    pub green: BTreeSet<ElementId>,
    pub insignificant_blue: BTreeSet<ElementId>,
    pub group_nodes: BTreeSet<ElementId>,
    pub lost_label: BTreeSet<ElementId>,
    /// SHA-256 over the color assignment
    pub digest: String,
}

/// The part of a report the digest is computed over
#[derive(Serialize)]
struct ColorAssignment<'r> {
    old_version: VersionId,
    new_version: VersionId,
    red: &'r [ElementId],
    blue: &'r BTreeSet<ElementId>,
    green: &'r BTreeSet<ElementId>,
    insignificant_blue: &'r BTreeSet<ElementId>,
}

impl<'a> ChangeSet<'a> {
    /// # Errors
    ///
    /// - `NotCategorized` before `categorize()`
    /// - `Serialization` if the color assignment cannot be encoded
    pub fn report(&self) -> Result<ImpactReport> {
        self.ensure_categorized()?;
        let state = &self.state;
        let assignment = ColorAssignment {
            old_version: self.old.version(),
            new_version: self.new.version(),
            red: &state.red,
            blue: &state.blue,
            green: &state.green,
            insignificant_blue: &state.insignificant_blue,
        };
        let digest = hash_string(&serde_json::to_string(&assignment)?);

        Ok(ImpactReport {
            old_version: self.old.version(),
            new_version: self.new.version(),
            generated_at: Utc::now(),
            records: state.records.clone(),
            red: state.red.clone(),
            blue: state.blue.clone(),
            green: state.green.clone(),
            insignificant_blue: state.insignificant_blue.clone(),
            group_nodes: state.group_nodes.clone(),
            lost_label: state.lost_label.clone(),
            digest,
        })
    }
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
