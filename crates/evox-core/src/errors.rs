use evox_core_types::{ElementId, VersionId};
use thiserror::Error;

use crate::changes::{ChangeKind, ChangeScope, EditType};

/// Result type alias using EvolutionError
pub type Result<T> = std::result::Result<T, EvolutionError>;

/// Coarse classification of evolution errors
///
/// Every failure of the analysis is a developer-visible problem; the kind only
/// tells whether the engine, the store, or the caller broke its contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An internal consistency check failed (bug in a change kind or the engine)
    Consistency,
    /// The versioned store could not resolve a version, diagram or element
    Lookup,
    /// The caller used the change set out of order
    Usage,
    /// Report encoding failed
    Serialization,
}

/// Error taxonomy for evolution analysis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvolutionError {
    // ===== Consistency Violations =====
    /// Scope pop did not match the scope on top of the stack
    #[error("Unbalanced scope stack: expected to pop {expected:?}, found {found:?}")]
    UnbalancedScope {
        expected: ChangeScope,
        found: Option<ChangeScope>,
    },

    /// A detector returned a record that does not belong to its kind
    #[error("Detector for {invoked:?} returned a {returned:?} record ({edit_type:?}) for {target}")]
    DetectorKindMismatch {
        invoked: ChangeKind,
        returned: ChangeKind,
        edit_type: EditType,
        target: ElementId,
    },

    /// Lifecycle records that must be exclusive were found on one target
    #[error("Conflicting lifecycle records for {target}: {kinds:?}")]
    ConflictingLifecycleRecords {
        target: ElementId,
        kinds: Vec<ChangeKind>,
    },

    /// A node ended up in more than one color set
    #[error("Node {element_id} is in more than one color set")]
    OverlappingColors { element_id: ElementId },

    /// An internal categorization phase ran out of order
    #[error("Phase {phase} cannot run in state {state}")]
    PhaseOrder {
        phase: &'static str,
        state: &'static str,
    },

    // ===== Lookup Errors =====
    /// Version is unknown to the store
    #[error("Version not found: {version}")]
    VersionNotFound { version: VersionId },

    /// Version has no diagram
    #[error("Diagram not found in version {version}")]
    DiagramNotFound { version: VersionId },

    /// Element does not exist in the requested version
    #[error("Element {element_id} not found in version {version}")]
    ElementNotFound {
        element_id: ElementId,
        version: VersionId,
    },

    // ===== Usage Errors =====
    /// Element cannot be placed under the given owner
    #[error("Element {element_id} cannot be placed under {owner_id}")]
    InvalidOwner {
        element_id: ElementId,
        owner_id: ElementId,
    },

    /// Query issued before `categorize()`
    #[error("Change set must be categorized before it is queried")]
    NotCategorized,

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl EvolutionError {
    /// Get the coarse error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvolutionError::UnbalancedScope { .. }
            | EvolutionError::DetectorKindMismatch { .. }
            | EvolutionError::ConflictingLifecycleRecords { .. }
            | EvolutionError::OverlappingColors { .. }
            | EvolutionError::PhaseOrder { .. } => ErrorKind::Consistency,
            EvolutionError::VersionNotFound { .. }
            | EvolutionError::DiagramNotFound { .. }
            | EvolutionError::ElementNotFound { .. } => ErrorKind::Lookup,
            EvolutionError::InvalidOwner { .. } | EvolutionError::NotCategorized => {
                ErrorKind::Usage
            }
            EvolutionError::Serialization { .. } => ErrorKind::Serialization,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            EvolutionError::UnbalancedScope { .. } => "ERR_UNBALANCED_SCOPE",
            EvolutionError::DetectorKindMismatch { .. } => "ERR_DETECTOR_KIND_MISMATCH",
            EvolutionError::ConflictingLifecycleRecords { .. } => {
                "ERR_CONFLICTING_LIFECYCLE_RECORDS"
            }
            EvolutionError::OverlappingColors { .. } => "ERR_OVERLAPPING_COLORS",
            EvolutionError::PhaseOrder { .. } => "ERR_PHASE_ORDER",
            EvolutionError::VersionNotFound { .. } => "ERR_VERSION_NOT_FOUND",
            EvolutionError::DiagramNotFound { .. } => "ERR_DIAGRAM_NOT_FOUND",
            EvolutionError::ElementNotFound { .. } => "ERR_ELEMENT_NOT_FOUND",
            EvolutionError::InvalidOwner { .. } => "ERR_INVALID_OWNER",
            EvolutionError::NotCategorized => "ERR_NOT_CATEGORIZED",
            EvolutionError::Serialization { .. } => "ERR_SERIALIZATION",
        }
    }
}

impl From<serde_json::Error> for EvolutionError {
    fn from(err: serde_json::Error) -> Self {
        EvolutionError::Serialization {
            message: err.to_string(),
        }
    }
}
