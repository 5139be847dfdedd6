//! Core types shared across evox facilities
//!
//! This crate provides the foundational identity types used by the model,
//! the change engine and the logging facility:
//!
//! - **Identity types**: ElementId, VersionId
//! - **Schema constants**: Canonical field keys and event names

pub mod identity;
pub mod schema;

pub use identity::{ElementId, VersionId};
