//! # Error Types
//!
//! Errors raised by the persistence collaborator.

use crate::entities::EntityKind;
use thiserror::Error;

/// Errors that can occur in an entity store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No entity of this kind carries the id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A unique constraint (key hash, experiment name) is already taken.
    #[error("{kind} already exists: {key}")]
    UniquenessConflict { kind: EntityKind, key: String },

    /// The profile is already bound to a device.
    #[error("profile {profile_id} already bound to device {device_id}")]
    DeviceAlreadySet {
        profile_id: String,
        device_id: String,
    },

    /// Backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}
