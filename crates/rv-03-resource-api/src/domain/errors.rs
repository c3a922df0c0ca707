//! # API Errors

use rv_01_signature_verification::{ConflictKind, RequestError};
use rv_02_json_projection::{ProjectionError, ViewError};
use shared_types::StoreError;
use thiserror::Error;

/// Failure of an API operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The request was rejected; carries the single highest-ranked defect
    #[error(transparent)]
    Rejected(#[from] RequestError),

    /// Rendering the response failed
    #[error("projection failed: {0}")]
    Projection(#[from] ProjectionError),

    /// The store failed for a reason unrelated to the request
    #[error("store failure: {0}")]
    Store(StoreError),
}

impl ApiError {
    /// Conventional HTTP status.
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::Rejected(e) => e.http_status(),
            ApiError::Projection(_) | ApiError::Store(_) => 500,
        }
    }

    /// The rejection, if the request was rejected.
    pub fn rejection(&self) -> Option<&RequestError> {
        match self {
            ApiError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => RequestError::not_found(kind, id).into(),
            StoreError::UniquenessConflict { kind, key } => {
                RequestError::Conflict(ConflictKind::AlreadyExists { kind, key }).into()
            }
            StoreError::DeviceAlreadySet {
                profile_id,
                device_id,
            } => RequestError::Conflict(ConflictKind::DeviceAlreadySet {
                profile_id,
                device_id,
            })
            .into(),
            other => ApiError::Store(other),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// A value that does not parse
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Errors raised while constructing the service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid view definitions: {0}")]
    Views(#[from] ViewError),
}
