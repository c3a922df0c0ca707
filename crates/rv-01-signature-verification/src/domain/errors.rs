//! # Signature and Request Errors
//!
//! `SignatureError` covers failures of the EC adapter. `RequestError` is the
//! tagged outcome reported for a rejected submission; exactly one is reported
//! per request.

use crate::domain::entities::SignerRole;
use serde_json::Value;
use shared_types::EntityKind;
use std::fmt;
use thiserror::Error;

/// Errors raised by the EC adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The public key is not a PEM-encoded secp256k1 SubjectPublicKeyInfo
    #[error("Invalid verifying key: {0}")]
    InvalidKey(String),

    /// The signature is neither DER nor 64-byte `r || s`
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature verification failed (signature doesn't match message/signer)
    #[error("Signature verification failed")]
    VerificationFailed,
}

// =============================================================================
// DEFECT KINDS
// =============================================================================

/// Class of a request defect. Endpoints rank these in a `CheckOrder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectKind {
    MalformedJson,
    MalformedSignature,
    MissingField,
    NotFound,
    TooManySignatures,
    InvalidSignature,
    MalformedData,
    Conflict,
}

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefectKind::MalformedJson => "malformed_json",
            DefectKind::MalformedSignature => "malformed_signature",
            DefectKind::MissingField => "missing_field",
            DefectKind::NotFound => "not_found",
            DefectKind::TooManySignatures => "too_many_signatures",
            DefectKind::InvalidSignature => "invalid_signature",
            DefectKind::MalformedData => "malformed_data",
            DefectKind::Conflict => "conflict",
        };
        f.write_str(name)
    }
}

/// What a `Conflict` collided with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// A unique key (key hash, experiment name) is already taken
    AlreadyExists { kind: EntityKind, key: String },
    /// The profile is already bound to a device
    DeviceAlreadySet {
        profile_id: String,
        device_id: String,
    },
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::AlreadyExists { kind, key } => write!(f, "{kind} already exists: {key}"),
            ConflictKind::DeviceAlreadySet {
                profile_id,
                device_id,
            } => write!(
                f,
                "device already set: profile {profile_id} is bound to {device_id}"
            ),
        }
    }
}

// =============================================================================
// REQUEST ERRORS
// =============================================================================

/// The single defect reported for a rejected submission.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestError {
    /// The request body is not JSON
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    /// The envelope or one of its signatures is structurally wrong
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    /// A required key is absent from the decoded payload
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A referenced entity does not exist
    ///
    /// `payload` holds the decoded payload when one was available, so callers
    /// can still inspect field presence.
    #[error("{kind} not found: {id}")]
    NotFound {
        kind: EntityKind,
        id: String,
        payload: Option<Value>,
    },

    /// More signatures than the endpoint accepts
    #[error("Too many signatures: got {count}, accept at most {max}")]
    TooManySignatures { count: usize, max: usize },

    /// A signature does not verify under its claimed signer's key
    #[error("Invalid {role} signature")]
    InvalidSignature { role: SignerRole },

    /// The business data in the payload has the wrong shape
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// The request collides with existing state
    #[error("Conflict: {0}")]
    Conflict(ConflictKind),
}

impl RequestError {
    /// Defect class of this error.
    pub fn kind(&self) -> DefectKind {
        match self {
            RequestError::MalformedJson(_) => DefectKind::MalformedJson,
            RequestError::MalformedSignature(_) => DefectKind::MalformedSignature,
            RequestError::MissingField(_) => DefectKind::MissingField,
            RequestError::NotFound { .. } => DefectKind::NotFound,
            RequestError::TooManySignatures { .. } => DefectKind::TooManySignatures,
            RequestError::InvalidSignature { .. } => DefectKind::InvalidSignature,
            RequestError::MalformedData(_) => DefectKind::MalformedData,
            RequestError::Conflict(_) => DefectKind::Conflict,
        }
    }

    /// Conventional HTTP status for this error.
    pub fn http_status(&self) -> u16 {
        match self.kind() {
            DefectKind::MalformedJson
            | DefectKind::MalformedSignature
            | DefectKind::MissingField
            | DefectKind::TooManySignatures
            | DefectKind::MalformedData => 400,
            DefectKind::InvalidSignature => 403,
            DefectKind::NotFound => 404,
            DefectKind::Conflict => 409,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        RequestError::MissingField(field.into())
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        RequestError::NotFound {
            kind,
            id: id.into(),
            payload: None,
        }
    }

    /// Attach the decoded payload to a `NotFound`; other variants pass through.
    pub fn with_payload(self, payload: &Value) -> Self {
        match self {
            RequestError::NotFound { kind, id, .. } => RequestError::NotFound {
                kind,
                id,
                payload: Some(payload.clone()),
            },
            other => other,
        }
    }
}
