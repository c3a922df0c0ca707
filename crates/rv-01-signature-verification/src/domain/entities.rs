//! # Domain Entities
//!
//! Core data structures for signed submissions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// Wire Types
// =============================================================================

/// One detached signature as transmitted in an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachedSignature {
    /// base64url JSON object (the JWS protected header)
    #[serde(rename = "protected")]
    pub protected_header_b64: String,
    /// base64url DER or fixed-width `r || s` signature
    #[serde(rename = "signature")]
    pub signature_b64: String,
}

/// A JSON envelope carrying a base64url payload and its detached signatures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    /// base64url-encoded JSON payload
    #[serde(rename = "payload")]
    pub payload_b64: String,
    /// Signatures in transmission order
    pub signatures: Vec<DetachedSignature>,
}

impl DetachedSignature {
    /// Bytes covered by this signature: `protected || "." || payload`.
    pub fn signing_input(&self, payload_b64: &str) -> Vec<u8> {
        let mut input = Vec::with_capacity(self.protected_header_b64.len() + 1 + payload_b64.len());
        input.extend_from_slice(self.protected_header_b64.as_bytes());
        input.push(b'.');
        input.extend_from_slice(payload_b64.as_bytes());
        input
    }
}

// =============================================================================
// Parsed Form
// =============================================================================

/// A structurally valid envelope with its payload decoded.
///
/// The signature count is not constrained beyond "at least one"; endpoints
/// report `TooManySignatures` at their own priority.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedEnvelope {
    pub envelope: SignedEnvelope,
    /// Decoded payload JSON
    pub payload: Value,
    /// Decoded signature bytes, aligned with `envelope.signatures`
    pub signature_bytes: Vec<Vec<u8>>,
}

impl ParsedEnvelope {
    pub fn signature_count(&self) -> usize {
        self.envelope.signatures.len()
    }

    /// Signing input of the signature at `index`.
    pub fn signing_input(&self, index: usize) -> Option<Vec<u8>> {
        self.envelope
            .signatures
            .get(index)
            .map(|sig| sig.signing_input(&self.envelope.payload_b64))
    }
}

// =============================================================================
// Verification Outcomes
// =============================================================================

/// Which key holder produced a signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerRole {
    Profile,
    Device,
}

impl fmt::Display for SignerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerRole::Profile => f.write_str("profile"),
            SignerRole::Device => f.write_str("device"),
        }
    }
}

/// Result of matching two signatures against the profile and device keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DualVerification {
    pub profile_valid: bool,
    pub device_valid: bool,
}

impl DualVerification {
    pub fn all_valid(&self) -> bool {
        self.profile_valid && self.device_valid
    }

    /// First role whose signature failed, profile first.
    pub fn first_invalid(&self) -> Option<SignerRole> {
        if !self.profile_valid {
            Some(SignerRole::Profile)
        } else if !self.device_valid {
            Some(SignerRole::Device)
        } else {
            None
        }
    }

    fn valid_count(&self) -> u8 {
        u8::from(self.profile_valid) + u8::from(self.device_valid)
    }

    /// Better of two assignments: more valid signatures, then profile validity.
    pub(crate) fn best(a: Self, b: Self) -> Self {
        let key = |v: &Self| (v.valid_count(), v.profile_valid);
        if key(&b) > key(&a) {
            b
        } else {
            a
        }
    }
}
