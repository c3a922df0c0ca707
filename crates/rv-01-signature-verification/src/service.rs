//! # Signature Verification Service
//!
//! Application service layer that implements the `EnvelopeVerificationApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`EnvelopeVerificationApi`)
//! - Uses the outbound port (`VerifyingKeyResolver`) to find stored keys
//! - Delegates parsing and cryptographic operations to the domain layer

use crate::domain::ecdsa::parse_verifying_key;
use crate::domain::entities::{DualVerification, ParsedEnvelope};
use crate::domain::envelope;
use crate::domain::errors::RequestError;
use crate::ports::inbound::EnvelopeVerificationApi;
use crate::ports::outbound::VerifyingKeyResolver;
use shared_types::StoreError;
use tracing::{debug, warn};

/// Signature Verification Service.
pub struct SignatureVerificationService<R: VerifyingKeyResolver> {
    keys: R,
}

impl<R: VerifyingKeyResolver> SignatureVerificationService<R> {
    /// Create a new signature verification service.
    ///
    /// # Arguments
    /// * `keys` - resolver for stored device and profile keys
    pub fn new(keys: R) -> Self {
        Self { keys }
    }
}

impl<R: VerifyingKeyResolver> EnvelopeVerificationApi for SignatureVerificationService<R> {
    fn parse(&self, body: &[u8]) -> Result<ParsedEnvelope, RequestError> {
        envelope::parse_envelope(body)
    }

    fn verify_submitted_key(&self, parsed: &ParsedEnvelope, vk_pem: &str) -> bool {
        match parse_verifying_key(vk_pem) {
            Ok(key) => envelope::verify_single(parsed, &key),
            Err(e) => {
                debug!("submitted key unusable: {}", e);
                false
            }
        }
    }

    fn verify_stored_profile(
        &self,
        parsed: &ParsedEnvelope,
        profile_id: &str,
    ) -> Result<bool, StoreError> {
        let pem = self.keys.profile_key(profile_id)?;
        Ok(self.verify_submitted_key(parsed, &pem))
    }

    fn resolve_device_key(&self, device_id: &str) -> Result<String, StoreError> {
        self.keys.device_key(device_id).inspect_err(|e| {
            if !matches!(e, StoreError::NotFound { .. }) {
                warn!("key lookup for device {} failed: {}", device_id, e);
            }
        })
    }

    fn verify_dual(
        &self,
        parsed: &ParsedEnvelope,
        profile_pem: &str,
        device_pem: &str,
    ) -> DualVerification {
        let profile_key = parse_verifying_key(profile_pem);
        let device_key = parse_verifying_key(device_pem);
        match (profile_key, device_key) {
            (Ok(p), Ok(d)) => envelope::verify_dual(parsed, &p, &d),
            (p, d) => {
                debug!("dual verification with unusable key");
                // An unusable key verifies nothing; the other side may still
                // match either signature.
                DualVerification {
                    profile_valid: p.is_ok_and(|k| envelope::verify_any(parsed, &k)),
                    device_valid: d.is_ok_and(|k| envelope::verify_any(parsed, &k)),
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
