//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this crate.

use crate::domain::entities::{DualVerification, ParsedEnvelope};
use crate::domain::errors::RequestError;
use shared_types::StoreError;

/// Primary Signature Verification API.
///
/// Every method is a pure check; none of them mutates state. Implementations
/// must be thread-safe (`Send + Sync`).
pub trait EnvelopeVerificationApi: Send + Sync {
    /// Parse a raw request body.
    ///
    /// Reports `MalformedJson` or `MalformedSignature` only.
    fn parse(&self, body: &[u8]) -> Result<ParsedEnvelope, RequestError>;

    /// Verify the single signature under a key carried in the request itself
    /// (new device or new profile). An unparseable key verifies nothing.
    fn verify_submitted_key(&self, parsed: &ParsedEnvelope, vk_pem: &str) -> bool;

    /// Verify the single signature under a stored profile's key.
    ///
    /// # Errors
    /// * `StoreError::NotFound` - the profile does not exist
    /// * any other `StoreError` - the store failed
    fn verify_stored_profile(
        &self,
        parsed: &ParsedEnvelope,
        profile_id: &str,
    ) -> Result<bool, StoreError>;

    /// Key of the device referenced by a payload.
    ///
    /// # Errors
    /// * `StoreError::NotFound` - the device does not exist
    /// * any other `StoreError` - the store failed
    fn resolve_device_key(&self, device_id: &str) -> Result<String, StoreError>;

    /// Match two signatures against the profile and device keys, in any order.
    fn verify_dual(
        &self,
        parsed: &ParsedEnvelope,
        profile_pem: &str,
        device_pem: &str,
    ) -> DualVerification;
}
