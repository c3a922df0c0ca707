//! # Outbound Ports (Driven Ports / SPI)
//!
//! Traits that define dependencies this crate needs.

use shared_types::StoreError;

/// Resolves the verifying key of a stored key holder.
///
/// Production: the entity store of the request handlers.
/// Testing: in-memory maps.
pub trait VerifyingKeyResolver: Send + Sync {
    /// PEM key of the device with this id.
    ///
    /// # Errors
    /// * `StoreError::NotFound` - no such device
    fn device_key(&self, device_id: &str) -> Result<String, StoreError>;

    /// PEM key of the profile with this id.
    ///
    /// # Errors
    /// * `StoreError::NotFound` - no such profile
    fn profile_key(&self, profile_id: &str) -> Result<String, StoreError>;
}
