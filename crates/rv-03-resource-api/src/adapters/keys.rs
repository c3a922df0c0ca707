use crate::ports::outbound::EntityStore;
use rv_01_signature_verification::VerifyingKeyResolver;
use shared_types::StoreError;
use std::sync::Arc;

/// Resolves device and profile keys from the entity store.
pub struct StoreKeyResolver<S: EntityStore> {
    store: Arc<S>,
}

impl<S: EntityStore> StoreKeyResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: EntityStore> VerifyingKeyResolver for StoreKeyResolver<S> {
    fn device_key(&self, device_id: &str) -> Result<String, StoreError> {
        self.store.find_device(device_id).map(|d| d.vk_pem)
    }

    fn profile_key(&self, profile_id: &str) -> Result<String, StoreError> {
        self.store.find_profile(profile_id).map(|p| p.vk_pem)
    }
}
