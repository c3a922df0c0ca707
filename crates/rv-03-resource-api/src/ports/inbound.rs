//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::ApiError;
use crate::domain::request::ApiRequest;
use serde_json::Value;
use shared_types::EntityKind;

/// Related collections exposed for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Experiments owned by a user
    ExpsOfUser,
    /// Profiles enrolled in an experiment
    ProfilesOfExp,
    /// Profiles bound to a device
    ProfilesOfDevice,
    /// Results submitted by a profile
    ResultsOfProfile,
}

impl Collection {
    /// Kind of the entity owning the collection.
    pub fn parent_kind(&self) -> EntityKind {
        match self {
            Collection::ExpsOfUser => EntityKind::User,
            Collection::ProfilesOfExp => EntityKind::Exp,
            Collection::ProfilesOfDevice => EntityKind::Device,
            Collection::ResultsOfProfile => EntityKind::Profile,
        }
    }
}

/// Resource API consumed by route handlers.
///
/// Writes take a signed envelope as request body and answer with the private
/// projection of the written entity. Reads answer with the public or private
/// projection depending on the caller.
pub trait ResourceApi: Send + Sync {
    /// Register a device signed by its own key.
    fn register_device(&self, request: &ApiRequest) -> Result<Value, ApiError>;

    /// Create a profile signed by its own key, optionally co-signed by a
    /// registered device.
    fn create_profile(&self, request: &ApiRequest) -> Result<Value, ApiError>;

    /// Update a profile, signed by its stored key (and the device key when
    /// binding a device).
    fn update_profile(&self, profile_id: &str, request: &ApiRequest) -> Result<Value, ApiError>;

    /// Submit a result signed by the profile key.
    fn create_result(&self, request: &ApiRequest) -> Result<Value, ApiError>;

    /// Projection of one entity. An empty projection is `null`.
    fn get(&self, kind: EntityKind, id: &str, request: &ApiRequest) -> Result<Value, ApiError>;

    /// Projection of a related collection, as a JSON array.
    fn list(
        &self,
        collection: Collection,
        parent_id: &str,
        request: &ApiRequest,
    ) -> Result<Value, ApiError>;
}
