//! # Resource Service
//!
//! Application service implementing [`ResourceApi`]: signed write pipelines
//! (`writes`), projected reads (`reads`), and the entity graph the projector
//! walks (`graph`).

mod graph;
mod reads;
mod writes;


pub use graph::Graph;
pub use writes::{DEVICE_REGISTER, PROFILE_CREATE, PROFILE_UPDATE, RESULT_SUBMIT};

use crate::adapters::clock::SystemClock;
use crate::adapters::keys::StoreKeyResolver;
use crate::domain::config::ApiConfig;
use crate::domain::errors::{ApiError, SetupError};
use crate::domain::request::ApiRequest;
use crate::domain::views::{Access, ViewCatalog};
use crate::ports::inbound::{Collection, ResourceApi};
use crate::ports::outbound::{Clock, EntityStore};
use rv_01_signature_verification::{
    EnvelopeVerificationApi, ParsedEnvelope, RequestError, SignatureVerificationService,
};
use rv_02_json_projection::{Projectable, Projector};
use serde_json::Value;
use shared_types::{EntityKind, Exp, User};
use std::sync::Arc;
use tracing::info;

/// Resource service over an entity store.
pub struct ResourceService<S: EntityStore, C: Clock = SystemClock> {
    store: Arc<S>,
    clock: C,
    verifier: SignatureVerificationService<StoreKeyResolver<S>>,
    views: ViewCatalog,
    projector: Projector,
    config: ApiConfig,
}

impl<S: EntityStore> ResourceService<S, SystemClock> {
    /// Service on the system clock.
    pub fn new(store: Arc<S>, config: ApiConfig) -> Result<Self, SetupError> {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: EntityStore, C: Clock> ResourceService<S, C> {
    /// Validate `config` and build the view catalog.
    pub fn with_clock(store: Arc<S>, clock: C, config: ApiConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let views = ViewCatalog::new()?;
        info!(
            timestamp_format = ?config.timestamp_format,
            max_body_bytes = config.max_body_bytes,
            "resource service ready"
        );
        Ok(Self {
            verifier: SignatureVerificationService::new(StoreKeyResolver::new(store.clone())),
            store,
            clock,
            views,
            projector: Projector::new(config.timestamp_format),
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn views(&self) -> &ViewCatalog {
        &self.views
    }

    /// Create an experimenter account. Accounts come from the identity
    /// provider; this is the hook it calls.
    pub fn create_user(&self, name: &str, email: &str) -> Result<User, ApiError> {
        let user = self.store.create_user(User::new(name, email))?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Create an experiment owned by `owner_id`. Names are unique.
    pub fn create_exp(&self, owner_id: &str, name: &str, description: &str) -> Result<Exp, ApiError> {
        self.store.find_user(owner_id)?;
        let exp = self
            .store
            .create_exp(Exp::new(name, description, owner_id, self.clock.now()))?;
        info!(exp_id = %exp.id, owner_id, "experiment created");
        Ok(exp)
    }

    fn graph(&self) -> Graph<'_> {
        Graph::new(&*self.store, &self.views)
    }

    /// Parse a signed body, enforcing the size limit.
    fn parse_envelope(&self, request: &ApiRequest) -> Result<ParsedEnvelope, RequestError> {
        let body = request.body();
        if body.len() > self.config.max_body_bytes {
            return Err(RequestError::MalformedJson(format!(
                "body of {} bytes exceeds limit of {}",
                body.len(),
                self.config.max_body_bytes
            )));
        }
        self.verifier.parse(body)
    }

    /// Render `node` through the view of `access`. An empty projection is
    /// `null`.
    fn render<P: Projectable>(&self, node: &P, access: Access) -> Result<Value, ApiError> {
        Ok(self
            .projector
            .to_view(node, access.view())?
            .map(Value::Object)
            .unwrap_or(Value::Null))
    }
}

impl<S: EntityStore, C: Clock> ResourceApi for ResourceService<S, C> {
    fn register_device(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let verified = self.verify_device_registration(request)?;
        let device = self.apply_device_registration(verified)?;
        self.render(&self.graph().device(device), Access::Private)
    }

    fn create_profile(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let verified = self.verify_profile_creation(request)?;
        let profile = self.apply_profile_creation(verified)?;
        self.render(&self.graph().profile(profile), Access::Private)
    }

    fn update_profile(&self, profile_id: &str, request: &ApiRequest) -> Result<Value, ApiError> {
        let verified = self.verify_profile_update(profile_id, request)?;
        let profile = self.apply_profile_update(profile_id, verified)?;
        self.render(&self.graph().profile(profile), Access::Private)
    }

    fn create_result(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let verified = self.verify_result_submission(request)?;
        let result = self.apply_result_submission(verified)?;
        self.render(&self.graph().result(result), Access::Private)
    }

    fn get(&self, kind: EntityKind, id: &str, request: &ApiRequest) -> Result<Value, ApiError> {
        self.read_one(kind, id, request)
    }

    fn list(
        &self,
        collection: Collection,
        parent_id: &str,
        request: &ApiRequest,
    ) -> Result<Value, ApiError> {
        self.read_collection(collection, parent_id, request)
    }
}
