//! # Resource API (RV-03)
//!
//! Signed write pipelines and projected reads over users, experiments,
//! devices, profiles, and results.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): configuration, request accessor, payload
//!   fields, view catalog, errors
//! - **Ports Layer** (`ports/`): `ResourceApi` (inbound), `EntityStore` and
//!   `Clock` (outbound)
//! - **Adapters Layer** (`adapters/`): in-memory store, clocks, stored-key
//!   resolver
//! - **Service Layer** (`service/`): `ResourceService`
//!
//! ## Writes
//!
//! | Endpoint           | Payload key | Signatures               |
//! |--------------------|-------------|--------------------------|
//! | `register_device`  | `device`    | 1, by the submitted key  |
//! | `create_profile`   | `profile`   | 1, or 2 with a device    |
//! | `update_profile`   | `profile`   | 1, or 2 with a device    |
//! | `create_result`    | `result`    | 1, by the stored profile |
//!
//! Every write reports at most one defect, chosen by the endpoint's own
//! `CheckOrder` (see `service::writes`). Nothing is written unless every
//! check passes.
//!
//! ## Device binding
//!
//! A profile's device is set at most once. The store applies the binding as
//! a single conditional update and fails with `DeviceAlreadySet` if the
//! profile was bound in the meantime.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

pub use adapters::{FixedClock, InMemoryEntityStore, StoreKeyResolver, SystemClock};
pub use domain::config::ApiConfig;
pub use domain::errors::{ApiError, ConfigError, SetupError};
pub use domain::payload::{
    DeviceSubmission, ProfileSubmission, ProfileUpdate, ResultSubmission, Verified,
};
pub use domain::request::ApiRequest;
pub use domain::views::{Access, ViewCatalog};
pub use ports::inbound::{Collection, ResourceApi};
pub use ports::outbound::{Clock, EntityStore};
pub use service::ResourceService;
