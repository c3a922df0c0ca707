//! # JSON Projection (RV-02)
//!
//! Derives serialization-ready JSON from entities using named, declarative
//! views.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): view names, directives, view sets, values
//! - **Ports Layer** (`ports/`): the `Projectable` capability entities implement
//! - **Service Layer** (`service.rs`): the `Projector` engine
//!
//! ## Views
//!
//! A view name is a chain of segments, `_jsonable_private_ext`. Requesting a
//! view resolves to the longest defined prefix of the requested chain
//! (`_jsonable_private_ext_ext` falls back to `_jsonable_private_ext`), and
//! the directives of every defined prefix of the resolved name are
//! accumulated, shortest first. Missing intermediate prefixes are skipped.
//!
//! ## Directives
//!
//! | Source form        | Kind    | Output                                   |
//! |--------------------|---------|------------------------------------------|
//! | `name`             | field   | `name` (or a renamed key)                |
//! | `n_things`         | count   | number of elements in `things`           |
//! | `/^reg_([0-9])$/`  | pattern | template expansion over stored fields    |
//!
//! ## Failures
//!
//! - `NoViewDefined`: no prefix of the requested name is defined. Fatal.
//! - `EmptyProjection`: the resolved view has no directives. The top-level
//!   entry points turn it into `None`; a nested entity that projects empty is
//!   left out of its parent.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::directive::{Directive, DirectiveSpec};
pub use domain::errors::{ProjectionError, ViewError};
pub use domain::value::{TimestampFormat, Value};
pub use domain::view_name::ViewName;
pub use domain::view_set::{ResolvedView, ViewSet, ViewSetBuilder};
pub use ports::Projectable;
pub use service::Projector;

/// JSON object produced by a projection. Keys keep directive order.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
