//! # Shared Types Crate
//!
//! This crate contains the domain entities of the experiment platform and the
//! key-holder capability used by signed submissions.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate entity types are defined here.
//! - **Identity Is the Key**: Devices and profiles are identified by the
//!   SHA-256 hex digest of their PEM-encoded public key. Keys never rotate.
//! - **References by Id**: Entities hold the ids of related entities, never
//!   the entities themselves. Navigation happens at projection time.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
