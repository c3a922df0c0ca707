//! # Ports Layer
//!
//! - `inbound`: the API offered to route handlers
//! - `outbound`: persistence and time collaborators

pub mod inbound;
pub mod outbound;
