//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that request handlers use
//! - **Outbound (Driven)**: Key lookup this crate needs

pub mod inbound;
pub mod outbound;
