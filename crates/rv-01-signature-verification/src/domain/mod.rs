//! # Domain Layer
//!
//! Pure envelope and cryptographic logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod ecdsa;
pub mod encoding;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod priority;
