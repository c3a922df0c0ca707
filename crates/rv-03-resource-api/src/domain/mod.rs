//! # Domain Layer
//!
//! Configuration, request access, payload fields, and view definitions.

pub mod config;
pub mod errors;
pub mod payload;
pub mod request;
pub mod views;
