//! # Domain Layer
//!
//! View definitions and value shapes. No I/O.

pub mod directive;
pub mod errors;
pub mod value;
pub mod view_name;
pub mod view_set;
