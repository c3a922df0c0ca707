//! # Adapters Layer
//!
//! - `memory`: in-memory entity store
//! - `clock`: system and fixed clocks
//! - `keys`: stored-key lookup for signature verification

pub mod clock;
pub mod keys;
pub mod memory;

pub use clock::{FixedClock, SystemClock};
pub use keys::StoreKeyResolver;
pub use memory::InMemoryEntityStore;
