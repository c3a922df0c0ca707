//! # Reverie Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (envelope verification, projection)
//! └── src/
//!     ├── fixtures.rs   # Key holders, signed envelopes, tracing setup
//!     └── integration/  # End-to-end flows through the resource service
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rv-tests
//! cargo test -p rv-tests integration::
//! cargo bench -p rv-tests
//! ```

pub mod fixtures;
pub mod integration;
