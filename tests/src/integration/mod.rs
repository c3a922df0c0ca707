//! # Integration Tests
//!
//! End-to-end flows through `ResourceService`: envelope verification (rv-01),
//! view projection (rv-02) and the entity store working together.

pub mod flows;
