//! # Signature Verification (RV-01)
//!
//! Authenticates POST/PUT submissions from devices and profiles.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Envelope parsing, EC verification, defect ordering. No I/O.
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound interfaces
//! - **Service Layer** (`service.rs`): Wires domain logic to the key resolver port
//!
//! ## Envelope
//!
//! ```text
//! {
//!   "payload": "<base64url(JSON)>",
//!   "signatures": [
//!     {"protected": "<base64url(JSON header)>", "signature": "<base64url(DER | r||s)>"},
//!     ...                                        (one or two entries)
//!   ]
//! }
//! ```
//!
//! Each signature covers `protected || "." || payload` (the base64url strings),
//! hashed with SHA-512 and verified on secp256k1.
//!
//! ## Defect Priority
//!
//! A request with several defects reports exactly one of them. Each endpoint
//! owns a `CheckOrder`; see `domain::priority`.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::ecdsa::{der_to_fixed, fixed_to_der, parse_verifying_key, verify_signature};
pub use domain::encoding::{decode_b64url, decode_b64url_json, encode_b64url};
pub use domain::entities::{
    DetachedSignature, DualVerification, ParsedEnvelope, SignedEnvelope, SignerRole,
};
pub use domain::envelope::{parse_envelope, verify_dual, verify_single};
pub use domain::errors::{ConflictKind, DefectKind, RequestError, SignatureError};
pub use domain::priority::{CheckOrder, Defects};
pub use ports::inbound::EnvelopeVerificationApi;
pub use ports::outbound::VerifyingKeyResolver;
pub use service::SignatureVerificationService;
