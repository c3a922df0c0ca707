//! Shared fixtures: key holders that sign envelopes the way a phone does.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};
use k256::pkcs8::{EncodePublicKey, LineEnding};
use rv_01_signature_verification::encode_b64url;
use serde_json::{json, Value};
use sha2::{Digest, Sha512};
use shared_types::key_id_for;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Protected header carried by every test signature.
pub const PROTECTED_HEADER: &[u8] = br#"{"alg":"ES512"}"#;

/// Signature encoding placed in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureForm {
    Der,
    Fixed,
}

/// A device or profile key pair.
pub struct KeyHolder {
    key: SigningKey,
    pub pem: String,
}

impl KeyHolder {
    pub fn generate() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let pem = key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .expect("PEM encoding of a fresh key");
        Self { key, pem }
    }

    pub fn id(&self) -> String {
        key_id_for(&self.pem)
    }

    pub fn sign(&self, message: &[u8], form: SignatureForm) -> Vec<u8> {
        let digest = Sha512::digest(message);
        let sig: Signature = self
            .key
            .sign_prehash(digest.as_slice())
            .expect("prehash signing");
        match form {
            SignatureForm::Der => sig.to_der().as_bytes().to_vec(),
            SignatureForm::Fixed => sig.to_bytes().to_vec(),
        }
    }
}

impl Default for KeyHolder {
    fn default() -> Self {
        Self::generate()
    }
}

/// Envelope body over `payload`, one signature per holder, in order.
pub fn envelope(payload: &Value, signers: &[&KeyHolder], form: SignatureForm) -> Vec<u8> {
    let payload_b64 = encode_b64url(payload.to_string());
    let protected = encode_b64url(PROTECTED_HEADER);
    let signing_input = format!("{protected}.{payload_b64}");
    let signatures: Vec<Value> = signers
        .iter()
        .map(|holder| {
            json!({
                "protected": protected,
                "signature": encode_b64url(holder.sign(signing_input.as_bytes(), form)),
            })
        })
        .collect();
    json!({"payload": payload_b64, "signatures": signatures})
        .to_string()
        .into_bytes()
}

/// DER-signed envelope body.
pub fn der_envelope(payload: &Value, signers: &[&KeyHolder]) -> Vec<u8> {
    envelope(payload, signers, SignatureForm::Der)
}

static TRACING: Once = Once::new();

/// Install a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
