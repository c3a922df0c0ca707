//! # Envelope Parsing and Signer Matching
//!
//! `parse_envelope` reports only the two highest-priority defect classes
//! (`MalformedJson`, `MalformedSignature`). Everything below them is ranked by
//! the endpoint's own `CheckOrder`.

use super::ecdsa::verify_signature;
use super::encoding::{decode_b64url, decode_b64url_json};
use super::entities::{DualVerification, ParsedEnvelope, SignedEnvelope};
use super::errors::RequestError;
use k256::ecdsa::VerifyingKey;
use serde_json::Value;

/// Parse a raw request body into a `ParsedEnvelope`.
///
/// ## Errors
///
/// - `MalformedJson`: the body is not JSON at all
/// - `MalformedSignature`: wrong shape, missing keys, bad base64url, a payload
///   that does not decode to JSON, a protected header that is not a JSON
///   object, or zero signatures
pub fn parse_envelope(body: &[u8]) -> Result<ParsedEnvelope, RequestError> {
    let raw: Value =
        serde_json::from_slice(body).map_err(|e| RequestError::MalformedJson(e.to_string()))?;

    let envelope: SignedEnvelope = serde_json::from_value(raw)
        .map_err(|e| RequestError::MalformedSignature(format!("bad envelope: {e}")))?;

    if envelope.signatures.is_empty() {
        return Err(RequestError::MalformedSignature(
            "no signatures in envelope".into(),
        ));
    }

    let payload = decode_b64url_json(&envelope.payload_b64)
        .map_err(|e| RequestError::MalformedSignature(format!("payload: {e}")))?;

    let mut signature_bytes = Vec::with_capacity(envelope.signatures.len());
    for (index, sig) in envelope.signatures.iter().enumerate() {
        let header = decode_b64url_json(&sig.protected_header_b64).map_err(|e| {
            RequestError::MalformedSignature(format!("signature {index} header: {e}"))
        })?;
        if !header.is_object() {
            return Err(RequestError::MalformedSignature(format!(
                "signature {index} header is not an object"
            )));
        }

        let bytes = decode_b64url(&sig.signature_b64).map_err(|e| {
            RequestError::MalformedSignature(format!("signature {index}: bad base64url: {e}"))
        })?;
        signature_bytes.push(bytes);
    }

    Ok(ParsedEnvelope {
        envelope,
        payload,
        signature_bytes,
    })
}

/// Whether signature `index` verifies under `key`.
fn signature_verifies(parsed: &ParsedEnvelope, index: usize, key: &VerifyingKey) -> bool {
    match (parsed.signing_input(index), parsed.signature_bytes.get(index)) {
        (Some(input), Some(sig)) => verify_signature(key, &input, sig).is_ok(),
        _ => false,
    }
}

/// Verify the first signature under the profile (or submitted) key.
pub fn verify_single(parsed: &ParsedEnvelope, key: &VerifyingKey) -> bool {
    signature_verifies(parsed, 0, key)
}

/// Whether either of the first two signatures verifies under `key`.
pub fn verify_any(parsed: &ParsedEnvelope, key: &VerifyingKey) -> bool {
    (0..parsed.signature_count().min(2)).any(|index| signature_verifies(parsed, index, key))
}

/// Match the first two signatures against the profile and device keys.
///
/// Signatures may arrive in either order. Both assignments are tried and the
/// better one is reported, so swapping the signatures never changes the
/// outcome. A valid configuration needs one signature per key.
pub fn verify_dual(
    parsed: &ParsedEnvelope,
    profile_key: &VerifyingKey,
    device_key: &VerifyingKey,
) -> DualVerification {
    let straight = DualVerification {
        profile_valid: signature_verifies(parsed, 0, profile_key),
        device_valid: signature_verifies(parsed, 1, device_key),
    };
    if straight.all_valid() {
        return straight;
    }

    let crossed = DualVerification {
        profile_valid: signature_verifies(parsed, 1, profile_key),
        device_valid: signature_verifies(parsed, 0, device_key),
    };

    DualVerification::best(straight, crossed)
}

// =============================================================================
// TEST HELPERS
// =============================================================================
