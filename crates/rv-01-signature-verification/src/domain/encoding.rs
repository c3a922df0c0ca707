//! # Base64url and JSON Decoding
//!
//! Envelope fields are base64url strings. Clients differ on padding, so both
//! padded and unpadded forms decode; padding that is present must be correct.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::Value;

/// URL-safe engine accepting canonical padding or none.
const B64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64url string into raw bytes.
pub fn decode_b64url(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    B64URL.decode(input)
}

/// Encode bytes as unpadded base64url.
pub fn encode_b64url(input: impl AsRef<[u8]>) -> String {
    B64URL.encode(input)
}

/// Decode a base64url string whose content is JSON.
///
/// Returns a description of the first failure, either in the base64 layer or
/// in the JSON layer.
pub fn decode_b64url_json(input: &str) -> Result<Value, String> {
    let bytes = decode_b64url(input).map_err(|e| format!("bad base64url: {e}"))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("bad JSON: {e}"))
}
