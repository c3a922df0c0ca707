//! # ECDSA Verification (secp256k1, SHA-512)
//!
//! Pure domain logic for verifying detached envelope signatures.
//!
//! ## Wire Encodings
//!
//! - Public keys arrive as PEM SubjectPublicKeyInfo text.
//! - Signatures arrive either DER-encoded (what Android keystores produce) or
//!   as fixed-width `r || s` (64 bytes). DER input is converted to the
//!   fixed-width form before verification.
//!
//! ## Security Notes
//!
//! - **Malleability**: a high-S signature is normalized to its low-S twin
//!   before verification, so both encodings of the same signature verify
//!   identically and k256's low-S requirement is met.
//! - The message digest is SHA-512, truncated to the curve order width by
//!   the standard bits-to-field conversion.

use super::errors::SignatureError;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature, VerifyingKey};
use k256::pkcs8::DecodePublicKey;
use sha2::{Digest, Sha512};

/// Length of a fixed-width secp256k1 signature (`r || s`).
pub const FIXED_SIGNATURE_LEN: usize = 64;

// =============================================================================
// CORE VERIFICATION FUNCTIONS
// =============================================================================

/// Parse a PEM-encoded secp256k1 public key.
pub fn parse_verifying_key(vk_pem: &str) -> Result<VerifyingKey, SignatureError> {
    VerifyingKey::from_public_key_pem(vk_pem.trim())
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))
}

/// Verify a wire-encoded signature over `message`.
///
/// Steps:
/// 1. Decode the signature (DER, else fixed-width)
/// 2. Normalize S into the lower half of the curve order
/// 3. Hash the message with SHA-512
/// 4. Verify the prehash under `key`
pub fn verify_signature(
    key: &VerifyingKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), SignatureError> {
    let sig = signature_from_wire(signature)?;
    let sig = sig.normalize_s().unwrap_or(sig);

    let digest = Sha512::digest(message);

    key.verify_prehash(digest.as_slice(), &sig)
        .map_err(|_| SignatureError::VerificationFailed)
}

/// Decode a signature that is either DER or fixed-width.
fn signature_from_wire(bytes: &[u8]) -> Result<Signature, SignatureError> {
    if let Ok(sig) = Signature::from_der(bytes) {
        return Ok(sig);
    }
    if bytes.len() == FIXED_SIGNATURE_LEN {
        return Signature::from_slice(bytes).map_err(|_| SignatureError::InvalidFormat);
    }
    Err(SignatureError::InvalidFormat)
}

// =============================================================================
// DER <-> FIXED-WIDTH CODEC
// =============================================================================

/// Convert a DER signature into fixed-width `r || s`.
pub fn der_to_fixed(der: &[u8]) -> Result<[u8; FIXED_SIGNATURE_LEN], SignatureError> {
    let sig = Signature::from_der(der).map_err(|_| SignatureError::InvalidFormat)?;
    let mut fixed = [0u8; FIXED_SIGNATURE_LEN];
    fixed.copy_from_slice(&sig.to_bytes());
    Ok(fixed)
}

/// Convert fixed-width `r || s` into DER.
pub fn fixed_to_der(fixed: &[u8]) -> Result<Vec<u8>, SignatureError> {
    if fixed.len() != FIXED_SIGNATURE_LEN {
        return Err(SignatureError::InvalidFormat);
    }
    let sig = Signature::from_slice(fixed).map_err(|_| SignatureError::InvalidFormat)?;
    Ok(sig.to_der().as_bytes().to_vec())
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn test_verify_valid_der_signature() {
        let (sk, vk) = generate_keypair();
        let sig = sign_der(b"payload", &sk);

        assert!(verify_signature(&vk, b"payload", &sig).is_ok());
    }

    #[test]
    fn test_verify_valid_fixed_width_signature() {
        let (sk, vk) = generate_keypair();
        let fixed = der_to_fixed(&sign_der(b"payload", &sk)).unwrap();

        assert!(verify_signature(&vk, b"payload", &fixed).is_ok());
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let (sk, _) = generate_keypair();
        let (_, other_vk) = generate_keypair();
        let sig = sign_der(b"payload", &sk);

        assert_eq!(
            verify_signature(&other_vk, b"payload", &sig),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let (sk, vk) = generate_keypair();
        let sig = sign_der(b"payload", &sk);

        assert!(verify_signature(&vk, b"payload!", &sig).is_err());
    }

    #[test]
    fn test_garbage_signature_is_invalid_format() {
        let (_, vk) = generate_keypair();

        assert_eq!(
            verify_signature(&vk, b"payload", &[1, 2, 3]),
            Err(SignatureError::InvalidFormat)
        );
    }

    #[test]
    fn test_high_s_signature_still_verifies() {
        let (sk, vk) = generate_keypair();
        let sig = Signature::from_der(&sign_der(b"payload", &sk)).unwrap();
        let (r, s) = sig.split_scalars();
        let high = Signature::from_scalars(r, -*s).unwrap();

        assert!(verify_signature(&vk, b"payload", high.to_der().as_bytes()).is_ok());
    }

    #[test]
    fn test_der_fixed_roundtrip() {
        let (sk, _) = generate_keypair();
        let der = sign_der(b"payload", &sk);
        let fixed = der_to_fixed(&der).unwrap();

        assert_eq!(fixed_to_der(&fixed).unwrap(), der);
    }

    #[test]
    fn test_fixed_to_der_rejects_wrong_length() {
        assert_eq!(fixed_to_der(&[0u8; 63]), Err(SignatureError::InvalidFormat));
    }

    #[test]
    fn test_parse_pem_roundtrip() {
        let (_, vk) = generate_keypair();
        let parsed = parse_verifying_key(&pem_of(&vk)).unwrap();

        assert_eq!(parsed, vk);
    }

    #[test]
    fn test_parse_pem_rejects_garbage() {
        assert!(matches!(
            parse_verifying_key("not a key"),
            Err(SignatureError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_verification_determinism_multiple_calls() {
        let (sk, vk) = generate_keypair();
        let sig = sign_der(b"m", &sk);

        for _ in 0..5 {
            assert!(verify_signature(&vk, b"m", &sig).is_ok());
        }
    }
}
