//! Gateway signature verification.
//!
//! Izipay signs every notification by computing HMAC-SHA256 over the exact
//! `kr-answer` string and sending the hex digest in `kr-hash`. Verification
//! must run over the raw string as received: any re-serialization or decoding
//! changes the byte sequence and invalidates the signature.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verifies a gateway signature over the raw notification payload.
///
/// Computes HMAC-SHA256 of `raw_payload` with `key`, hex-decodes
/// `provided_digest_hex`, and compares the two in constant time. Returns
/// `false` for malformed input (bad hex, wrong length); never panics.
///
/// The verifier is key-agnostic: the callback channel passes the front HMAC
/// key, the IPN channel passes the account password.
pub fn verify(raw_payload: &str, provided_digest_hex: &str, key: &str) -> bool {
    if key.is_empty() {
        return false;
    }

    let provided = match hex::decode(provided_digest_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key");
    mac.update(raw_payload.as_bytes());
    let computed = mac.finalize().into_bytes();

    constant_time_compare(computed.as_slice(), &provided)
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected digest.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes the hex HMAC-SHA256 digest of a payload, as the gateway does
/// when producing `kr-hash`. Used by test fixtures.
#[cfg(test)]
pub fn sign(raw_payload: &str, key: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key");
    mac.update(raw_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
