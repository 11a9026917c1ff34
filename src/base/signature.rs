//! HMAC verification for inbound webhook signatures.
//!
//! The helpdesk platform signs the raw request body with a shared secret and
//! sends the digest as lowercase hex in the [`SIGNATURE_HEADER`] header. The
//! signature is recomputed over the exact bytes received, never over
//! re-serialized JSON, and compared in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::types::RelayError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 of the raw request body.
pub const SIGNATURE_HEADER: &str = "x-helpdesk-signature";

/// Computes the lowercase hex HMAC-SHA256 of `payload` keyed by `secret`.
pub fn generate_hmac_hex(payload: &[u8], secret: &str) -> Result<String, RelayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| RelayError::Internal(anyhow::anyhow!("invalid signing secret")))?;

    mac.update(payload);

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies the signature claimed for `payload`.
///
/// `claimed` is the raw header value, or `None` when the header was absent.
/// An absent signature is [`RelayError::Unauthenticated`]; a present but
/// non-matching one is [`RelayError::Forbidden`].
pub fn verify_signature(payload: &[u8], claimed: Option<&str>, secret: &str) -> Result<(), RelayError> {
    let claimed = claimed.ok_or(RelayError::Unauthenticated)?;
    let expected = generate_hmac_hex(payload, secret)?;

    if timing_safe_eq(claimed, &expected) { Ok(()) } else { Err(RelayError::Forbidden) }
}

/// Timing-safe string comparison to prevent timing attacks.
fn timing_safe_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (a_byte, b_byte) in a.as_bytes().iter().zip(b.as_bytes()) {
        result |= a_byte ^ b_byte;
    }

    result == 0
}

// Tests.
