//! Webhook signature verification.
//!
//! Inbound webhooks carry a `Tourline-Signature` header of the form
//! `t=<unix seconds>,v1=<base64 mac>`, where the MAC is HMAC-SHA256 over
//! `"{t}.{raw body}"` keyed with the shared webhook secret. Verification
//! checks the MAC and rejects timestamps outside the tolerance window to
//! bound replay.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Why signature verification failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    /// Header is missing a part or not in `t=...,v1=...` form.
    MalformedHeader,
    /// Timestamp is outside the tolerance window.
    StaleTimestamp,
    /// MAC does not match the payload.
    Mismatch,
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedHeader => f.write_str("malformed signature header"),
            Self::StaleTimestamp => f.write_str("signature timestamp outside tolerance"),
            Self::Mismatch => f.write_str("signature mismatch"),
        }
    }
}

impl std::error::Error for SignatureError {}

/// Verifies `header` against `body` with the shared `secret`.
///
/// `now_unix` is the server's current unix time; `tolerance_secs` bounds
/// the accepted clock skew in either direction.
///
/// # Errors
///
/// Returns a [`SignatureError`] naming the first failing check.
pub fn verify(
    secret: &[u8],
    header: &str,
    body: &[u8],
    now_unix: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let (timestamp, sig_part) = parse_header(header)?;

    // Widen before subtracting: a hostile timestamp must not overflow.
    let skew = (i128::from(now_unix) - i128::from(timestamp)).abs();
    if skew > i128::from(tolerance_secs) {
        return Err(SignatureError::StaleTimestamp);
    }

    let expected = URL_SAFE_NO_PAD
        .decode(sig_part)
        .map_err(|_| SignatureError::MalformedHeader)?;

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::MalformedHeader)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Computes the signature header for `body` at `timestamp`. Used by the
/// provider simulator in tests; the production peer is the provider itself.
///
/// # Errors
///
/// Returns [`SignatureError::MalformedHeader`] if the secret is unusable
/// as an HMAC key (never happens for HMAC-SHA256, which accepts any length).
pub fn sign(secret: &[u8], body: &[u8], timestamp: i64) -> Result<String, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::MalformedHeader)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("t={timestamp},v1={sig}"))
}

fn parse_header(header: &str) -> Result<(i64, &str), SignatureError> {
    let mut timestamp = None;
    let mut sig = None;
    for part in header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => {
                timestamp = value.parse::<i64>().ok();
            }
            Some(("v1", value)) => {
                sig = Some(value);
            }
            _ => {}
        }
    }
    match (timestamp, sig) {
        (Some(t), Some(s)) => Ok((t, s)),
        _ => Err(SignatureError::MalformedHeader),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"whsec_test_secret";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    #[test]
    fn signed_payload_verifies() {
        let Ok(header) = sign(SECRET, BODY, 1_700_000_000) else {
            panic!("signing failed");
        };
        assert_eq!(verify(SECRET, &header, BODY, 1_700_000_010, 300), Ok(()));
    }

    #[test]
    fn tampered_body_rejected() {
        let Ok(header) = sign(SECRET, BODY, 1_700_000_000) else {
            panic!("signing failed");
        };
        let tampered = br#"{"id":"evt_1","type":"checkout.session.expired"}"#;
        assert_eq!(
            verify(SECRET, &header, tampered, 1_700_000_010, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn wrong_secret_rejected() {
        let Ok(header) = sign(SECRET, BODY, 1_700_000_000) else {
            panic!("signing failed");
        };
        assert_eq!(
            verify(b"whsec_other", &header, BODY, 1_700_000_010, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn stale_timestamp_rejected() {
        let Ok(header) = sign(SECRET, BODY, 1_700_000_000) else {
            panic!("signing failed");
        };
        assert_eq!(
            verify(SECRET, &header, BODY, 1_700_000_000 + 301, 300),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn future_timestamp_outside_tolerance_rejected() {
        let Ok(header) = sign(SECRET, BODY, 1_700_000_000) else {
            panic!("signing failed");
        };
        assert_eq!(
            verify(SECRET, &header, BODY, 1_700_000_000 - 301, 300),
            Err(SignatureError::StaleTimestamp)
        );
    }

    #[test]
    fn malformed_headers_rejected() {
        for header in ["", "t=abc,v1=xyz", "v1=onlysig", "t=12345", "garbage"] {
            assert_eq!(
                verify(SECRET, header, BODY, 0, i64::MAX),
                Err(SignatureError::MalformedHeader),
                "header {header:?} should be malformed"
            );
        }
    }

    #[test]
    fn timestamp_is_part_of_the_mac() {
        // Replaying the MAC under a different timestamp must fail even
        // inside the tolerance window.
        let Ok(header) = sign(SECRET, BODY, 1_700_000_000) else {
            panic!("signing failed");
        };
        let Some(sig) = header.split_once(",v1=").map(|(_, s)| s) else {
            panic!("header format");
        };
        let replayed = format!("t={},v1={sig}", 1_700_000_100);
        assert_eq!(
            verify(SECRET, &replayed, BODY, 1_700_000_100, 300),
            Err(SignatureError::Mismatch)
        );
    }
}
