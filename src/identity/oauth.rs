// SPDX-License-Identifier: MIT

//! Signed OAuth state parameter.
//!
//! The state carries the frontend URL to return to after the popup completes,
//! plus a timestamp, HMAC-signed so the callback can reject tampered or
//! replayed values. Format before base64: `redirect|timestamp_hex|sig_hex`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a state parameter before the callback rejects it.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

/// An OAuth flow ready to hand to the popup.
#[derive(Debug, Clone)]
pub struct OAuthRequest {
    /// Provider authorization URL, state included.
    pub authorize_url: String,
    /// The raw state value, for callers that build their own URL.
    pub state: String,
}

/// Why a state parameter was rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("state is not valid base64/utf-8")]
    Malformed,
    #[error("state signature mismatch")]
    BadSignature,
    #[error("state expired")]
    Expired,
}

/// Signs and verifies OAuth state values.
#[derive(Clone)]
pub struct StateSigner {
    key: Vec<u8>,
}

impl StateSigner {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    /// Produce a signed state embedding the redirect target.
    pub fn sign(&self, redirect: &str) -> String {
        let timestamp = now_millis();
        self.sign_at(redirect, timestamp)
    }

    fn sign_at(&self, redirect: &str, timestamp: u128) -> String {
        let payload = format!("{}|{:x}", redirect, timestamp);
        let signature = self.mac(payload.as_bytes());
        let signed = format!("{}|{}", payload, hex::encode(signature));
        URL_SAFE_NO_PAD.encode(signed.as_bytes())
    }

    /// Verify a state value and recover the redirect target.
    pub fn verify(&self, state: &str) -> Result<String, StateError> {
        self.verify_at(state, now_millis())
    }

    fn verify_at(&self, state: &str, now: u128) -> Result<String, StateError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(state)
            .map_err(|_| StateError::Malformed)?;
        let decoded = String::from_utf8(bytes).map_err(|_| StateError::Malformed)?;

        // redirect may itself contain '|'-free URLs only; split from the right
        // so the last two segments are always timestamp and signature.
        let (payload, sig_hex) = decoded.rsplit_once('|').ok_or(StateError::Malformed)?;
        let (redirect, ts_hex) = payload.rsplit_once('|').ok_or(StateError::Malformed)?;

        let claimed = hex::decode(sig_hex).map_err(|_| StateError::Malformed)?;
        let expected = self.mac(payload.as_bytes());
        if expected.ct_eq(claimed.as_slice()).unwrap_u8() != 1 {
            return Err(StateError::BadSignature);
        }

        let timestamp = u128::from_str_radix(ts_hex, 16).map_err(|_| StateError::Malformed)?;
        if now.saturating_sub(timestamp) > STATE_MAX_AGE_MS {
            return Err(StateError::Expired);
        }

        Ok(redirect.to_string())
    }

    fn mac(&self, data: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC key of any length");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

fn now_millis() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
