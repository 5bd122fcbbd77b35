//! HMAC-SHA256 request signing.
//!
//! Every authenticated call carries two headers:
//!
//! ```text
//! X-API-Signature: hex(HMAC-SHA256(secret, "METHOD:PATH:TIMESTAMP:BODY"))
//! X-API-Timestamp: <unix seconds>
//! ```
//!
//! `PATH` is the URL path only (no scheme, host or query) and `BODY` is the
//! exact request body bytes, or the empty string for bodiless requests. The
//! server recomputes the same string and rejects mismatches and timestamps
//! outside its replay window, so a fresh timestamp is minted for every call.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::Doc2MdError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the lowercase hex signature.
pub const SIGNATURE_HEADER: &str = "X-API-Signature";

/// Header carrying the decimal Unix timestamp.
pub const TIMESTAMP_HEADER: &str = "X-API-Timestamp";

/// Maximum clock skew the backend accepts, in seconds.
pub const REPLAY_WINDOW_SECS: u64 = 300;

/// Source of wall-clock seconds for request timestamps.
pub trait Clock: Send + Sync {
    /// Current Unix time in whole seconds.
    fn unix_seconds(&self) -> u64;
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// A clock frozen at one instant. Useful in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_seconds(&self) -> u64 {
        self.0
    }
}

/// Signature and timestamp for one outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub signature: String,
    pub timestamp: u64,
}

impl SignedRequest {
    /// The two authentication headers, ready to attach.
    pub fn headers(&self) -> [(&'static str, String); 2] {
        [
            (SIGNATURE_HEADER, self.signature.clone()),
            (TIMESTAMP_HEADER, self.timestamp.to_string()),
        ]
    }
}

/// Signs requests with the shared secret.
///
/// The key is absorbed into an HMAC state once at construction; each
/// signature clones that state, so signing never fails and the raw secret is
/// not retained.
#[derive(Clone)]
pub struct RequestSigner {
    mac: HmacSha256,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    /// Create a signer using the system clock.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, Doc2MdError> {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Create a signer with an injected clock.
    pub fn with_clock(secret: impl AsRef<[u8]>, clock: Arc<dyn Clock>) -> Result<Self, Doc2MdError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(Doc2MdError::InvalidConfig(
                "signing secret must not be empty".into(),
            ));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| Doc2MdError::InvalidConfig(format!("signing secret rejected: {e}")))?;
        Ok(Self { mac, clock })
    }

    /// Sign a request using the current time.
    pub fn sign(&self, method: &str, path: &str, body: &str) -> SignedRequest {
        let timestamp = self.clock.unix_seconds();
        let signature = self.sign_at(method, path, timestamp, body);
        debug!("Signed {} {} at {}", method.to_ascii_uppercase(), path, timestamp);
        SignedRequest {
            signature,
            timestamp,
        }
    }

    /// Sign a request for an explicit timestamp. Pure.
    pub fn sign_at(&self, method: &str, path: &str, timestamp: u64, body: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(canonical_string(method, path, timestamp, body).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check a signature the way the backend does: the timestamp must lie
    /// within [`REPLAY_WINDOW_SECS`] of now and the signature must match in
    /// constant time.
    pub fn verify(
        &self,
        signature: &str,
        method: &str,
        path: &str,
        timestamp: u64,
        body: &str,
    ) -> bool {
        let now = self.clock.unix_seconds();
        if now.abs_diff(timestamp) > REPLAY_WINDOW_SECS {
            return false;
        }
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(canonical_string(method, path, timestamp, body).as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

/// `METHOD:PATH:TIMESTAMP:BODY` with the method upper-cased.
pub fn canonical_string(method: &str, path: &str, timestamp: u64, body: &str) -> String {
    format!("{}:{}:{}:{}", method.to_ascii_uppercase(), path, timestamp, body)
}
