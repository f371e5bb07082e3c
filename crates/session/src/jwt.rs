//! Access token inspection
//!
//! Decodes the payload segment of a JWT to read its claims. This is
//! parsing, not verification: nothing here checks the signature, and
//! nothing here may be treated as a trust decision. The server verifies
//! every token on every request; the client only reads the claims to know
//! when to schedule a refresh and which controls to render.

use agora_core::Role;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::Deserialize;

/// Claims the Agora server puts into access tokens.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Account id of the token's owner
    #[serde(alias = "userId")]
    pub sub: String,

    #[serde(default)]
    pub role: Option<Role>,

    /// Expiry as seconds since the Unix epoch
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the claims of `token` without verifying anything.
///
/// Returns `None` for any token that is not three dot-separated segments
/// with a base64url JSON object in the middle. Trailing `=` padding is
/// tolerated even though canonical JWTs omit it.
pub fn decode(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Whether `token` is expired right now.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now().timestamp())
}

/// Whether `token` is expired at `now` (seconds since the Unix epoch).
///
/// A token that cannot be decoded counts as expired. A decodable token
/// without an `exp` claim never expires. Expiry is inclusive: a token is
/// already expired at the exact second of its `exp`.
pub fn is_expired_at(token: &str, now: i64) -> bool {
    match decode(token) {
        None => true,
        Some(claims) => claims.exp.is_some_and(|exp| exp <= now),
    }
}

/// Role claim of `token`, if it decodes and carries one.
pub fn role(token: &str) -> Option<Role> {
    decode(token).and_then(|claims| claims.role)
}

/// Account id claim of `token`, if it decodes.
pub fn user_id(token: &str) -> Option<String> {
    decode(token).map(|claims| claims.sub)
}
