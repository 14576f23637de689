//! Bearer token claim decoding.
//!
//! Tokens come straight from the API's login and refresh responses, so the
//! payload is trusted as-is. Nothing here verifies a signature.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;

use crate::error::DecodeError;

/// Claims the session cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// The `sub` claim, rendered as a string.
    pub subject: String,
    /// The `exp` claim, in seconds since the Unix epoch.
    pub expires_at: i64,
}

impl TokenClaims {
    /// Expiry in milliseconds since the Unix epoch.
    pub fn expires_at_ms(&self) -> i64 {
        self.expires_at.saturating_mul(1000)
    }
}

/// Decode the subject and expiry from a `header.payload.signature` token.
pub fn decode_claims(token: &str) -> Result<TokenClaims, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::Malformed(segments.len()));
    }

    // Some issuers pad the segments; the no-pad engine rejects '='.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    let claims: serde_json::Map<String, Value> = serde_json::from_slice(&bytes)?;

    let subject = match claims.get("sub") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(DecodeError::Claim("sub")),
    };

    let expires_at = claims
        .get("exp")
        .and_then(|exp| exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64)))
        .ok_or(DecodeError::Claim("exp"))?;

    Ok(TokenClaims {
        subject,
        expires_at,
    })
}
