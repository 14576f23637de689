//! Error types for session operations.

/// Error raised when a bearer token cannot be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Token does not have the `header.payload.signature` shape.
    #[error("malformed token: expected 3 segments, found {0}")]
    Malformed(usize),

    /// Payload segment is not valid base64url.
    #[error("invalid token encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Payload is not a JSON object with the expected claims.
    #[error("invalid token payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A required claim is missing or has the wrong type.
    #[error("missing or invalid claim '{0}'")]
    Claim(&'static str),
}

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A token in a login or refresh response could not be decoded.
    #[error("token decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Error from the persistence backend.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
