//! Errors from API calls and the session work around them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure: connect, timeout, TLS, body read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bad API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Any non-2xx status without a dedicated variant.
    #[error("PDAP API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// 401 from the API.
    #[error("unauthorized: {0}")]
    Auth(String),

    /// 404 from the API.
    #[error("not found: {0}")]
    NotFound(String),

    /// A resource id that cannot be a single path segment.
    #[error("invalid id: {0:?}")]
    InvalidId(String),

    /// The client was built or called without something it needs.
    #[error("client misconfigured: {0}")]
    Config(String),

    /// A token from login or refresh had an unreadable payload.
    #[error("cannot decode token: {0}")]
    Decode(#[from] pdap_session::DecodeError),

    /// The refresh exchange failed. Holds the server's message when it sent one.
    #[error("could not refresh session: {0}")]
    Refresh(String),

    /// A user-mode call was made without a signed-in user.
    #[error("not signed in")]
    NotAuthenticated,

    /// Saving or loading the session failed.
    #[error("session storage: {0}")]
    Session(String),
}

impl From<pdap_session::Error> for Error {
    fn from(err: pdap_session::Error) -> Self {
        match err {
            pdap_session::Error::Decode(e) => Error::Decode(e),
            pdap_session::Error::Persistence(msg) => Error::Session(msg),
        }
    }
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// 401/403 responses, plus calls refused locally for lack of a user.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_) | Error::NotAuthenticated)
            || matches!(self, Error::Api { status: 401 | 403, .. })
    }

    /// 5xx responses.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// Message the server sent with a failed response, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::Api { message, .. } | Error::Auth(message) | Error::NotFound(message) => {
                Some(message)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// `{"message": ...}` body the API sends with failures.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: String,
}
