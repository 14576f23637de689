//! Session data model.

use serde::{Deserialize, Serialize};

/// A bearer token and its expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    /// Raw token, `None` when signed out.
    pub value: Option<String>,

    /// Expiry in epoch milliseconds.
    pub expires_at_ms: i64,
}

impl StoredToken {
    pub fn new(value: impl Into<String>, expires_at_ms: i64) -> Self {
        Self {
            value: Some(value.into()),
            expires_at_ms,
        }
    }

    /// A missing token counts as expired.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.value.is_none() || now_ms >= self.expires_at_ms
    }
}

/// Identity and credentials of the signed-in user.
///
/// `user_id` is set only by a successful login or refresh and cleared by
/// logout; the tokens always move together with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user_id: Option<String>,
    pub access_token: StoredToken,
    pub refresh_token: StoredToken,

    /// Path a gated navigation tried to reach before sign-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

/// Where the session sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nobody is signed in.
    Anonymous,
    /// Signed in with a live access token.
    Authenticated,
    /// Signed in, but the access token needs a refresh.
    Expired,
}

impl SessionState {
    pub fn phase(&self, now_ms: i64) -> SessionPhase {
        match self.user_id {
            None => SessionPhase::Anonymous,
            Some(_) if self.access_token.is_expired(now_ms) => SessionPhase::Expired,
            Some(_) => SessionPhase::Authenticated,
        }
    }
}

/// Profile details the client learns while signing in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: Option<String>,
}

/// Navigation breadcrumbs kept for the data source pager.
///
/// Survives logout; it belongs to the browsing session, not the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowsingState {
    /// Ids from the last search, for next/back paging.
    pub most_recent_search_ids: Vec<String>,

    /// Previous data source route, to tell paging direction.
    pub previous_data_source_route: Option<String>,
}
