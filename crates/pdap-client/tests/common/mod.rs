//! Shared helpers for client integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use pdap_client::PdapClient;
use pdap_router::MemoryHistory;
use pdap_session::{CacheConfig, CacheState, ManualClock, SessionStore};
use serde_json::json;
use wiremock::MockServer;

pub const SERVICE_KEY: &str = "service-key";

/// Unsigned JWT with the given subject and expiry (epoch seconds).
pub fn jwt(sub: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({"sub": sub, "exp": exp}).to_string());
    format!("{header}.{payload}.signature")
}

/// Login response body for `sub` with the given expiries.
pub fn token_body(sub: &str, access_exp: i64, refresh_exp: i64) -> serde_json::Value {
    json!({
        "message": "Successfully logged in",
        "access_token": jwt(sub, access_exp),
        "refresh_token": jwt(sub, refresh_exp),
    })
}

pub struct Harness {
    pub client: PdapClient,
    pub clock: Arc<ManualClock>,
    pub history: Arc<MemoryHistory>,
}

impl Harness {
    pub fn session(&self) -> &Arc<SessionStore> {
        self.client.session()
    }

    /// Sign in without going through the API.
    pub fn sign_in(&self, sub: &str, access_exp: i64, refresh_exp: i64) {
        self.session()
            .apply_tokens(&jwt(sub, access_exp), &jwt(sub, refresh_exp))
            .unwrap();
    }
}

/// Client against `server` with a manual clock starting at `now_ms`.
pub fn harness(server: &MockServer, now_ms: i64) -> Harness {
    let clock = Arc::new(ManualClock::new(now_ms));
    let history = Arc::new(MemoryHistory::new("/"));
    let client = PdapClient::builder()
        .base_url(server.uri())
        .app_base_url("http://app.test")
        .service_key(SERVICE_KEY)
        .session(Arc::new(SessionStore::new(clock.clone())))
        .cache(Arc::new(CacheState::new(CacheConfig::default(), clock.clone())))
        .navigator(history.clone())
        .build()
        .unwrap();

    Harness {
        client,
        clock,
        history,
    }
}
