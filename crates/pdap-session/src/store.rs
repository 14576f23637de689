//! The session store: single owner of identity, tokens and redirect target.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::persistence::{NoPersistence, PersistedSession, SessionStorage};
use crate::state::{BrowsingState, SessionPhase, SessionState, StoredToken, UserProfile};
use crate::token::{TokenClaims, decode_claims};

/// Inner state protected by RwLock.
#[derive(Debug, Default)]
struct StoreInner {
    session: SessionState,
    profile: UserProfile,
    browsing: BrowsingState,
}

impl StoreInner {
    fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            session: self.session.clone(),
            profile: self.profile.clone(),
            browsing: self.browsing.clone(),
        }
    }
}

/// Owns the client's session state.
///
/// Shared as `Arc<SessionStore>` between the resource clients and the
/// route guard. Every change is written through to the storage backend;
/// write failures are logged and otherwise ignored, the in-memory state
/// stays authoritative.
#[derive(Debug)]
pub struct SessionStore {
    inner: RwLock<StoreInner>,
    storage: Box<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Create an in-memory session store.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_storage(NoPersistence, clock)
    }

    /// Create a session store backed by `storage`.
    ///
    /// The store starts empty; call [`SessionStore::restore`] to load the
    /// saved session.
    pub fn with_storage(storage: impl SessionStorage + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            storage: Box::new(storage),
            clock,
        }
    }

    /// Replace the in-memory state with what the storage backend holds.
    ///
    /// Must run before the first guarded navigation. Returns whether a
    /// saved session was found.
    pub fn restore(&self) -> Result<bool> {
        let Some(saved) = self.storage.load()? else {
            return Ok(false);
        };

        let mut inner = self.inner.write();
        // A redirect recorded before the restore is newer than the saved one.
        let pending = inner.session.redirect_to.take();
        inner.session = saved.session;
        if pending.is_some() {
            inner.session.redirect_to = pending;
        }
        inner.profile = saved.profile;
        inner.browsing = saved.browsing;

        debug!(user_id = ?inner.session.user_id, "Session restored");
        Ok(true)
    }

    /// Current time according to the store's clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Copy of the current session state.
    pub fn snapshot(&self) -> SessionState {
        self.inner.read().session.clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.inner.read().session.user_id.clone()
    }

    /// Whether a user is signed in. Token expiry is not considered.
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().session.user_id.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.read().session.phase(self.clock.now_ms())
    }

    /// Whether the refresh token can still be exchanged.
    pub fn can_refresh(&self) -> bool {
        let inner = self.inner.read();
        inner.session.user_id.is_some()
            && !inner.session.refresh_token.is_expired(self.clock.now_ms())
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.read().session.access_token.value.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.read().session.refresh_token.value.clone()
    }

    /// Decode a fresh access/refresh pair and sign the user in with it.
    ///
    /// Both tokens are decoded before anything changes, so a bad token
    /// leaves the previous session in place. The user id comes from the
    /// access token's subject.
    pub fn apply_tokens(&self, access_token: &str, refresh_token: &str) -> Result<TokenClaims> {
        let access = decode_claims(access_token)?;
        let refresh = decode_claims(refresh_token)?;

        let mut inner = self.inner.write();
        inner.session.user_id = Some(access.subject.clone());
        inner.session.access_token = StoredToken::new(access_token, access.expires_at_ms());
        inner.session.refresh_token = StoredToken::new(refresh_token, refresh.expires_at_ms());
        self.persist(&inner);

        info!(user_id = %access.subject, "Session authenticated");
        Ok(access)
    }

    /// Sign out: drop identity, tokens and profile.
    ///
    /// Returns the redirect target that was recorded before clearing.
    /// Browsing breadcrumbs are kept.
    pub fn clear(&self) -> Option<String> {
        let mut inner = self.inner.write();
        let redirect_to = inner.session.redirect_to.take();
        inner.session = SessionState::default();
        inner.profile = UserProfile::default();
        self.persist(&inner);

        info!("Session cleared");
        redirect_to
    }

    pub fn redirect_to(&self) -> Option<String> {
        self.inner.read().session.redirect_to.clone()
    }

    /// Record (or with `None`, forget) the path to restore after sign-in.
    pub fn set_redirect_to(&self, path: Option<String>) {
        debug!(redirect_to = ?path, "Redirect target updated");
        let mut inner = self.inner.write();
        inner.session.redirect_to = path;
        self.persist(&inner);
    }

    /// Remove and return the recorded redirect target.
    pub fn take_redirect_to(&self) -> Option<String> {
        let mut inner = self.inner.write();
        let path = inner.session.redirect_to.take();
        if path.is_some() {
            self.persist(&inner);
        }
        path
    }

    pub fn profile(&self) -> UserProfile {
        self.inner.read().profile.clone()
    }

    pub fn set_email(&self, email: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.profile.email = Some(email.into());
        self.persist(&inner);
    }

    pub fn browsing(&self) -> BrowsingState {
        self.inner.read().browsing.clone()
    }

    pub fn set_most_recent_search_ids(&self, ids: Vec<String>) {
        let mut inner = self.inner.write();
        inner.browsing.most_recent_search_ids = ids;
        self.persist(&inner);
    }

    pub fn set_previous_data_source_route(&self, route: Option<String>) {
        let mut inner = self.inner.write();
        inner.browsing.previous_data_source_route = route;
        self.persist(&inner);
    }

    fn persist(&self, inner: &StoreInner) {
        if let Err(e) = self.storage.save(&inner.to_persisted()) {
            warn!(error = %e, "Failed to persist session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{DecodeError, Error};
    use crate::persistence::FileStorage;
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use tempfile::TempDir;

    fn token(sub: &str, exp: i64) -> String {
        let payload = serde_json::json!({"sub": sub, "exp": exp});
        format!(
            "h.{}.s",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap())
        )
    }

    fn store_at(now_ms: i64) -> (Arc<ManualClock>, SessionStore) {
        let clock = Arc::new(ManualClock::new(now_ms));
        let store = SessionStore::new(clock.clone());
        (clock, store)
    }

    #[test]
    fn test_starts_anonymous() {
        let (_, store) = store_at(0);
        assert!(!store.is_authenticated());
        assert_eq!(store.phase(), SessionPhase::Anonymous);
        assert!(store.access_token().is_none());
        assert!(!store.can_refresh());
    }

    #[test]
    fn test_apply_tokens_sets_identity_and_expiry() {
        let (_, store) = store_at(1_000_000);
        let access = token("7", 2_000);
        let refresh = token("7", 9_000);

        let claims = store.apply_tokens(&access, &refresh).unwrap();
        assert_eq!(claims.subject, "7");

        let state = store.snapshot();
        assert_eq!(state.user_id.as_deref(), Some("7"));
        assert_eq!(state.access_token.value.as_deref(), Some(access.as_str()));
        assert_eq!(state.access_token.expires_at_ms, 2_000_000);
        assert_eq!(state.refresh_token.expires_at_ms, 9_000_000);
        assert_eq!(store.phase(), SessionPhase::Authenticated);
        assert!(store.can_refresh());
    }

    #[test]
    fn test_expired_phase() {
        let (clock, store) = store_at(0);
        store.apply_tokens(&token("7", 10), &token("7", 100)).unwrap();

        clock.set(10_000);
        assert_eq!(store.phase(), SessionPhase::Expired);
        assert!(store.can_refresh());

        clock.set(100_000);
        assert!(!store.can_refresh());
    }

    #[test]
    fn test_bad_token_leaves_session_untouched() {
        let (_, store) = store_at(0);
        store.apply_tokens(&token("7", 10), &token("7", 100)).unwrap();

        let err = store.apply_tokens(&token("8", 10), "garbage").unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::Malformed(1))));
        assert_eq!(store.user_id().as_deref(), Some("7"));
    }

    #[test]
    fn test_clear_always_resets() {
        let (_, store) = store_at(0);
        // Clearing an anonymous session is fine
        assert!(store.clear().is_none());

        store.apply_tokens(&token("7", 10), &token("7", 100)).unwrap();
        store.set_email("a@b.c");
        store.set_redirect_to(Some("/data-source/create".to_string()));
        store.set_most_recent_search_ids(vec!["1".to_string()]);

        let redirect = store.clear();
        assert_eq!(redirect.as_deref(), Some("/data-source/create"));
        assert_eq!(store.snapshot(), SessionState::default());
        assert_eq!(store.profile(), UserProfile::default());
        assert!(store.redirect_to().is_none());
        // Browsing history belongs to the browsing session
        assert_eq!(store.browsing().most_recent_search_ids, vec!["1"]);
    }

    #[test]
    fn test_restore_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let clock = Arc::new(ManualClock::new(0));

        {
            let store = SessionStore::with_storage(FileStorage::new(&path), clock.clone());
            store.apply_tokens(&token("7", 10), &token("7", 100)).unwrap();
            store.set_email("a@b.c");
        }

        let store = SessionStore::with_storage(FileStorage::new(&path), clock);
        assert!(!store.is_authenticated());
        assert!(store.restore().unwrap());
        assert_eq!(store.user_id().as_deref(), Some("7"));
        assert_eq!(store.profile().email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_restore_nothing_saved() {
        let (_, store) = store_at(0);
        assert!(!store.restore().unwrap());
    }

    #[test]
    fn test_redirect_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let clock = Arc::new(ManualClock::new(0));

        {
            let store = SessionStore::with_storage(FileStorage::new(&path), clock.clone());
            store.set_redirect_to(Some("/profile".to_string()));
        }

        let store = SessionStore::with_storage(FileStorage::new(&path), clock.clone());
        store.restore().unwrap();
        assert_eq!(store.take_redirect_to().as_deref(), Some("/profile"));
        assert!(store.redirect_to().is_none());

        // Taking it is saved too
        let store = SessionStore::with_storage(FileStorage::new(&path), clock);
        store.restore().unwrap();
        assert!(store.redirect_to().is_none());
    }

    #[test]
    fn test_restore_keeps_pending_redirect() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let clock = Arc::new(ManualClock::new(0));
        FileStorage::new(&path)
            .save(&PersistedSession::default())
            .unwrap();

        let store = SessionStore::with_storage(FileStorage::new(&path), clock);
        store.set_redirect_to(Some("/profile".to_string()));
        store.restore().unwrap();
        assert_eq!(store.redirect_to().as_deref(), Some("/profile"));
    }
}
