//! Auth API: login, logout, token refresh.

use pdap_session::{SessionPhase, TokenClaims};
use tracing::{debug, info, warn};

use crate::client::{AuthMode, PdapClient};
use crate::error::{Error, Result};
use crate::types::{Credentials, GithubToken, LinkGithubRequest, RefreshRequest, TokenResponse};

/// Return path used by OAuth login when none is given.
pub const DEFAULT_OAUTH_RETURN_PATH: &str = "/sign-in";

/// Auth API client.
pub struct AuthApi {
    client: PdapClient,
}

impl AuthApi {
    pub(crate) fn new(client: PdapClient) -> Self {
        Self { client }
    }

    /// Log in with email and password.
    ///
    /// On success the session holds the new identity and tokens, the
    /// profile remembers `email`, and the navigator returns to the page a
    /// gated navigation was headed for. Failures leave the session unchanged.
    pub async fn login_with_email(&self, email: &str, password: &str) -> Result<TokenClaims> {
        let tokens: TokenResponse = self
            .client
            .post("login", AuthMode::None, &Credentials { email, password })
            .await?;

        let claims = self.store_tokens(&tokens)?;
        self.client.session().set_email(email);
        self.return_after_sign_in();
        Ok(claims)
    }

    /// Log in with a GitHub OAuth access token.
    pub async fn login_with_github(&self, gh_access_token: &str) -> Result<TokenClaims> {
        let tokens: TokenResponse = self
            .client
            .post(
                "auth/login-with-github",
                AuthMode::None,
                &GithubToken { gh_access_token },
            )
            .await?;

        let claims = self.store_tokens(&tokens)?;
        self.return_after_sign_in();
        Ok(claims)
    }

    /// Link the current account to a GitHub identity.
    ///
    /// The account is named by the profile email, or the user id when no
    /// email is known. The session is not changed.
    pub async fn link_account_with_github(
        &self,
        gh_access_token: &str,
    ) -> Result<serde_json::Value> {
        let session = self.client.session();
        let user_email = session
            .profile()
            .email
            .filter(|e| !e.is_empty())
            .or_else(|| session.user_id());

        self.client
            .post(
                "auth/link-to-github",
                AuthMode::None,
                &LinkGithubRequest {
                    gh_access_token,
                    user_email,
                },
            )
            .await
    }

    /// URL that starts the OAuth flow and returns to `return_path` in the app.
    pub fn oauth_url(&self, return_path: Option<&str>) -> Result<String> {
        let return_path = return_path.unwrap_or(DEFAULT_OAUTH_RETURN_PATH);
        let redirect_url = format!("{}{}", self.client.app_base_url(), return_path);
        let start = self.client.url("auth/oauth")?;

        Ok(format!(
            "{}?redirect_url={}",
            start,
            urlencoding::encode(&redirect_url)
        ))
    }

    /// Leave the app for the OAuth provider. Returns the URL navigated to.
    pub fn begin_oauth_login(&self, return_path: Option<&str>) -> Result<String> {
        let url = self.oauth_url(return_path)?;
        info!(%url, "Starting OAuth login");
        self.client.navigator().redirect_external(&url);
        Ok(url)
    }

    /// Exchange the refresh token for a new token pair.
    ///
    /// Returns `Ok(None)` without a network call when nobody is signed in.
    /// Server failures come back as [`Error::Refresh`] carrying the server's
    /// message; the session is left as it was.
    pub async fn refresh_access_token(&self) -> Result<Option<TokenClaims>> {
        let session = self.client.session();
        if !session.is_authenticated() {
            debug!("Refresh skipped, no session");
            return Ok(None);
        }

        let request = RefreshRequest {
            session_token: session.access_token(),
        };
        let tokens: TokenResponse = self
            .client
            .post("refresh-session", AuthMode::Refresh, &request)
            .await
            .map_err(|e| {
                Error::Refresh(
                    e.server_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string()),
                )
            })?;

        let claims = self.store_tokens(&tokens)?;
        debug!(user_id = %claims.subject, "Access token refreshed");
        Ok(Some(claims))
    }

    /// Refresh the access token if it has expired.
    ///
    /// When the refresh token is also expired, or the refresh fails, the
    /// user is logged out. The refresh error is still returned.
    pub async fn ensure_fresh(&self) -> Result<SessionPhase> {
        let session = self.client.session();
        match session.phase() {
            SessionPhase::Expired if session.can_refresh() => {
                match self.refresh_access_token().await {
                    Ok(_) => Ok(session.phase()),
                    Err(e) => {
                        warn!(error = %e, "Refresh failed, logging out");
                        self.logout();
                        Err(e)
                    }
                }
            }
            SessionPhase::Expired => {
                info!("Refresh token expired, logging out");
                self.logout();
                Ok(SessionPhase::Anonymous)
            }
            phase => Ok(phase),
        }
    }

    /// Sign out.
    ///
    /// Clears the session and profile, then replaces the current location
    /// with the page the user was headed to before being gated, unless that
    /// page is itself gated, in which case home. Returns the location.
    pub fn logout(&self) -> String {
        let redirect_to = self.client.session().clear();
        let target = redirect_to
            .filter(|path| !self.client.routes().requires_auth(path))
            .unwrap_or_else(|| pdap_router::HOME_PATH.to_string());

        self.client.navigator().replace(&target);
        info!(to = %target, "Logged out");
        target
    }

    /// Record the path to restore after sign-in.
    pub fn set_redirect_to(&self, path: Option<String>) {
        self.client.session().set_redirect_to(path);
    }

    /// Replace the current location with the recorded redirect target, or
    /// home when none was recorded. Returns the location.
    fn return_after_sign_in(&self) -> String {
        let target = self
            .client
            .session()
            .take_redirect_to()
            .unwrap_or_else(|| pdap_router::HOME_PATH.to_string());

        self.client.navigator().replace(&target);
        info!(to = %target, "Signed in");
        target
    }

    fn store_tokens(&self, tokens: &TokenResponse) -> Result<TokenClaims> {
        Ok(self
            .client
            .session()
            .apply_tokens(&tokens.access_token, &tokens.refresh_token)?)
    }
}
