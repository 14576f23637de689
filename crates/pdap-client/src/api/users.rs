//! Users API: signup, password changes and resets.

use pdap_session::TokenClaims;

use crate::client::{AuthMode, PdapClient};
use crate::error::Result;
use crate::types::{
    Credentials, EmailRequest, GithubToken, MessageResponse, ResetPasswordRequest, TokenRequest,
};

/// Users API client.
pub struct UsersApi {
    client: PdapClient,
}

impl UsersApi {
    pub(crate) fn new(client: PdapClient) -> Self {
        Self { client }
    }

    /// Create an account, then log in with it.
    pub async fn signup_with_email(&self, email: &str, password: &str) -> Result<TokenClaims> {
        let _: MessageResponse = self
            .client
            .post("user", AuthMode::None, &Credentials { email, password })
            .await?;

        self.client.auth().login_with_email(email, password).await
    }

    /// Create an account from a GitHub identity.
    pub async fn signup_with_github(&self, gh_access_token: &str) -> Result<MessageResponse> {
        self.client
            .post(
                "auth/create-user-with-github",
                AuthMode::None,
                &GithubToken { gh_access_token },
            )
            .await
    }

    /// Change the signed-in user's password, then log in with it.
    pub async fn change_password(&self, email: &str, password: &str) -> Result<TokenClaims> {
        let _: MessageResponse = self
            .client
            .put("user", AuthMode::User, &Credentials { email, password })
            .await?;

        self.client.auth().login_with_email(email, password).await
    }

    /// Ask for a password reset email.
    pub async fn request_password_reset(&self, email: &str) -> Result<MessageResponse> {
        self.client
            .post("request-reset-password", AuthMode::None, &EmailRequest { email })
            .await
    }

    /// Set a new password using the token from a reset email.
    pub async fn reset_password(&self, password: &str, token: &str) -> Result<MessageResponse> {
        self.client
            .post(
                "reset-password",
                AuthMode::None,
                &ResetPasswordRequest { password, token },
            )
            .await
    }

    /// Check that a reset token is still usable.
    pub async fn validate_reset_password_token(&self, token: &str) -> Result<MessageResponse> {
        self.client
            .post("reset-token-validation", AuthMode::None, &TokenRequest { token })
            .await
    }
}
