//! User command - account creation and password management.

use anyhow::Result;
use clap::{Args, Subcommand};
use pdap_client::MessageResponse;
use serde_json::json;

use super::{Context, print_json, print_success, read_secret};

/// Arguments for the user command.
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "PDAP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account from a GitHub OAuth access token
    SignupGithub {
        /// GitHub access token
        #[arg(long)]
        token: String,
    },

    /// Change the password of the signed-in account
    ChangePassword {
        /// Account email (defaults to the saved profile email)
        #[arg(long)]
        email: Option<String>,

        /// New password (prompted when omitted)
        #[arg(long, env = "PDAP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Send a password reset email
    RequestReset {
        #[arg(long)]
        email: String,
    },

    /// Set a new password with a reset token
    Reset {
        /// Token from the reset email
        token: String,

        /// New password (prompted when omitted)
        #[arg(long, env = "PDAP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Check whether a reset token is still valid
    ValidateToken {
        /// Token from the reset email
        token: String,
    },
}

/// Run the user command.
pub async fn run(args: UserArgs, ctx: &Context) -> Result<()> {
    match args.command {
        UserCommand::Signup { email, password } => {
            let password = read_secret("password", password)?;
            let conn = ctx.connect()?;
            let claims = conn.client.users().signup_with_email(&email, &password).await?;
            if ctx.json_output {
                print_json(&json!({ "user_id": claims.subject, "email": email }))
            } else {
                print_success(format!("Account created for {}", email));
                Ok(())
            }
        }
        UserCommand::SignupGithub { token } => {
            let conn = ctx.connect()?;
            let response = conn.client.users().signup_with_github(&token).await?;
            report_message(ctx, response, "Account created with GitHub")
        }
        UserCommand::ChangePassword { email, password } => {
            let conn = ctx.connect()?;
            conn.require_user().await?;

            let email = match email.or(conn.client.session().profile().email) {
                Some(email) if !email.is_empty() => email,
                _ => anyhow::bail!("No email saved for this session; pass --email"),
            };
            let password = read_secret("new password", password)?;
            conn.client.users().change_password(&email, &password).await?;

            if ctx.json_output {
                print_json(&json!({ "changed": true, "email": email }))
            } else {
                print_success("Password changed");
                Ok(())
            }
        }
        UserCommand::RequestReset { email } => {
            let conn = ctx.connect()?;
            let response = conn.client.users().request_password_reset(&email).await?;
            report_message(ctx, response, format!("Reset email sent to {}", email))
        }
        UserCommand::Reset { token, password } => {
            let password = read_secret("new password", password)?;
            let conn = ctx.connect()?;
            let response = conn.client.users().reset_password(&password, &token).await?;
            report_message(ctx, response, "Password reset")
        }
        UserCommand::ValidateToken { token } => {
            let conn = ctx.connect()?;
            let response = conn
                .client
                .users()
                .validate_reset_password_token(&token)
                .await?;
            report_message(ctx, response, "Token is valid")
        }
    }
}

/// Print the server's message, or `fallback` when it sent none.
fn report_message(
    ctx: &Context,
    response: MessageResponse,
    fallback: impl Into<String>,
) -> Result<()> {
    let message = if response.message.is_empty() {
        fallback.into()
    } else {
        response.message
    };

    if ctx.json_output {
        print_json(&json!({ "message": message }))
    } else {
        print_success(message);
        Ok(())
    }
}
