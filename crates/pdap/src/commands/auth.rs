//! Auth command - sign in, sign out, tokens.

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::{Args, Subcommand};
use console::{Style, style};
use pdap_client::SessionPhase;
use pdap_session::FileStorage;
use serde_json::json;

use super::{Context, print_json, print_success, read_secret};

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "PDAP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in with a GitHub OAuth access token
    LoginGithub {
        /// GitHub access token
        #[arg(long)]
        token: String,
    },

    /// Link the signed-in account to GitHub
    LinkGithub {
        /// GitHub access token
        #[arg(long)]
        token: String,
    },

    /// Print the URL that starts GitHub sign-in in the web app
    OauthUrl {
        /// App path to return to after sign-in
        #[arg(long)]
        return_path: Option<String>,

        /// Open the URL in the browser
        #[arg(long)]
        open: bool,
    },

    /// Exchange the refresh token for new tokens
    Refresh,

    /// Sign out and forget the saved session
    Logout,

    /// Show session status
    Status,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login { email, password } => {
            let password = read_secret("password", password)?;
            let conn = ctx.connect()?;
            let claims = conn.client.auth().login_with_email(&email, &password).await?;
            report_signed_in(ctx, &claims.subject, &conn.client.navigator().current())
        }
        AuthCommand::LoginGithub { token } => {
            let conn = ctx.connect()?;
            let claims = conn.client.auth().login_with_github(&token).await?;
            report_signed_in(ctx, &claims.subject, &conn.client.navigator().current())
        }
        AuthCommand::LinkGithub { token } => {
            let conn = ctx.connect()?;
            let response = conn.client.auth().link_account_with_github(&token).await?;
            if ctx.json_output {
                print_json(&response)
            } else {
                print_success("Account linked to GitHub");
                Ok(())
            }
        }
        AuthCommand::OauthUrl { return_path, open } => {
            let conn = ctx.connect_with(open)?;
            let auth = conn.client.auth();
            if open {
                auth.begin_oauth_login(return_path.as_deref())?;
                return Ok(());
            }

            let url = auth.oauth_url(return_path.as_deref())?;
            if ctx.json_output {
                print_json(&json!({ "url": url }))
            } else {
                println!("{}", url);
                Ok(())
            }
        }
        AuthCommand::Refresh => {
            let conn = ctx.connect()?;
            match conn.client.auth().refresh_access_token().await? {
                Some(claims) => {
                    print_success(format!("Tokens refreshed for user {}", claims.subject));
                }
                None => {
                    let dim = Style::new().dim();
                    println!("{}", dim.apply_to("Not signed in, nothing to refresh"));
                }
            }
            Ok(())
        }
        AuthCommand::Logout => {
            let conn = ctx.connect()?;
            let target = conn.client.auth().logout();
            FileStorage::new(&conn.session_file).remove()?;
            if ctx.json_output {
                print_json(&json!({ "signed_out": true, "location": target }))
            } else {
                print_success(format!("Signed out (back to {})", target));
                Ok(())
            }
        }
        AuthCommand::Status => cmd_status(ctx),
    }
}

fn report_signed_in(ctx: &Context, user_id: &str, location: &str) -> Result<()> {
    if ctx.json_output {
        print_json(&json!({ "user_id": user_id, "location": location }))
    } else {
        print_success(format!("Signed in as user {} (now at {})", user_id, location));
        Ok(())
    }
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let conn = ctx.connect()?;
    let session = conn.client.session();
    let state = session.snapshot();
    let profile = session.profile();
    let phase = phase_name(session.phase());

    if ctx.json_output {
        return print_json(&json!({
            "phase": phase,
            "user_id": state.user_id,
            "email": profile.email,
            "access_token_expires_at_ms": state.user_id.as_ref().map(|_| state.access_token.expires_at_ms),
            "refresh_token_expires_at_ms": state.user_id.as_ref().map(|_| state.refresh_token.expires_at_ms),
            "session_file": conn.session_file.display().to_string(),
        }));
    }

    let dim = Style::new().dim();
    println!("{}", style("Session Status").bold());
    println!("{}", dim.apply_to("─".repeat(50)));
    println!("  State:    {}", phase);

    match &state.user_id {
        Some(user_id) => {
            println!("  User:     {}", user_id);
            if let Some(email) = profile.email.filter(|e| !e.is_empty()) {
                println!("  Email:    {}", email);
            }
            println!(
                "  Access:   expires {}",
                format_expiry(state.access_token.expires_at_ms)
            );
            println!(
                "  Refresh:  expires {}",
                format_expiry(state.refresh_token.expires_at_ms)
            );
        }
        None => {
            println!("  {}", dim.apply_to("Run 'pdap auth login' to sign in"));
        }
    }

    if ctx.verbose {
        println!();
        println!(
            "{}",
            dim.apply_to(format!("Session file: {}", conn.session_file.display()))
        );
    }
    Ok(())
}

fn phase_name(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Anonymous => "signed out",
        SessionPhase::Authenticated => "signed in",
        SessionPhase::Expired => "expired (refresh needed)",
    }
}

fn format_expiry(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_expiry() {
        assert_ne!(format_expiry(1_700_000_000_000), "unknown");
        assert_eq!(format_expiry(i64::MAX), "unknown");
    }

    #[test]
    fn test_phase_name() {
        assert_eq!(phase_name(SessionPhase::Anonymous), "signed out");
        assert_eq!(phase_name(SessionPhase::Expired), "expired (refresh needed)");
    }
}
