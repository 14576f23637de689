//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod route;
pub mod search;
pub mod sources;
pub mod user;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use console::Style;
use pdap_client::PdapClient;
use pdap_config::{ConfigError, PdapConfig};
use pdap_session::{CacheConfig, CacheState, FileStorage, SessionStore, SystemClock};
use tracing::{debug, warn};

use crate::navigator::TerminalNavigator;

/// Session file name inside the config directory.
const SESSION_FILE: &str = "session.json";

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// API base URL from the command line, overriding config.
    pub api_url: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// A client wired to the persisted session.
pub struct Connection {
    pub client: PdapClient,
    pub session_file: PathBuf,
}

impl Context {
    /// Load layered config and apply command-line overrides.
    pub fn config(&self) -> Result<PdapConfig> {
        let loaded = pdap_config::load_config(None)?;
        for warning in &loaded.warnings {
            warn!("{}", warning);
        }
        debug!(sources = ?loaded.loaded_from(), "Config loaded");

        let mut config = loaded.config;
        if let Some(url) = &self.api_url {
            config.set_api_base_url(url.clone());
        }
        Ok(config)
    }

    /// Build a client and restore the saved session.
    pub fn connect(&self) -> Result<Connection> {
        self.connect_with(false)
    }

    /// Like [`Context::connect`]; `open_browser` lets OAuth login launch
    /// the system browser.
    pub fn connect_with(&self, open_browser: bool) -> Result<Connection> {
        let config = self.config()?;

        let service_key = match pdap_config::resolve_service_key(config.auth.as_ref()) {
            Ok(secret) => {
                debug!(source = %secret.source, "Service key resolved");
                Some(secret.value)
            }
            Err(ConfigError::ServiceKeyNotFound { env_var }) => {
                debug!(env_var = %env_var, "No service key configured");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let session_file = session_file(&config)?;
        let clock = Arc::new(SystemClock);
        let session = SessionStore::with_storage(FileStorage::new(&session_file), clock.clone());
        session
            .restore()
            .with_context(|| format!("Failed to read {}", session_file.display()))?;

        let ttl = config.cache();
        let cache = CacheState::new(
            CacheConfig::new()
                .with_default_ttl(ttl.default_ttl())
                .with_data_source_ttl(ttl.data_source_ttl()),
            clock,
        );

        let mut builder = PdapClient::builder()
            .base_url(config.api_base_url())
            .app_base_url(config.app_base_url())
            .timeout(config.timeout())
            .session(Arc::new(session))
            .cache(Arc::new(cache))
            .navigator(Arc::new(TerminalNavigator::new(open_browser)));
        if let Some(key) = service_key {
            builder = builder.service_key(key);
        }

        Ok(Connection {
            client: builder.build()?,
            session_file,
        })
    }
}

impl Connection {
    /// Refresh an expired access token before a user-mode call.
    pub async fn require_user(&self) -> Result<()> {
        let phase = self.client.auth().ensure_fresh().await?;
        if phase == pdap_client::SessionPhase::Anonymous {
            bail!("Not signed in. Run 'pdap auth login' first.");
        }
        Ok(())
    }
}

fn session_file(config: &PdapConfig) -> Result<PathBuf> {
    if let Some(file) = config.session.as_ref().and_then(|s| s.file.as_ref()) {
        return Ok(pdap_config::expand_path(file));
    }
    pdap_config::xdg_config_dir()
        .map(|d| d.join(SESSION_FILE))
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Output helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(message: impl std::fmt::Display) {
    let green = Style::new().green();
    println!("{} {}", green.apply_to("✓"), message);
}

/// Use `provided`, or prompt for a value on stdin.
pub fn read_secret(label: &str, provided: Option<String>) -> Result<String> {
    if let Some(value) = provided {
        return Ok(value);
    }

    print!("{}> ", label);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        bail!("No {} provided", label);
    }
    Ok(input.to_string())
}
