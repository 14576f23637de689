//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [api]        # API and app base URLs, request timeout
//! [auth]       # service credential sources
//! [cache]      # response cache TTLs
//! [session]    # session file location
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// API base URL used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Web app base URL used when nothing else is configured.
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:5173";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default env var holding the service key.
pub const DEFAULT_SERVICE_KEY_ENV: &str = "PDAP_SERVICE_KEY";

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 120;

/// Default data source cache TTL in seconds.
pub const DEFAULT_DATA_SOURCE_TTL_SECS: u64 = 180;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PdapConfig {
    /// API connection settings.
    pub api: Option<ApiConfig>,

    /// Service credential settings.
    pub auth: Option<AuthConfig>,

    /// Response cache settings.
    pub cache: Option<CacheConfig>,

    /// Session persistence settings.
    pub session: Option<SessionConfig>,
}

impl PdapConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections merge field by field, so an override file only needs the
    /// keys it changes.
    pub fn merge(&mut self, other: PdapConfig) {
        if let Some(api) = other.api {
            self.api = Some(match self.api.take() {
                Some(mut base) => {
                    base.merge(api);
                    base
                }
                None => api,
            });
        }

        if let Some(auth) = other.auth {
            self.auth = Some(match self.auth.take() {
                Some(mut base) => {
                    base.merge(auth);
                    base
                }
                None => auth,
            });
        }

        if let Some(cache) = other.cache {
            self.cache = Some(match self.cache.take() {
                Some(mut base) => {
                    base.merge(cache);
                    base
                }
                None => cache,
            });
        }

        if let Some(session) = other.session {
            self.session = Some(match self.session.take() {
                Some(mut base) => {
                    base.merge(session);
                    base
                }
                None => session,
            });
        }
    }

    /// Effective API base URL.
    pub fn api_base_url(&self) -> &str {
        self.api
            .as_ref()
            .and_then(|a| a.base_url.as_deref())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Effective web app base URL (used for OAuth return links).
    pub fn app_base_url(&self) -> &str {
        self.api
            .as_ref()
            .and_then(|a| a.app_base_url.as_deref())
            .unwrap_or(DEFAULT_APP_BASE_URL)
    }

    /// Effective request timeout. Zero counts as unset.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.api
                .as_ref()
                .and_then(|a| a.timeout_secs)
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Cache settings, or defaults.
    pub fn cache(&self) -> CacheConfig {
        self.cache.clone().unwrap_or_default()
    }

    /// Override the API base URL.
    pub fn set_api_base_url(&mut self, url: impl Into<String>) {
        self.api.get_or_insert_with(ApiConfig::default).base_url = Some(url.into());
    }

    /// Override the web app base URL.
    pub fn set_app_base_url(&mut self, url: impl Into<String>) {
        self.api.get_or_insert_with(ApiConfig::default).app_base_url = Some(url.into());
    }

    /// Whether the config holds the service key in plaintext.
    pub fn has_plaintext_service_key(&self) -> bool {
        self.auth
            .as_ref()
            .is_some_and(|a| a.service_key.is_some())
    }

    /// Set one setting by its dotted key, e.g. `api.timeout_secs`.
    pub fn set_value(&mut self, key: &str, value: &str) -> crate::Result<()> {
        match key {
            "api.base_url" => self.set_api_base_url(parse_url(key, value)?),
            "api.app_base_url" => self.set_app_base_url(parse_url(key, value)?),
            "api.timeout_secs" => {
                let secs = parse_secs(key, value)?;
                if secs == 0 {
                    return Err(invalid(key, value, "timeout must be at least one second"));
                }
                self.api.get_or_insert_with(ApiConfig::default).timeout_secs = Some(secs);
            }
            "auth.service_key_env" => {
                self.auth.get_or_insert_with(AuthConfig::default).service_key_env =
                    Some(value.to_string());
            }
            "auth.service_key_file" => {
                self.auth.get_or_insert_with(AuthConfig::default).service_key_file =
                    Some(PathBuf::from(value));
            }
            "cache.default_ttl_secs" => {
                self.cache.get_or_insert_with(CacheConfig::default).default_ttl_secs =
                    Some(parse_secs(key, value)?);
            }
            "cache.data_source_ttl_secs" => {
                self.cache.get_or_insert_with(CacheConfig::default).data_source_ttl_secs =
                    Some(parse_secs(key, value)?);
            }
            "session.file" => {
                self.session.get_or_insert_with(SessionConfig::default).file =
                    Some(PathBuf::from(value));
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Copy safe to display: a plaintext service key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(key) = copy.auth.as_mut().and_then(|a| a.service_key.as_mut()) {
            *key = "********".to_string();
        }
        copy
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_url(key: &str, value: &str) -> crate::Result<String> {
    let url = value.trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(invalid(key, value, "expected an http(s) URL"));
    }
    Ok(url.to_string())
}

fn parse_secs(key: &str, value: &str) -> crate::Result<u64> {
    value
        .parse()
        .map_err(|_| invalid(key, value, "expected a whole number of seconds"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// API connection configuration (`[api]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the data sources API.
    pub base_url: Option<String>,

    /// Base URL of the web app, for OAuth return links.
    pub app_base_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    fn merge(&mut self, other: ApiConfig) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.app_base_url.is_some() {
            self.app_base_url = other.app_base_url;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

/// Service credential configuration (`[auth]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Env var holding the service key (default `PDAP_SERVICE_KEY`).
    pub service_key_env: Option<String>,

    /// File holding the service key.
    pub service_key_file: Option<PathBuf>,

    /// Service key in plaintext (not recommended).
    pub service_key: Option<String>,
}

impl AuthConfig {
    fn merge(&mut self, other: AuthConfig) {
        if other.service_key_env.is_some() {
            self.service_key_env = other.service_key_env;
        }
        if other.service_key_file.is_some() {
            self.service_key_file = other.service_key_file;
        }
        if other.service_key.is_some() {
            self.service_key = other.service_key;
        }
    }

    /// Env var to read the service key from.
    pub fn env_var(&self) -> &str {
        self.service_key_env
            .as_deref()
            .unwrap_or(DEFAULT_SERVICE_KEY_ENV)
    }
}

/// Response cache configuration (`[cache]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for cached reads without a specific policy, in seconds.
    pub default_ttl_secs: Option<u64>,

    /// TTL for data source lookups, in seconds.
    pub data_source_ttl_secs: Option<u64>,
}

impl CacheConfig {
    fn merge(&mut self, other: CacheConfig) {
        if other.default_ttl_secs.is_some() {
            self.default_ttl_secs = other.default_ttl_secs;
        }
        if other.data_source_ttl_secs.is_some() {
            self.data_source_ttl_secs = other.data_source_ttl_secs;
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS))
    }

    pub fn data_source_ttl(&self) -> Duration {
        Duration::from_secs(self.data_source_ttl_secs.unwrap_or(DEFAULT_DATA_SOURCE_TTL_SECS))
    }
}

/// Session persistence configuration (`[session]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session file override.
    pub file: Option<PathBuf>,
}

impl SessionConfig {
    fn merge(&mut self, other: SessionConfig) {
        if other.file.is_some() {
            self.file = other.file;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
