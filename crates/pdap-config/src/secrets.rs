//! Service credential resolution.
//!
//! Resolution order:
//! 1. Environment variable (`PDAP_SERVICE_KEY` unless `[auth] service_key_env` says otherwise)
//! 2. Key file (`[auth] service_key_file`)
//! 3. Config file value (with warning at load time)

use std::path::{Path, PathBuf};

use crate::types::{AuthConfig, DEFAULT_SERVICE_KEY_ENV};
use crate::{ConfigError, Result};

/// Result of service key resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Key file.
    File(PathBuf),
    /// Config file (plaintext, not recommended).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::File(path) => write!(f, "key file {}", path.display()),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve the service key used for anonymous API calls.
pub fn resolve_service_key(auth: Option<&AuthConfig>) -> Result<ResolvedSecret> {
    let env_var = auth
        .map(|a| a.env_var())
        .unwrap_or(DEFAULT_SERVICE_KEY_ENV);

    // 1. Environment variable
    if let Ok(value) = std::env::var(env_var)
        && !value.is_empty()
    {
        return Ok(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(env_var.to_string()),
        });
    }

    // 2. Key file
    if let Some(path) = auth.and_then(|a| a.service_key_file.as_ref()) {
        let expanded = expand_path(path);
        if expanded.is_file() {
            let value = std::fs::read_to_string(&expanded)
                .map_err(|source| ConfigError::Read {
                    path: expanded.clone(),
                    source,
                })?
                .trim()
                .to_string();
            if !value.is_empty() {
                return Ok(ResolvedSecret {
                    value,
                    source: SecretSource::File(expanded),
                });
            }
        }
    }

    // 3. Config file
    if let Some(value) = auth.and_then(|a| a.service_key.clone()) {
        return Ok(ResolvedSecret {
            value,
            source: SecretSource::ConfigFile,
        });
    }

    Err(ConfigError::ServiceKeyNotFound {
        env_var: env_var.to_string(),
    })
}

/// Expand ~ to home directory in paths.
pub fn expand_path(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str()
        && let Some(rest) = s.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_env_var_wins() {
        // SAFETY: Test is single-threaded, env var is test-specific
        unsafe {
            std::env::set_var("TEST_PDAP_KEY_ENV_WINS", "from-env");
        }
        let auth = AuthConfig {
            service_key_env: Some("TEST_PDAP_KEY_ENV_WINS".to_string()),
            service_key_file: None,
            service_key: Some("from-config".to_string()),
        };
        let resolved = resolve_service_key(Some(&auth)).unwrap();
        assert_eq!(resolved.value, "from-env");
        assert_eq!(
            resolved.source,
            SecretSource::EnvVar("TEST_PDAP_KEY_ENV_WINS".to_string())
        );
        // SAFETY: Cleanup test env var
        unsafe {
            std::env::remove_var("TEST_PDAP_KEY_ENV_WINS");
        }
    }

    #[test]
    fn test_key_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("service.key");
        std::fs::write(&path, "from-file\n").unwrap();

        let auth = AuthConfig {
            service_key_env: Some("TEST_PDAP_KEY_UNSET_1".to_string()),
            service_key_file: Some(path.clone()),
            service_key: Some("from-config".to_string()),
        };
        let resolved = resolve_service_key(Some(&auth)).unwrap();
        assert_eq!(resolved.value, "from-file");
        assert_eq!(resolved.source, SecretSource::File(path));
    }

    #[test]
    fn test_config_fallback() {
        let auth = AuthConfig {
            service_key_env: Some("TEST_PDAP_KEY_UNSET_2".to_string()),
            service_key_file: Some(PathBuf::from("/nonexistent/service.key")),
            service_key: Some("from-config".to_string()),
        };
        let resolved = resolve_service_key(Some(&auth)).unwrap();
        assert_eq!(resolved.value, "from-config");
        assert_eq!(resolved.source, SecretSource::ConfigFile);
    }

    #[test]
    fn test_not_found() {
        let auth = AuthConfig {
            service_key_env: Some("TEST_PDAP_KEY_UNSET_3".to_string()),
            ..Default::default()
        };
        let err = resolve_service_key(Some(&auth)).unwrap_err();
        assert!(matches!(err, ConfigError::ServiceKeyNotFound { env_var } if env_var == "TEST_PDAP_KEY_UNSET_3"));
    }

    #[test]
    fn test_expand_path() {
        let path = PathBuf::from("~/test/file.key");
        let expanded = expand_path(&path);
        if dirs::home_dir().is_some() {
            assert!(!expanded.to_str().unwrap().starts_with("~/"));
        }

        let path2 = PathBuf::from("/absolute/path");
        assert_eq!(expand_path(&path2), path2);
    }
}
