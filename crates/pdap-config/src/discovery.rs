//! Finding, layering and saving config files.
//!
//! Layers, lowest precedence first:
//! 1. user config: `$PDAP_CONFIG_DIR/config.toml`, else `<platform config dir>/pdap/config.toml`
//! 2. project config: `./pdap.toml`
//! 3. `PDAP_API_BASE_URL` / `PDAP_APP_BASE_URL`
//!
//! Command-line flags sit above all of these and are applied by the caller.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{ConfigError, PdapConfig, Result};

const USER_CONFIG_FILE: &str = "config.toml";
const PROJECT_CONFIG_FILE: &str = "pdap.toml";
const CONFIG_DIR_ENV: &str = "PDAP_CONFIG_DIR";

const API_BASE_URL_ENV: &str = "PDAP_API_BASE_URL";
const APP_BASE_URL_ENV: &str = "PDAP_APP_BASE_URL";

/// Which layer a config file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    User,
    Project,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            LayerKind::User => "user",
            LayerKind::Project => "project",
        })
    }
}

/// A config file that was looked for.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub kind: LayerKind,
    pub path: PathBuf,
    /// False when the file is missing or failed to load.
    pub loaded: bool,
}

/// Merged config plus what went into it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: PdapConfig,
    /// Every file looked for, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// Problems that did not stop loading: bad files, plaintext secrets.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load and merge every layer. `project_dir` defaults to the working directory.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Like [`load_config`], reading the user layer from `config_dir` when given.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let user_path = config_dir
        .map(|d| d.join(USER_CONFIG_FILE))
        .or_else(xdg_config_path);
    let project_path = project_dir
        .unwrap_or_else(|| Path::new("."))
        .join(PROJECT_CONFIG_FILE);

    let layers = user_path
        .map(|p| (LayerKind::User, p))
        .into_iter()
        .chain([(LayerKind::Project, project_path)]);

    let mut loaded = LoadedConfig {
        config: PdapConfig::new(),
        sources: Vec::new(),
        warnings: Vec::new(),
    };

    for (kind, path) in layers {
        let layer = match path.is_file().then(|| load_config_file(&path)) {
            Some(Ok(layer)) => Some(layer),
            Some(Err(e)) => {
                loaded.warnings.push(format!("Skipped {} config: {}", kind, e));
                None
            }
            None => None,
        };

        let found = layer.is_some();
        if let Some(layer) = layer {
            loaded.config.merge(layer);
        }
        loaded.sources.push(ConfigSource {
            kind,
            path,
            loaded: found,
        });
    }

    if let Some(url) = env_value(API_BASE_URL_ENV) {
        loaded.config.set_api_base_url(url);
    }
    if let Some(url) = env_value(APP_BASE_URL_ENV) {
        loaded.config.set_app_base_url(url);
    }

    if loaded.config.has_plaintext_service_key() {
        loaded.warnings.push(
            "the service key is stored in plaintext; prefer PDAP_SERVICE_KEY or [auth] service_key_file"
                .to_string(),
        );
    }

    Ok(loaded)
}

/// Parse one config file.
pub fn load_config_file(path: &Path) -> Result<PdapConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    PdapConfig::from_toml(&text)
}

/// Write `config` to `path`, creating missing directories.
pub fn save_config(config: &PdapConfig, path: &Path) -> Result<()> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| ConfigError::Write { path, source }
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(write_err(dir))?;
    }
    std::fs::write(path, config.to_toml()?).map_err(write_err(path))
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

/// The user config file.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// The project config file in `dir`.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(PROJECT_CONFIG_FILE)
}

/// Directory for the user config, session file and logs.
///
/// `PDAP_CONFIG_DIR` wins over the platform config directory.
pub fn xdg_config_dir() -> Option<PathBuf> {
    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join("pdap")),
    }
}
