//! Configuration system for the PDAP client.
//!
//! Provides TOML-based configuration with:
//! - API and app base URLs plus request timeout (`[api]`)
//! - Service credential resolution (env var → key file → config file)
//! - Cache TTL policy (`[cache]`) and session file location (`[session]`)
//! - Config file layering (XDG user config + project-local overrides)
//!
//! Environment variables `PDAP_API_BASE_URL` and `PDAP_APP_BASE_URL`
//! override the files; CLI flags override everything.

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    ConfigSource, LayerKind, LoadedConfig, load_config, load_config_file,
    load_config_with_options, project_config_path, save_config, xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{ResolvedSecret, SecretSource, expand_path, resolve_service_key};
pub use types::*;
