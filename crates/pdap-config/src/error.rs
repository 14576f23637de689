//! Configuration errors.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A config or key file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A config file or its directory could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode config as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `set` was given a key outside the schema.
    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    /// `set` was given a value the key cannot hold.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// No service key in the env var, key file or config.
    #[error(
        "service key not found. Set {env_var}, point [auth] service_key_file at a key file, or set [auth] service_key"
    )]
    ServiceKeyNotFound { env_var: String },
}
