//! Shared configuration for redscout.
//!
//! Holds the env-driven [`AppConfig`] plus the scan-intensity presets that
//! the server and CLI both resolve against.

use thiserror::Error;

mod app_config;
mod config;
mod presets;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use presets::{builtin_presets, load_presets, resolve_preset, PresetsFile, ScanPreset};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read presets file {path}: {source}")]
    PresetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse presets file: {0}")]
    PresetsFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
