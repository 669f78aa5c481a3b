pub mod app_config;
pub mod config;
pub mod markers;
pub mod units;

pub use app_config::{EngineConfig, PricePolicy, TieBreak};
pub use config::{load_engine_config, load_engine_config_from_env};
pub use markers::{load_markers, MarkerSelectors, PageMarkers};
pub use units::{Quantity, UnitKind, UnitPrice};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read page markers file {path}: {source}")]
    MarkersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse page markers file: {0}")]
    MarkersFileParse(#[source] serde_yaml::Error),

    #[error("invalid CSS selector for marker '{marker}': {reason}")]
    InvalidSelector { marker: String, reason: String },

    #[error("page markers validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown unit kind: {0}")]
    UnknownUnit(String),
}
