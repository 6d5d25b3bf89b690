//! Common error types for metahub

use thiserror::Error;

/// Common result type for metahub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the metahub crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML configuration could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Sidecar or blob document could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Metadata accessor failed to decode or encode a document
    #[error("Metadata codec error: {0}")]
    Codec(String),

}
