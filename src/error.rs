//! Error types for Bloom gateway
//!
//! The interaction core never fails: missing input, timeouts and misses are
//! ordinary state-machine outcomes. Errors only come from loading
//! configuration, loading the catalogue, and the stdio bridge.

use thiserror::Error;

/// Result type alias for Bloom operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Bloom gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Catalogue loading or validation error
    #[error("catalogue error: {0}")]
    Catalogue(String),

    /// Stdio bridge error (closed channel, malformed protocol line)
    #[error("bridge error: {0}")]
    Bridge(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
