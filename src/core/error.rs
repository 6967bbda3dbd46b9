//! Error types for border-stitch
//!
//! Library code returns the typed [`Error`]; the binary wraps it with `anyhow`
//! context at the boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for border-stitch operations
#[derive(Debug, Error)]
pub enum Error {
    /// An expected dataset (store directory) does not exist
    #[error("couldn't find dataset: {}", .0.display())]
    MissingDataset(PathBuf),

    /// A layer was requested that the store does not hold
    #[error("layer '{0}' not found")]
    LayerNotFound(String),

    /// A layer exists but its content cannot be used
    #[error("invalid layer '{layer}': {reason}")]
    InvalidLayer { layer: String, reason: String },

    /// Invalid configuration or parameters
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// GeoJSON (de)serialization error
    #[error("GeoJSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Atomic rename of a freshly written layer failed
    #[error("failed to persist layer: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Convenience result type for border-stitch operations
pub type Result<T> = std::result::Result<T, Error>;
