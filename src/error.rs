//! Monitor error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or validating the sensor configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Two sensors share one object path
    #[error("Duplicate sensor path: {0}")]
    DuplicateSensor(String),

    #[error("Invalid sensor path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },
}

/// A message that claimed to be a threshold notification but could not be read
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed body: {0}")]
    Body(#[from] zbus::zvariant::Error),

    #[error("Unexpected body signature {found:?} (expected {expected:?}...)")]
    Signature {
        expected: &'static str,
        found: String,
    },

    /// A watched threshold property carried a non-boolean value
    #[error("Property {property} is not boolean-typed (variant signature {found:?})")]
    NotBoolean { property: String, found: String },
}
