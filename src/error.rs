//! Error types for Zumo Pilot

use thiserror::Error;

/// Zumo Pilot error type
#[derive(Error, Debug)]
pub enum ZumoError {
    /// Configuration value outside its valid range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a YAML configuration
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The waypoint sequence handed to the tracker was empty
    #[error("Waypoint sequence is empty")]
    EmptyPath,

    /// Encoder or motor collaborator failure
    #[error("Hardware error: {0}")]
    Hardware(String),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ZumoError>;
