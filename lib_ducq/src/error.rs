use thiserror::Error;

/// Errors raised by the client side of the monitor.
///
/// Malformed frames never show up here: the classifiers resolve them locally.
#[derive(Debug, Error)]
pub enum DucqError {
    #[error("I/O error occurred: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid bus address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, DucqError>;
