//! Error types for cipherkit

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cipherkit
///
/// Every cipher operation is all-or-nothing: on error no partial output is
/// produced and nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    // Key errors
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unexpected key: {0}")]
    UnexpectedKey(String),

    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    // Input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid ciphertext format: {0}")]
    InvalidFormat(String),

    #[error("Message too large: {bits}-bit message does not fit below the modulus")]
    MessageTooLarge { bits: u64 },

    // Crypto errors
    #[error("Authentication failed - ciphertext corrupted or wrong key")]
    AuthenticationFailed,

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Stable short code for the error category
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidKey(_) => "invalid_key",
            Error::UnexpectedKey(_) => "unexpected_key",
            Error::KeyGeneration(_) => "key_generation",
            Error::InvalidInput(_) => "invalid_input",
            Error::InvalidFormat(_) => "invalid_format",
            Error::MessageTooLarge { .. } => "message_too_large",
            Error::AuthenticationFailed => "authentication_failed",
            Error::Config(_) | Error::InvalidConfig(_) => "config",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
        }
    }

    /// Whether the error was caused by the caller-supplied key
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidKey(_) | Error::UnexpectedKey(_) | Error::KeyGeneration(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
