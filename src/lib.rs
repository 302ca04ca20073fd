//! cipherkit - classical, positional and modern ciphers
//!
//! Every cipher exposes `encrypt(text, key)` and `decrypt(text, key)` over
//! strings and fails with a typed [`Error`] on bad keys or input. Use
//! [`Algorithm`] to pick a cipher at runtime.

pub mod algorithm;
pub mod alphabet;
pub mod classical;
pub mod config;
pub mod crypto;
pub mod error;
pub mod keygen;
pub mod positional;
pub mod rsa;
pub mod strength;
pub mod structural;

pub use algorithm::{descriptors, Algorithm, AlgorithmDescriptor, CipherOptions, Operation};
pub use config::Config;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::algorithm::{Algorithm, CipherOptions, Operation};
    pub use crate::config::Config;
    pub use crate::crypto::{AesMode, OutputFormat};
    pub use crate::error::{Error, Result};
    pub use crate::keygen::{generate_key, GeneratedKey, KeygenOptions};
}
