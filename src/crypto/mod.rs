//! AES adapter
//!
//! Encrypts with AES-128/192/256 in CBC, CTR or GCM mode and wraps the result
//! in a self-describing [`Envelope`]. Key material comes from a text or hex key
//! string (see [`AesKey`]); IVs and nonces are fresh random bytes from the OS
//! for every call.

mod envelope;
mod keys;
mod modes;

pub use envelope::{Encoding, Envelope};
pub use keys::{AesKey, KeySize, KeySource};
pub use modes::{decrypt, decrypt_bytes, encrypt, encrypt_bytes};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// AES block size in bytes (also the CBC IV size)
pub const BLOCK_SIZE: usize = 16;

/// CTR nonce size; the remaining 8 bytes of the counter block are a
/// big-endian counter starting at zero
pub const CTR_NONCE_SIZE: usize = 8;

/// GCM nonce size used when encrypting
pub const GCM_NONCE_SIZE: usize = 12;

/// Longer GCM nonce accepted on decrypt for envelopes from older producers
pub const GCM_WIDE_NONCE_SIZE: usize = 16;

/// Size of GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Block cipher mode of operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AesMode {
    #[default]
    Cbc,
    Ctr,
    Gcm,
}

impl AesMode {
    /// Envelope tag (`CBC`, `CTR`, `GCM`)
    pub fn tag(&self) -> &'static str {
        match self {
            AesMode::Cbc => "CBC",
            AesMode::Ctr => "CTR",
            AesMode::Gcm => "GCM",
        }
    }

    /// Mode for an envelope tag, exact match only
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "CBC" => Some(AesMode::Cbc),
            "CTR" => Some(AesMode::Ctr),
            "GCM" => Some(AesMode::Gcm),
            _ => None,
        }
    }

    /// Number of `:`-separated parts in an envelope of this mode, header included
    pub fn envelope_parts(&self) -> usize {
        match self {
            AesMode::Cbc | AesMode::Ctr => 3,
            AesMode::Gcm => 4,
        }
    }
}

impl fmt::Display for AesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AesMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AesMode::from_tag(&s.trim().to_ascii_uppercase()).ok_or_else(|| {
            Error::InvalidInput(format!(
                "Unknown AES mode '{}' (expected cbc, ctr or gcm)",
                s
            ))
        })
    }
}

/// Text encoding of envelope components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Base64,
    Hex,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Base64 => f.write_str("base64"),
            OutputFormat::Hex => f.write_str("hex"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" | "b64" => Ok(OutputFormat::Base64),
            "hex" => Ok(OutputFormat::Hex),
            _ => Err(Error::InvalidInput(format!(
                "Unknown output format '{}' (expected base64 or hex)",
                s
            ))),
        }
    }
}
