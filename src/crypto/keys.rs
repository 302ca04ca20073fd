//! AES key material
//!
//! A key string is read as hex when it starts with `0x` or consists entirely
//! of hex digits; it must then decode to 16, 24 or 32 bytes. Anything else is
//! a text key whose UTF-8 bytes are used directly and must be 16, 24 or 32
//! bytes long.

use crate::error::{Error, Result};
use std::fmt;
use zeroize::Zeroizing;

/// Key lengths accepted for text keys, in bytes
pub const TEXT_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// Key lengths accepted for hex keys, in hex digits
pub const HEX_KEY_LENGTHS: [usize; 3] = [32, 48, 64];

/// AES variant selected by key length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    /// Variant for a raw key length in bytes
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            16 => Some(KeySize::Aes128),
            24 => Some(KeySize::Aes192),
            32 => Some(KeySize::Aes256),
            _ => None,
        }
    }

    /// Key size in bits
    pub fn bits(&self) -> usize {
        match self {
            KeySize::Aes128 => 128,
            KeySize::Aes192 => 192,
            KeySize::Aes256 => 256,
        }
    }
}

/// How the key string was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Text,
    Hex,
}

/// Decoded AES key, wiped from memory on drop
#[derive(Clone)]
pub struct AesKey {
    bytes: Zeroizing<Vec<u8>>,
    size: KeySize,
    source: KeySource,
}

impl AesKey {
    /// Derive key bytes from a caller-supplied key string
    pub fn parse(key: Option<&str>) -> Result<Self> {
        let key = key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::InvalidKey("AES requires a key".to_string()))?;

        if let Some(digits) = key.strip_prefix("0x") {
            Self::from_hex(digits)
        } else if is_hex_digits(key) {
            Self::from_hex(key)
        } else {
            Self::from_text(key)
        }
    }

    fn from_hex(digits: &str) -> Result<Self> {
        if !HEX_KEY_LENGTHS.contains(&digits.len()) {
            return Err(Error::InvalidKey(format!(
                "AES hex key must be 32, 48 or 64 hex digits long (got {})",
                digits.len()
            )));
        }

        let bytes = Zeroizing::new(
            hex::decode(digits)
                .map_err(|e| Error::InvalidKey(format!("AES hex key is not valid hex: {}", e)))?,
        );
        let size = KeySize::from_len(bytes.len())
            .ok_or_else(|| Error::InvalidKey("AES hex key has an invalid length".to_string()))?;

        Ok(AesKey {
            bytes,
            size,
            source: KeySource::Hex,
        })
    }

    fn from_text(key: &str) -> Result<Self> {
        let size = KeySize::from_len(key.len()).ok_or_else(|| {
            Error::InvalidKey(format!(
                "AES text key must be 16, 24 or 32 bytes long (got {})",
                key.len()
            ))
        })?;

        Ok(AesKey {
            bytes: Zeroizing::new(key.as_bytes().to_vec()),
            size,
            source: KeySource::Text,
        })
    }

    /// Wrap raw key bytes (16, 24 or 32 of them)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let size = KeySize::from_len(bytes.len()).ok_or_else(|| {
            Error::InvalidKey(format!(
                "AES key must be 16, 24 or 32 bytes long (got {})",
                bytes.len()
            ))
        })?;

        Ok(AesKey {
            bytes: Zeroizing::new(bytes.to_vec()),
            size,
            source: KeySource::Hex,
        })
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> KeySize {
        self.size
    }

    pub fn source(&self) -> KeySource {
        self.source
    }
}

impl fmt::Debug for AesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesKey")
            .field("size", &self.size)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Whether a non-empty string consists only of hex digits
pub fn is_hex_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_keys() {
        let key = AesKey::parse(Some("my secret key!!!")).unwrap();
        assert_eq!(key.size(), KeySize::Aes128);
        assert_eq!(key.source(), KeySource::Text);
        assert_eq!(key.as_bytes(), b"my secret key!!!");

        assert_eq!(
            AesKey::parse(Some("twenty-four byte key....")).unwrap().size(),
            KeySize::Aes192
        );
        assert!(matches!(
            AesKey::parse(Some("short")),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_hex_keys() {
        let key = AesKey::parse(Some("000102030405060708090a0b0c0d0e0f")).unwrap();
        assert_eq!(key.source(), KeySource::Hex);
        assert_eq!(key.as_bytes()[15], 0x0f);

        let key = AesKey::parse(Some(&format!("0x{}", "ab".repeat(32)))).unwrap();
        assert_eq!(key.size(), KeySize::Aes256);
    }

    #[test]
    fn test_all_hex_text_is_read_as_hex() {
        // 16 hex digits decode to 8 bytes, which is too short
        assert!(matches!(
            AesKey::parse(Some("deadbeefdeadbeef")),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_bad_hex_after_prefix() {
        assert!(AesKey::parse(Some(&format!("0x{}", "zz".repeat(16)))).is_err());
        assert!(AesKey::parse(Some("0x1234")).is_err());
    }

    #[test]
    fn test_missing_key() {
        assert!(matches!(AesKey::parse(None), Err(Error::InvalidKey(_))));
        assert!(matches!(AesKey::parse(Some("")), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_debug_redacts_material() {
        let key = AesKey::parse(Some("my secret key!!!")).unwrap();
        assert!(!format!("{:?}", key).contains("secret"));
    }
}
