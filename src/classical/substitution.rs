//! Monoalphabetic substitution cipher
//!
//! The key is a permutation of the alphabet: plaintext letter `i` maps to
//! `key[i]`. Decryption uses the inverse permutation.

use crate::alphabet::{index_of, map_letters, ALPHABET_LEN};
use crate::error::{Error, Result};

const NAME: &str = "Substitution Cipher";

/// Validated substitution table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionKey {
    forward: [u8; ALPHABET_LEN as usize],
    inverse: [u8; ALPHABET_LEN as usize],
}

impl SubstitutionKey {
    /// Parse a 26-letter key, case-insensitive, every letter exactly once
    pub fn parse(key: Option<&str>) -> Result<Self> {
        let key = key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::InvalidKey(format!("{} requires a 26-letter key", NAME)))?;

        let count = key.chars().count();
        if count != ALPHABET_LEN as usize {
            return Err(Error::InvalidKey(format!(
                "{} key must be exactly 26 letters, got {}",
                NAME, count
            )));
        }

        let mut forward = [0u8; ALPHABET_LEN as usize];
        let mut inverse = [u8::MAX; ALPHABET_LEN as usize];

        for (i, c) in key.chars().enumerate() {
            let target = index_of(c).ok_or_else(|| {
                Error::InvalidKey(format!("{} key must contain only letters", NAME))
            })?;
            if inverse[target as usize] != u8::MAX {
                return Err(Error::InvalidKey(format!(
                    "{} key repeats letter '{}'",
                    NAME,
                    c.to_ascii_uppercase()
                )));
            }
            forward[i] = target;
            inverse[target as usize] = i as u8;
        }

        Ok(SubstitutionKey { forward, inverse })
    }

    /// Substitute one alphabet index
    pub fn map(&self, index: u8) -> u8 {
        self.forward[index as usize]
    }

    /// Inverse substitution of one alphabet index
    pub fn unmap(&self, index: u8) -> u8 {
        self.inverse[index as usize]
    }
}

pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    let key = SubstitutionKey::parse(key)?;
    Ok(map_letters(text, |idx| key.map(idx)))
}

pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    let key = SubstitutionKey::parse(key)?;
    Ok(map_letters(text, |idx| key.unmap(idx)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "QWERTYUIOPASDFGHJKLZXCVBNM";

    #[test]
    fn test_encrypt_preserves_case() {
        assert_eq!(encrypt("Hello World", Some(KEY)).unwrap(), "Itssg Vgksr");
    }

    #[test]
    fn test_roundtrip() {
        let text = "Pack my box with five dozen liquor jugs.";
        let encrypted = encrypt(text, Some(KEY)).unwrap();
        assert_eq!(decrypt(&encrypted, Some(KEY)).unwrap(), text);
    }

    #[test]
    fn test_lowercase_key_accepted() {
        let lower = KEY.to_lowercase();
        assert_eq!(
            encrypt("abc", Some(&lower)).unwrap(),
            encrypt("abc", Some(KEY)).unwrap()
        );
    }

    #[test]
    fn test_rotated_alphabet_accepted() {
        let rotated = "BCDEFGHIJKLMNOPQRSTUVWXYZA";
        assert_eq!(encrypt("abz", Some(rotated)).unwrap(), "bca");
    }

    #[test]
    fn test_rejects_repeated_letter() {
        assert!(matches!(
            encrypt("abc", Some("AABCDEFGHIJKLMNOPQRSTUVWX")),
            Err(Error::InvalidKey(_))
        ));
        assert!(matches!(
            encrypt("abc", Some("AACDEFGHIJKLMNOPQRSTUVWXYZ")),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_rejects_bad_length_and_chars() {
        assert!(SubstitutionKey::parse(Some("ABC")).is_err());
        assert!(SubstitutionKey::parse(Some("ABCDEFGHIJKLMNOPQRSTUVWXY1")).is_err());
        assert!(SubstitutionKey::parse(None).is_err());
    }
}
