//! Chris Way Cipher V2
//!
//! Letter `i` is shifted by `key[i mod len] + i`, then the sequence is
//! reversed.
//!
//! The "public"/"private" key naming is nominal only. Both directions derive
//! the shift schedule from the key in the same way, so a message decrypts
//! only with the exact key string it was encrypted with. Treat this as a
//! symmetric keyed cipher.

use super::{require_letters, reverse_then_unshift, shift_then_reverse};
use crate::alphabet::{parse_letter_key, require_letters_and_spaces};
use crate::error::{Error, Result};

const NAME: &str = "Chris Way Cipher V2";

/// Shortest accepted key
pub const MIN_KEY_LEN: usize = 3;

/// Parse and validate a V2 key into alphabet indices
pub fn parse_key(key: Option<&str>) -> Result<Vec<u8>> {
    let indices = parse_letter_key(key, NAME)?;
    if indices.len() < MIN_KEY_LEN {
        return Err(Error::InvalidKey(format!(
            "{} key must be at least {} letters long",
            NAME, MIN_KEY_LEN
        )));
    }
    Ok(indices)
}

fn schedule(key: &[u8]) -> impl Fn(usize) -> i64 + '_ {
    move |i| (key[i % key.len()] as i64 + i as i64) % 26
}

/// Encrypt with the "public" key
pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    require_letters_and_spaces(text, NAME)?;
    let key = parse_key(key)?;
    Ok(shift_then_reverse(text, schedule(&key)))
}

/// Decrypt with the "private" key, which must equal the encryption key
pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    require_letters(text, NAME)?;
    let key = parse_key(key)?;
    Ok(reverse_then_unshift(text, schedule(&key)))
}
