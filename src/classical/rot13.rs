//! ROT13: Caesar with a fixed shift of 13
//!
//! Applying the transform twice returns the original text, so encrypt and
//! decrypt are the same operation.

use crate::alphabet::{forbid_key, shift_text};
use crate::error::Result;

const NAME: &str = "ROT13";

/// Fixed shift
pub const SHIFT: i64 = 13;

/// Apply ROT13 without key validation
pub fn rot13(text: &str) -> String {
    shift_text(text, SHIFT)
}

/// Encrypt; fails with `UnexpectedKey` if a key is supplied
pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    forbid_key(key, NAME)?;
    Ok(rot13(text))
}

/// Decrypt; identical to [`encrypt`]
pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    encrypt(text, key)
}
