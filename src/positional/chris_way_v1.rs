//! Chris Way Cipher V1
//!
//! Keyless: letter `i` is shifted by `2i` when `i` is even and `i + 3` when
//! `i` is odd, then the sequence is reversed.

use super::{require_letters, reverse_then_unshift, shift_then_reverse};
use crate::alphabet::{forbid_key, require_letters_and_spaces};
use crate::error::Result;

const NAME: &str = "Chris Way Cipher V1";

/// Shift applied at letter position `i`
pub fn position_shift(i: usize) -> i64 {
    let i = i as i64;
    if i % 2 == 0 {
        2 * i
    } else {
        i + 3
    }
}

/// Encrypt letters and spaces; spaces are dropped from the output
pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    forbid_key(key, NAME)?;
    require_letters_and_spaces(text, NAME)?;
    Ok(shift_then_reverse(text, position_shift))
}

pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    forbid_key(key, NAME)?;
    require_letters(text, NAME)?;
    Ok(reverse_then_unshift(text, position_shift))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_position_shift_schedule() {
        let shifts: Vec<i64> = (0..6).map(position_shift).collect();
        assert_eq!(shifts, vec![0, 4, 4, 6, 8, 8]);
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(encrypt("HELLO", None).unwrap(), "WRPIH");
        assert_eq!(decrypt("WRPIH", None).unwrap(), "HELLO");
    }

    #[test]
    fn test_spaces_removed_and_uppercased() {
        let encrypted = encrypt("hello world", None).unwrap();
        assert_eq!(encrypted.len(), 10);
        assert_eq!(decrypt(&encrypted, None).unwrap(), "HELLOWORLD");
    }

    #[test]
    fn test_lowercase_ciphertext_accepted() {
        assert_eq!(decrypt("wrpih", None).unwrap(), "HELLO");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(encrypt("", None).unwrap(), "");
        assert_eq!(decrypt("", None).unwrap(), "");
    }

    #[test]
    fn test_rejects_key() {
        assert!(matches!(
            encrypt("HELLO", Some("KEY")),
            Err(Error::UnexpectedKey(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_characters() {
        assert!(matches!(encrypt("HELLO 1", None), Err(Error::InvalidInput(_))));
        assert!(matches!(decrypt("WRP IH", None), Err(Error::InvalidInput(_))));
    }
}
