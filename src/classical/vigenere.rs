//! Vigenère cipher
//!
//! Letter `j` of the text (counting letters only) is shifted by
//! `key[j mod len(key)]`. Non-letters pass through without advancing `j`.

use crate::alphabet::{map_letters, parse_letter_key, wrap};
use crate::error::Result;

const NAME: &str = "Vigenère Cipher";

fn apply(text: &str, key: Option<&str>, direction: i64) -> Result<String> {
    let shifts = parse_letter_key(key, NAME)?;
    let mut j = 0usize;
    Ok(map_letters(text, |idx| {
        let shift = shifts[j % shifts.len()] as i64;
        j += 1;
        wrap(idx as i64 + direction * shift)
    }))
}

pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    apply(text, key, 1)
}

pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    apply(text, key, -1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_textbook_vector() {
        assert_eq!(
            encrypt("ATTACKATDAWN", Some("LEMON")).unwrap(),
            "LXFOPVEFRNHR"
        );
    }

    #[test]
    fn test_non_letters_do_not_advance_key() {
        assert_eq!(
            encrypt("Attack at dawn!", Some("lemon")).unwrap(),
            "Lxfopv ef rnhr!"
        );
    }

    #[test]
    fn test_roundtrip() {
        let text = "Sphinx of black quartz, judge my vow";
        let encrypted = encrypt(text, Some("Cipher")).unwrap();
        assert_eq!(decrypt(&encrypted, Some("Cipher")).unwrap(), text);
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(encrypt("abc", None), Err(Error::InvalidKey(_))));
        assert!(matches!(encrypt("abc", Some("")), Err(Error::InvalidKey(_))));
        assert!(matches!(
            encrypt("abc", Some("key 1")),
            Err(Error::InvalidKey(_))
        ));
    }
}
