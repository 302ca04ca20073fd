//! Caesar cipher

use crate::alphabet::{parse_numeric_key, shift_text, ALPHABET_LEN};
use crate::error::{Error, Result};

const NAME: &str = "Caesar Cipher";

/// Parse a Caesar key: an integer in `1..=25`
pub fn parse_key(key: Option<&str>) -> Result<u8> {
    let shift = parse_numeric_key(key, NAME)?;
    if !(1..ALPHABET_LEN as u64).contains(&shift) {
        return Err(Error::InvalidKey(format!(
            "{} key must be an integer between 1 and 25, got {}",
            NAME, shift
        )));
    }
    Ok(shift as u8)
}

/// Shift every letter forward by the key
pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    let shift = parse_key(key)?;
    Ok(shift_text(text, shift as i64))
}

/// Shift every letter backward by the key
pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    let shift = parse_key(key)?;
    Ok(shift_text(text, -(shift as i64)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_known_vector() {
        assert_eq!(
            encrypt("The quick brown fox", Some("3")).unwrap(),
            "Wkh txlfn eurzq ira"
        );
    }

    #[test]
    fn test_roundtrip() {
        let text = "Meet me at the Old Bridge, 10pm!";
        let encrypted = encrypt(text, Some("17")).unwrap();
        assert_eq!(decrypt(&encrypted, Some("17")).unwrap(), text);
    }

    #[test]
    fn test_complementary_shift_is_identity() {
        let text = "Zebra Crossing";
        for k in 1..26u8 {
            let once = encrypt(text, Some(&k.to_string())).unwrap();
            let back = encrypt(&once, Some(&(26 - k).to_string())).unwrap();
            assert_eq!(back, text, "failed for shift {}", k);
        }
    }

    #[test]
    fn test_invalid_keys() {
        for key in [None, Some(""), Some("abc"), Some("0"), Some("26"), Some("-4")] {
            assert!(
                matches!(encrypt("abc", key), Err(Error::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }
}
