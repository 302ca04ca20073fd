//! Row (columnar) transposition
//!
//! The plaintext is laid out row-major under the key columns and read back
//! column by column in ascending order of the key numbers.

use crate::error::{Error, Result};
use std::collections::HashSet;

const NAME: &str = "Row Transposition Cipher";

/// Padding character appended to fill the last row
pub const PAD: char = 'X';

/// Column read order derived from a key such as `"3 1 2"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOrder {
    order: Vec<usize>,
}

impl ColumnOrder {
    /// Parse whitespace-separated distinct integers
    pub fn parse(key: Option<&str>) -> Result<Self> {
        let key = key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            Error::InvalidKey(format!(
                "{} requires a numeric key (space-separated numbers, e.g. '3 1 2')",
                NAME
            ))
        })?;

        let mut numbers = Vec::new();
        let mut seen = HashSet::new();
        for token in key.split_whitespace() {
            if !token.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::InvalidKey(format!(
                    "{} key must contain only numbers, got '{}'",
                    NAME, token
                )));
            }
            let value: u64 = token.parse().map_err(|e| {
                Error::InvalidKey(format!("{} key value '{}' out of range: {}", NAME, token, e))
            })?;
            if !seen.insert(value) {
                return Err(Error::InvalidKey(format!(
                    "{} key repeats column number {}",
                    NAME, value
                )));
            }
            numbers.push(value);
        }

        let mut order: Vec<usize> = (0..numbers.len()).collect();
        order.sort_by_key(|&idx| numbers[idx]);

        Ok(ColumnOrder { order })
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.order.len()
    }

    /// Column indices in the order they are read out
    pub fn read_order(&self) -> &[usize] {
        &self.order
    }
}

pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    let order = ColumnOrder::parse(key)?;
    let cols = order.columns();

    let mut chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    while chars.len() % cols != 0 {
        chars.push(PAD);
    }
    let rows = chars.len() / cols;

    let mut result = String::with_capacity(chars.len());
    for &col in order.read_order() {
        for row in 0..rows {
            result.push(chars[row * cols + col]);
        }
    }

    Ok(result)
}

/// Decrypt and strip trailing `X` padding.
///
/// Genuine trailing `X` characters of the plaintext are removed as well.
pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    let order = ColumnOrder::parse(key)?;
    let cols = order.columns();

    let chars: Vec<char> = text.chars().collect();
    if chars.len() % cols != 0 {
        return Err(Error::InvalidInput(format!(
            "{} ciphertext length {} is not a multiple of {} columns",
            NAME,
            chars.len(),
            cols
        )));
    }
    let rows = chars.len() / cols;

    let mut grid = vec![' '; chars.len()];
    let mut source = chars.into_iter();
    for &col in order.read_order() {
        for row in 0..rows {
            if let Some(c) = source.next() {
                grid[row * cols + col] = c;
            }
        }
    }

    let result: String = grid.into_iter().collect();
    Ok(result.trim_end_matches(PAD).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order() {
        let order = ColumnOrder::parse(Some("3 1 2")).unwrap();
        assert_eq!(order.read_order(), &[1, 2, 0]);
    }

    #[test]
    fn test_textbook_vector() {
        let encrypted = encrypt("attack postponed until two am", Some("4 3 1 2 5 6 7")).unwrap();
        assert_eq!(encrypted, "ttnaaptmtsuoaodwcoiXknlXpetX");
    }

    #[test]
    fn test_roundtrip_strips_spaces_and_padding() {
        let key = Some("4 3 1 2 5 6 7");
        let encrypted = encrypt("attack postponed until two am", key).unwrap();
        assert_eq!(decrypt(&encrypted, key).unwrap(), "attackpostponeduntiltwoam");
    }

    #[test]
    fn test_padding_to_full_rows() {
        let encrypted = encrypt("HELLO", Some("2 1")).unwrap();
        assert_eq!(encrypted, "ELXHLO");
        assert_eq!(decrypt(&encrypted, Some("2 1")).unwrap(), "HELLO");
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(encrypt("abc", None), Err(Error::InvalidKey(_))));
        assert!(matches!(encrypt("abc", Some("  ")), Err(Error::InvalidKey(_))));
        assert!(matches!(encrypt("abc", Some("3 a 1")), Err(Error::InvalidKey(_))));
        assert!(matches!(encrypt("abc", Some("1 2 2")), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_decrypt_rejects_ragged_ciphertext() {
        assert!(matches!(
            decrypt("ABCDE", Some("2 1")),
            Err(Error::InvalidInput(_))
        ));
    }
}
