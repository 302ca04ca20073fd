//! Alphabet helpers shared by the letter ciphers
//!
//! Letters are the ASCII range `A..=Z` / `a..=z`. Every helper here preserves
//! case and leaves anything else (digits, punctuation, whitespace, non-ASCII)
//! untouched.

use crate::error::{Error, Result};

/// Number of letters in the alphabet
pub const ALPHABET_LEN: u8 = 26;

/// Alphabet position of an ASCII letter (`A`/`a` = 0)
pub fn index_of(c: char) -> Option<u8> {
    if c.is_ascii_uppercase() {
        Some(c as u8 - b'A')
    } else if c.is_ascii_lowercase() {
        Some(c as u8 - b'a')
    } else {
        None
    }
}

/// Letter at an alphabet position, in the requested case
pub fn letter_at(index: u8, upper: bool) -> char {
    let base = if upper { b'A' } else { b'a' };
    (base + index % ALPHABET_LEN) as char
}

/// Reduce any signed value into `0..26`
pub fn wrap(value: i64) -> u8 {
    value.rem_euclid(ALPHABET_LEN as i64) as u8
}

/// Apply `f` to the alphabet index of every letter, keeping its case.
///
/// `f` is only called for letters, so callers can keep a running letter
/// counter inside the closure.
pub fn map_letters<F>(text: &str, mut f: F) -> String
where
    F: FnMut(u8) -> u8,
{
    text.chars()
        .map(|c| match index_of(c) {
            Some(idx) => letter_at(f(idx), c.is_ascii_uppercase()),
            None => c,
        })
        .collect()
}

/// Shift every letter by `shift` positions (negative shifts go backwards)
pub fn shift_text(text: &str, shift: i64) -> String {
    map_letters(text, |idx| wrap(idx as i64 + shift))
}

/// Keep only letters, uppercased, as alphabet indices
pub fn letter_indices(text: &str) -> Vec<u8> {
    text.chars().filter_map(index_of).collect()
}

/// Render alphabet indices as an uppercase string
pub fn indices_to_string(indices: &[u8]) -> String {
    indices.iter().map(|&i| letter_at(i, true)).collect()
}

/// Whether every character is an ASCII letter
pub fn is_letters(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphabetic())
}

/// Reject text that contains anything other than letters and whitespace
pub fn require_letters_and_spaces(text: &str, algorithm: &str) -> Result<()> {
    if text
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{} input must contain only alphabetic characters and spaces",
            algorithm
        )))
    }
}

/// Parse an alphabetic key into alphabet indices.
///
/// Fails when the key is missing, empty or contains a non-letter.
pub fn parse_letter_key(key: Option<&str>, algorithm: &str) -> Result<Vec<u8>> {
    let key = key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::InvalidKey(format!("{} requires a key", algorithm)))?;

    if !is_letters(key) {
        return Err(Error::InvalidKey(format!(
            "{} key must contain only letters",
            algorithm
        )));
    }

    Ok(letter_indices(key))
}

/// Parse an unsigned decimal key, rejecting signs, spaces and empty strings
pub fn parse_numeric_key(key: Option<&str>, algorithm: &str) -> Result<u64> {
    let key = key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::InvalidKey(format!("{} requires a numeric key", algorithm)))?;

    if !key.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidKey(format!(
            "{} requires a numeric key, got '{}'",
            algorithm, key
        )));
    }

    key.parse::<u64>()
        .map_err(|e| Error::InvalidKey(format!("{} key out of range: {}", algorithm, e)))
}

/// Fail with `UnexpectedKey` if a non-empty key was supplied
pub fn forbid_key(key: Option<&str>, algorithm: &str) -> Result<()> {
    match key {
        Some(k) if !k.is_empty() => Err(Error::UnexpectedKey(format!(
            "{} does not take a key",
            algorithm
        ))),
        _ => Ok(()),
    }
}
