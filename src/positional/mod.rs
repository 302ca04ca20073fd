//! Position-based ciphers (Chris Way V1 and V2)
//!
//! Both shift letter `i` by an amount derived from `i` (and, for V2, the key),
//! then reverse the whole sequence. Output is always uppercase letters with
//! whitespace removed.

pub mod chris_way_v1;
pub mod chris_way_v2;

use crate::alphabet::{indices_to_string, is_letters, letter_indices, wrap};
use crate::error::{Error, Result};

/// Shift each letter by `schedule(i)` and reverse the result
pub(crate) fn shift_then_reverse<F>(text: &str, schedule: F) -> String
where
    F: Fn(usize) -> i64,
{
    let mut out: Vec<u8> = letter_indices(text)
        .into_iter()
        .enumerate()
        .map(|(i, idx)| wrap(idx as i64 + schedule(i)))
        .collect();
    out.reverse();
    indices_to_string(&out)
}

/// Reverse the sequence, then undo `schedule(i)` at each position
pub(crate) fn reverse_then_unshift<F>(text: &str, schedule: F) -> String
where
    F: Fn(usize) -> i64,
{
    let mut letters = letter_indices(text);
    letters.reverse();
    let out: Vec<u8> = letters
        .into_iter()
        .enumerate()
        .map(|(i, idx)| wrap(idx as i64 - schedule(i)))
        .collect();
    indices_to_string(&out)
}

/// Reject ciphertext that contains anything other than letters
pub(crate) fn require_letters(text: &str, algorithm: &str) -> Result<()> {
    if is_letters(text) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{} ciphertext must contain only alphabetic characters",
            algorithm
        )))
    }
}
