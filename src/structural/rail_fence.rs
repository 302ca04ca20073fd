//! Rail Fence (zig-zag) transposition
//!
//! Characters are written down and up across `rails` rows, then the rows are
//! concatenated top to bottom. Every character takes part, including spaces
//! and punctuation.

use crate::alphabet::parse_numeric_key;
use crate::error::{Error, Result};

const NAME: &str = "Rail Fence Cipher";

/// Parse the rail count: an integer ≥ 2
pub fn parse_key(key: Option<&str>) -> Result<u64> {
    let rails = parse_numeric_key(key, NAME)?;
    if rails < 2 {
        return Err(Error::InvalidKey(format!(
            "{} key must be an integer >= 2, got {}",
            NAME, rails
        )));
    }
    Ok(rails)
}

/// Rail index of every position for a message of `len` characters.
///
/// A key larger than the message never bounces, so it is clamped to keep the
/// rail table proportional to the input.
pub fn rail_pattern(len: usize, rails: u64) -> (usize, Vec<usize>) {
    let rails = rails.min(len.max(2) as u64) as usize;
    let cycle = 2 * (rails - 1);
    let pattern = (0..len)
        .map(|i| {
            let r = i % cycle;
            if r < rails {
                r
            } else {
                cycle - r
            }
        })
        .collect();
    (rails, pattern)
}

pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    let chars: Vec<char> = text.chars().collect();
    let (rails, pattern) = rail_pattern(chars.len(), parse_key(key)?);

    let mut rows: Vec<String> = vec![String::new(); rails];
    for (c, rail) in chars.into_iter().zip(pattern) {
        rows[rail].push(c);
    }

    Ok(rows.concat())
}

pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    let chars: Vec<char> = text.chars().collect();
    let (rails, pattern) = rail_pattern(chars.len(), parse_key(key)?);

    let mut counts = vec![0usize; rails];
    for &rail in &pattern {
        counts[rail] += 1;
    }

    let mut rows: Vec<std::slice::Iter<'_, char>> = Vec::with_capacity(rails);
    let mut start = 0;
    for count in counts {
        rows.push(chars[start..start + count].iter());
        start += count;
    }

    pattern
        .into_iter()
        .map(|rail| {
            rows[rail].next().copied().ok_or_else(|| {
                Error::InvalidInput(format!("{} rail {} exhausted", NAME, rail))
            })
        })
        .collect()
}
