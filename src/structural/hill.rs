//! Hill cipher
//!
//! Letter blocks of length `n` are treated as column vectors and multiplied
//! by an `n×n` key matrix mod 26. The inverse matrix is computed exactly: a
//! fraction-free (Bareiss) determinant over `BigInt`, the adjugate, and the
//! modular inverse of the determinant.

use crate::alphabet::{indices_to_string, letter_indices, ALPHABET_LEN};
use crate::error::{Error, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use tracing::trace;

const NAME: &str = "Hill Cipher";

/// Largest supported matrix dimension.
///
/// Determinants are exact at any size; this only bounds the cost of building
/// the adjugate, which takes `n²` determinants of `(n-1)×(n-1)` minors.
pub const MAX_DIMENSION: usize = 16;

/// Padding letter (`X`)
const PAD: u8 = 23;

const MODULUS: i128 = ALPHABET_LEN as i128;

/// Square key matrix with entries reduced mod 26
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HillKey {
    n: usize,
    /// Row-major entries in `0..26`
    entries: Vec<i128>,
}

impl HillKey {
    /// Parse comma-separated non-negative integers whose count is a perfect square
    pub fn parse(key: Option<&str>) -> Result<Self> {
        let key = key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            Error::InvalidKey(format!(
                "{} requires a key (comma-separated numbers, e.g. '3,3,2,5')",
                NAME
            ))
        })?;

        let mut entries = Vec::new();
        for token in key.split(',') {
            let token = token.trim();
            if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::InvalidKey(format!(
                    "{} key must be comma-separated non-negative integers, got '{}'",
                    NAME, token
                )));
            }
            let value: u64 = token.parse().map_err(|e| {
                Error::InvalidKey(format!("{} key value '{}' out of range: {}", NAME, token, e))
            })?;
            entries.push((value % ALPHABET_LEN as u64) as i128);
        }

        let n = integer_sqrt(entries.len());
        if n * n != entries.len() {
            return Err(Error::InvalidKey(format!(
                "{} key must form a square matrix (4 numbers for 2x2, 9 for 3x3), got {}",
                NAME,
                entries.len()
            )));
        }
        if n > MAX_DIMENSION {
            return Err(Error::InvalidKey(format!(
                "{} matrix dimension {} exceeds the supported maximum of {}",
                NAME, n, MAX_DIMENSION
            )));
        }

        Ok(HillKey { n, entries })
    }

    /// Matrix dimension `n`
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Determinant reduced into `0..26`
    pub fn determinant_mod26(&self) -> u8 {
        reduce(&determinant(&self.entries, self.n))
    }

    /// Inverse matrix mod 26.
    ///
    /// Fails with `InvalidKey` when the determinant shares a factor with 26.
    pub fn inverse(&self) -> Result<HillKey> {
        let det = self.determinant_mod26();
        let det_inv = inverse_mod26(det).ok_or_else(|| {
            Error::InvalidKey(format!(
                "{} key matrix is not invertible mod 26 (determinant {} shares a factor with 26)",
                NAME, det
            ))
        })?;

        let n = self.n;
        let mut entries = vec![0i128; n * n];
        if n == 1 {
            entries[0] = det_inv as i128;
        } else {
            for i in 0..n {
                for j in 0..n {
                    // adj[i][j] is the (j, i) cofactor
                    let minor = self.minor(j, i);
                    let sign = if (i + j) % 2 == 0 { 1 } else { -1 };
                    let cofactor = sign * reduce(&determinant(&minor, n - 1)) as i128;
                    entries[i * n + j] = (cofactor * det_inv as i128).rem_euclid(MODULUS);
                }
            }
        }

        trace!("Inverted {}x{} Hill matrix (det {})", n, n, det);
        Ok(HillKey { n, entries })
    }

    /// Matrix without `row` and `col`, row-major
    fn minor(&self, row: usize, col: usize) -> Vec<i128> {
        let n = self.n;
        let mut out = Vec::with_capacity((n - 1) * (n - 1));
        for r in (0..n).filter(|&r| r != row) {
            for c in (0..n).filter(|&c| c != col) {
                out.push(self.entries[r * n + c]);
            }
        }
        out
    }

    /// Multiply each `n`-letter block by the matrix mod 26
    fn apply(&self, letters: &[u8]) -> Vec<u8> {
        let n = self.n;
        let mut out = Vec::with_capacity(letters.len());
        for block in letters.chunks(n) {
            for row in 0..n {
                let sum: i128 = (0..n)
                    .map(|col| self.entries[row * n + col] * block[col] as i128)
                    .sum();
                out.push(sum.rem_euclid(MODULUS) as u8);
            }
        }
        out
    }
}

/// Largest `r` with `r * r <= value`
fn integer_sqrt(value: usize) -> usize {
    let mut r = (value as f64).sqrt() as usize;
    while r * r > value {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= value {
        r += 1;
    }
    r
}

/// Reduce an integer into `0..26`
fn reduce(value: &BigInt) -> u8 {
    value
        .mod_floor(&BigInt::from(MODULUS))
        .to_u8()
        .unwrap_or_default()
}

/// Exact integer determinant by fraction-free Gaussian elimination (Bareiss).
///
/// Each step divides exactly by the previous pivot, but the product formed
/// before that division is a product of two minors, so it runs on `BigInt`.
fn determinant(entries: &[i128], n: usize) -> BigInt {
    if n == 0 {
        return BigInt::one();
    }

    let mut m: Vec<BigInt> = entries.iter().map(|&v| BigInt::from(v)).collect();
    let mut negate = false;
    let mut prev = BigInt::one();

    for k in 0..n - 1 {
        if m[k * n + k].is_zero() {
            match (k + 1..n).find(|&i| !m[i * n + k].is_zero()) {
                Some(swap) => {
                    for c in 0..n {
                        m.swap(k * n + c, swap * n + c);
                    }
                    negate = !negate;
                }
                None => return BigInt::zero(),
            }
        }

        let pivot = m[k * n + k].clone();
        for i in k + 1..n {
            for j in k + 1..n {
                let value = (&m[i * n + j] * &pivot - &m[i * n + k] * &m[k * n + j]) / &prev;
                m[i * n + j] = value;
            }
        }
        prev = pivot;
    }

    let det = m[n * n - 1].clone();
    if negate {
        -det
    } else {
        det
    }
}

/// Multiplicative inverse mod 26, if one exists
pub fn inverse_mod26(value: u8) -> Option<u8> {
    (1..ALPHABET_LEN).find(|&x| (value as u32 * x as u32) % ALPHABET_LEN as u32 == 1)
}

/// Encrypt letters only, uppercased and padded with `X` to a multiple of `n`.
///
/// Non-invertible keys are rejected here too, since their output could never
/// be decrypted.
pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    let key = HillKey::parse(key)?;
    key.inverse()?;

    let mut letters = letter_indices(text);
    while letters.len() % key.dimension() != 0 {
        letters.push(PAD);
    }

    Ok(indices_to_string(&key.apply(&letters)))
}

pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    let key = HillKey::parse(key)?;
    let letters = letter_indices(text);

    if letters.len() % key.dimension() != 0 {
        return Err(Error::InvalidInput(format!(
            "{} ciphertext length {} is not a multiple of the matrix size {}",
            NAME,
            letters.len(),
            key.dimension()
        )));
    }

    let inverse = key.inverse()?;
    Ok(indices_to_string(&inverse.apply(&letters)))
}
