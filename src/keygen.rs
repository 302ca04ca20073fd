//! Random key generation
//!
//! Produces a key in the format each cipher accepts. Every generated key
//! parses successfully for its algorithm.

use crate::algorithm::Algorithm;
use crate::crypto::{AesKey, KeySize, KeySource};
use crate::error::{Error, Result};
use crate::rsa::KeyPair;
use crate::structural::hill::HillKey;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Printable ASCII characters used for AES text keys
const AES_TEXT_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Letters allowed in a Playfair key (no J)
const PLAYFAIR_LETTERS: &[u8] = b"ABCDEFGHIKLMNOPQRSTUVWXYZ";

const MAX_ATTEMPTS: usize = 10_000;

/// AES key rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AesKeyStyle {
    #[default]
    Text,
    Hex,
}

/// Key generation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeygenOptions {
    /// AES key length in bytes (16, 24 or 32)
    pub aes_key_bytes: usize,
    pub aes_key_style: AesKeyStyle,
    /// Bit length of each RSA prime
    pub rsa_prime_bits: u64,
}

impl Default for KeygenOptions {
    fn default() -> Self {
        Self {
            aes_key_bytes: 32,
            aes_key_style: AesKeyStyle::Text,
            rsa_prime_bits: 32,
        }
    }
}

/// A freshly generated key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedKey {
    /// The algorithm takes no key
    None,
    /// One key for both directions
    Symmetric(String),
    /// Separate encryption and decryption keys
    Pair { public: String, private: String },
}

impl GeneratedKey {
    /// Key to pass when encrypting
    pub fn encryption_key(&self) -> Option<&str> {
        match self {
            GeneratedKey::None => None,
            GeneratedKey::Symmetric(k) => Some(k),
            GeneratedKey::Pair { public, .. } => Some(public),
        }
    }

    /// Key to pass when decrypting
    pub fn decryption_key(&self) -> Option<&str> {
        match self {
            GeneratedKey::None => None,
            GeneratedKey::Symmetric(k) => Some(k),
            GeneratedKey::Pair { private, .. } => Some(private),
        }
    }
}

impl fmt::Display for GeneratedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratedKey::None => f.write_str("(no key required)"),
            GeneratedKey::Symmetric(k) => f.write_str(k),
            GeneratedKey::Pair { public, private } => {
                write!(f, "public:  {}\nprivate: {}", public, private)
            }
        }
    }
}

fn random_letters<R: Rng + ?Sized>(rng: &mut R, charset: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

fn uppercase<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> String {
    let len = rng.gen_range(min..=max);
    random_letters(rng, b"ABCDEFGHIJKLMNOPQRSTUVWXYZ", len)
}

fn playfair_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(5..=10);
    let mut key = String::with_capacity(len);
    for c in random_letters(rng, PLAYFAIR_LETTERS, len).chars() {
        if !key.contains(c) {
            key.push(c);
        }
    }
    key
}

fn row_transposition_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    let columns = rng.gen_range(3..=8);
    let mut order: Vec<usize> = (1..=columns).collect();
    order.shuffle(rng);
    order
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Random invertible 2x2 or 3x3 matrix mod 26
fn hill_key<R: Rng + ?Sized>(rng: &mut R) -> Result<String> {
    let n = if rng.gen_bool(0.5) { 2 } else { 3 };
    for _ in 0..MAX_ATTEMPTS {
        let entries: Vec<String> = (0..n * n)
            .map(|_| rng.gen_range(0..26u8).to_string())
            .collect();
        let key = entries.join(",");
        if HillKey::parse(Some(&key))?.inverse().is_ok() {
            return Ok(key);
        }
    }
    Err(Error::KeyGeneration(
        "No invertible Hill matrix found".to_string(),
    ))
}

fn substitution_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut alphabet: Vec<u8> = (b'A'..=b'Z').collect();
    alphabet.shuffle(rng);
    alphabet.into_iter().map(char::from).collect()
}

fn aes_key<R: Rng + ?Sized>(rng: &mut R, options: &KeygenOptions) -> Result<String> {
    if KeySize::from_len(options.aes_key_bytes).is_none() {
        return Err(Error::KeyGeneration(format!(
            "AES key length must be 16, 24 or 32 bytes, got {}",
            options.aes_key_bytes
        )));
    }

    match options.aes_key_style {
        AesKeyStyle::Hex => {
            let mut bytes = vec![0u8; options.aes_key_bytes];
            rng.fill(bytes.as_mut_slice());
            Ok(format!("0x{}", hex::encode(bytes)))
        }
        AesKeyStyle::Text => {
            // Keys that look like hex would be read as hex; draw again
            for _ in 0..MAX_ATTEMPTS {
                let key = random_letters(rng, AES_TEXT_CHARSET, options.aes_key_bytes);
                if matches!(AesKey::parse(Some(&key)), Ok(k) if k.source() == KeySource::Text) {
                    return Ok(key);
                }
            }
            Err(Error::KeyGeneration(
                "Could not generate an AES text key".to_string(),
            ))
        }
    }
}

/// Generate a key for `algorithm`
pub fn generate_key<R: Rng + ?Sized>(
    algorithm: Algorithm,
    options: &KeygenOptions,
    rng: &mut R,
) -> Result<GeneratedKey> {
    debug!("Generating key for {}", algorithm);

    let key = match algorithm {
        Algorithm::Rot13 | Algorithm::ChrisWayV1 => GeneratedKey::None,
        Algorithm::Caesar => GeneratedKey::Symmetric(rng.gen_range(1..=25u8).to_string()),
        Algorithm::RailFence => GeneratedKey::Symmetric(rng.gen_range(2..=10u8).to_string()),
        Algorithm::Playfair => GeneratedKey::Symmetric(playfair_key(rng)),
        Algorithm::RowTransposition => GeneratedKey::Symmetric(row_transposition_key(rng)),
        Algorithm::Hill => GeneratedKey::Symmetric(hill_key(rng)?),
        Algorithm::Substitution => GeneratedKey::Symmetric(substitution_key(rng)),
        Algorithm::Vigenere => GeneratedKey::Symmetric(uppercase(rng, 5, 15)),
        Algorithm::ChrisWayV2 => GeneratedKey::Symmetric(uppercase(rng, 6, 12)),
        Algorithm::Aes => GeneratedKey::Symmetric(aes_key(rng, options)?),
        Algorithm::Rsa => {
            let pair = KeyPair::random(options.rsa_prime_bits, rng)?;
            GeneratedKey::Pair {
                public: pair.public.to_string(),
                private: pair.private.to_string(),
            }
        }
    };

    Ok(key)
}
