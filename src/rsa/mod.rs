//! RSA from first principles
//!
//! Key generation from a prime pair, square-and-multiply exponentiation and
//! extended-Euclid inverses over `num-bigint`. There is no padding scheme, so
//! this is for teaching and experimentation only and gives no real
//! confidentiality guarantee.

pub mod keys;
pub mod math;
pub mod text;

pub use keys::{generate_keys, random_prime, KeyPair, PrivateKey, PublicKey};
pub use math::{extended_gcd, gcd, is_probable_prime, mod_inverse, mod_pow};
pub use text::{
    decrypt_blocks, decrypt_text, encrypt_blocks, encrypt_text, int_to_text, text_to_int,
};

use crate::error::{Error, Result};

fn require_key<'a>(key: Option<&'a str>, what: &str) -> Result<&'a str> {
    key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
        Error::InvalidKey(format!(
            "RSA requires a {} key in the form 'exponent,modulus'",
            what
        ))
    })
}

/// Block-encrypt text under a `"e,n"` public key; blocks are space separated
pub fn encrypt(text: &str, key: Option<&str>) -> Result<String> {
    let key: PublicKey = require_key(key, "public")?.parse()?;
    let blocks = encrypt_blocks(text, &key)?;
    Ok(text::format_blocks(&blocks))
}

/// Decrypt space-separated blocks under a `"d,n"` private key
pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    let key: PrivateKey = require_key(key, "private")?.parse()?;
    let blocks = text::parse_blocks(text)?;
    decrypt_blocks(&blocks, &key)
}
