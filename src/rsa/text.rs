//! Text framing for RSA
//!
//! Text is packed base-256 into integers below the modulus. Block mode splits
//! the UTF-8 bytes into chunks of `ceil(bits(n) / 8) - 1` bytes so every chunk
//! fits. No padding scheme is applied. Every block but the last is a full
//! chunk, so decrypt restores its leading zero bytes; leading zero bytes of the
//! final block are lost.

use super::keys::{PrivateKey, PublicKey};
use crate::error::{Error, Result};
use num_bigint::BigUint;
use num_traits::Zero;
use std::str::FromStr;
use tracing::trace;

/// Pack bytes into one integer, first byte most significant
pub fn text_to_int(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Unpack an integer into bytes; zero becomes the empty sequence
pub fn int_to_text(m: &BigUint) -> Vec<u8> {
    if m.is_zero() {
        Vec::new()
    } else {
        m.to_bytes_be()
    }
}

/// Bytes per block for modulus `n`
pub fn block_size(n: &BigUint) -> Result<usize> {
    let size = ((n.bits() + 7) / 8) as usize;
    match size.checked_sub(1) {
        Some(bytes) if bytes > 0 => Ok(bytes),
        _ => Err(Error::InvalidKey(format!(
            "RSA modulus {} is too small for block encryption (needs at least 9 bits)",
            n
        ))),
    }
}

/// Encrypt the whole text as one integer
pub fn encrypt_text(text: &str, key: &PublicKey) -> Result<BigUint> {
    key.encrypt(&text_to_int(text.as_bytes()))
}

/// Decrypt a single-integer ciphertext back to text
pub fn decrypt_text(c: &BigUint, key: &PrivateKey) -> Result<String> {
    let bytes = int_to_text(&key.decrypt(c)?);
    String::from_utf8(bytes)
        .map_err(|_| Error::InvalidInput("Decrypted RSA message is not valid UTF-8".to_string()))
}

/// Encrypt text block by block
pub fn encrypt_blocks(text: &str, key: &PublicKey) -> Result<Vec<BigUint>> {
    let size = block_size(key.modulus())?;
    trace!("RSA block encrypt: {} bytes in {}-byte blocks", text.len(), size);

    text.as_bytes()
        .chunks(size)
        .map(|chunk| key.encrypt(&text_to_int(chunk)))
        .collect()
}

/// Decrypt each block and decode the concatenated bytes as UTF-8.
///
/// All blocks except the last are left-padded with zeros back to the full
/// block size.
pub fn decrypt_blocks(blocks: &[BigUint], key: &PrivateKey) -> Result<String> {
    let size = block_size(key.modulus())?;
    let last = blocks.len().saturating_sub(1);

    let mut bytes = Vec::with_capacity(blocks.len() * size);
    for (i, block) in blocks.iter().enumerate() {
        let chunk = int_to_text(&key.decrypt(block)?);
        if i < last && chunk.len() < size {
            bytes.resize(bytes.len() + size - chunk.len(), 0);
        }
        bytes.extend(chunk);
    }

    String::from_utf8(bytes)
        .map_err(|_| Error::InvalidInput("Decrypted RSA message is not valid UTF-8".to_string()))
}

/// Render blocks as space-separated decimals
pub fn format_blocks(blocks: &[BigUint]) -> String {
    blocks
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse whitespace-separated decimal blocks
pub fn parse_blocks(s: &str) -> Result<Vec<BigUint>> {
    s.split_whitespace()
        .map(|token| {
            BigUint::from_str(token).map_err(|_| {
                Error::InvalidFormat(format!("RSA ciphertext block '{}' is not a number", token))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::KeyPair;

    #[test]
    fn test_text_int_conversion() {
        assert_eq!(text_to_int(b"AB"), BigUint::from(0x4142u32));
        assert_eq!(int_to_text(&BigUint::from(0x4142u32)), b"AB");
        assert_eq!(text_to_int(b""), BigUint::zero());
        assert!(int_to_text(&BigUint::zero()).is_empty());
    }

    #[test]
    fn test_block_size() {
        let pair = KeyPair::default_pair().unwrap();
        assert_eq!(block_size(pair.modulus()).unwrap(), 2);
        assert_eq!(block_size(&BigUint::from(65536u32)).unwrap(), 2);
        assert_eq!(block_size(&BigUint::from(256u32)).unwrap(), 1);
        assert!(matches!(
            block_size(&BigUint::from(255u32)),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_single_block_too_large() {
        let pair = KeyPair::default_pair().unwrap();
        assert!(matches!(
            encrypt_text("Hello RSA!", &pair.public),
            Err(Error::MessageTooLarge { .. })
        ));
    }

    #[test]
    fn test_single_block_roundtrip() {
        let pair = KeyPair::default_pair().unwrap();
        let c = encrypt_text("Hi", &pair.public).unwrap();
        assert_eq!(decrypt_text(&c, &pair.private).unwrap(), "Hi");
    }

    #[test]
    fn test_block_roundtrip() {
        let pair = KeyPair::default_pair().unwrap();
        let text = "This is a longer message that will need to be broken into multiple blocks.";
        let blocks = encrypt_blocks(text, &pair.public).unwrap();
        assert_eq!(blocks.len(), (text.len() + 1) / 2);
        assert_eq!(decrypt_blocks(&blocks, &pair.private).unwrap(), text);
    }

    #[test]
    fn test_multibyte_split_across_blocks() {
        let pair = KeyPair::default_pair().unwrap();
        let text = "héllo wörld ✓";
        let blocks = encrypt_blocks(text, &pair.public).unwrap();
        assert_eq!(decrypt_blocks(&blocks, &pair.private).unwrap(), text);
    }

    #[test]
    fn test_zero_bytes_inside_multi_block_message() {
        let pair = KeyPair::default_pair().unwrap();
        for text in ["AB\0CDE", "\0\0XY", "A\0\0\0\0BC", "\0AB\0"] {
            let blocks = encrypt_blocks(text, &pair.public).unwrap();
            assert!(blocks.len() > 1);
            assert_eq!(decrypt_blocks(&blocks, &pair.private).unwrap(), text);
        }
    }

    #[test]
    fn test_leading_zero_of_final_block_is_lost() {
        let pair = KeyPair::default_pair().unwrap();
        let blocks = encrypt_blocks("AB\0C", &pair.public).unwrap();
        assert_eq!(decrypt_blocks(&blocks, &pair.private).unwrap(), "ABC");
    }

    #[test]
    fn test_block_string_format() {
        let blocks = vec![BigUint::from(12u32), BigUint::from(345u32)];
        assert_eq!(format_blocks(&blocks), "12 345");
        assert_eq!(parse_blocks(" 12\n345 ").unwrap(), blocks);
        assert!(matches!(parse_blocks("12 x"), Err(Error::InvalidFormat(_))));
        assert!(parse_blocks("").unwrap().is_empty());
    }
}
