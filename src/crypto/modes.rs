//! AES-CBC, AES-CTR and AES-GCM over the RustCrypto block cipher traits

use super::{
    AesKey, AesMode, Encoding, Envelope, KeySize, OutputFormat, BLOCK_SIZE, CTR_NONCE_SIZE,
    GCM_NONCE_SIZE, GCM_WIDE_NONCE_SIZE, TAG_SIZE,
};
use crate::error::{Error, Result};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{AeadInPlace, KeyInit, Nonce, Tag};
use aes_gcm::AesGcm;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

type CbcEnc<C> = cbc::Encryptor<C>;
type CbcDec<C> = cbc::Decryptor<C>;
type Ctr<C> = ctr::Ctr64BE<C>;
type Gcm<C> = AesGcm<C, U12>;
type GcmWide<C> = AesGcm<C, U16>;

/// Encrypt raw bytes under a fresh random IV/nonce
pub fn encrypt_bytes(data: &[u8], key: &AesKey, mode: AesMode) -> Result<Envelope> {
    debug!(
        "AES-{} {} encrypt of {} bytes",
        key.size().bits(),
        mode,
        data.len()
    );

    let k = key.as_bytes();
    let envelope = match mode {
        AesMode::Cbc => {
            let iv = random_bytes(BLOCK_SIZE);
            let ciphertext = match key.size() {
                KeySize::Aes128 => cbc_seal::<CbcEnc<Aes128>>(k, &iv, data)?,
                KeySize::Aes192 => cbc_seal::<CbcEnc<Aes192>>(k, &iv, data)?,
                KeySize::Aes256 => cbc_seal::<CbcEnc<Aes256>>(k, &iv, data)?,
            };
            sealed(mode, iv, ciphertext, None)
        }
        AesMode::Ctr => {
            let nonce = random_bytes(CTR_NONCE_SIZE);
            let ciphertext = ctr_apply(key, &nonce, data)?;
            sealed(mode, nonce, ciphertext, None)
        }
        AesMode::Gcm => {
            let nonce = random_bytes(GCM_NONCE_SIZE);
            let (ciphertext, tag) = match key.size() {
                KeySize::Aes128 => gcm_seal::<Gcm<Aes128>>(k, &nonce, data)?,
                KeySize::Aes192 => gcm_seal::<Gcm<Aes192>>(k, &nonce, data)?,
                KeySize::Aes256 => gcm_seal::<Gcm<Aes256>>(k, &nonce, data)?,
            };
            sealed(mode, nonce, ciphertext, Some(tag))
        }
    };

    Ok(envelope)
}

/// Decrypt an envelope back to raw bytes
pub fn decrypt_bytes(envelope: &Envelope, key: &AesKey) -> Result<Vec<u8>> {
    debug!(
        "AES-{} {} decrypt of {} bytes",
        key.size().bits(),
        envelope.mode,
        envelope.ciphertext.len()
    );

    let k = key.as_bytes();
    let iv = envelope.iv.as_slice();
    let data = envelope.ciphertext.as_slice();

    match envelope.mode {
        AesMode::Cbc => {
            check_len("IV", iv.len(), &[BLOCK_SIZE])?;
            if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
                return Err(Error::InvalidInput(format!(
                    "AES-CBC ciphertext length {} is not a positive multiple of {}",
                    data.len(),
                    BLOCK_SIZE
                )));
            }
            match key.size() {
                KeySize::Aes128 => cbc_open::<CbcDec<Aes128>>(k, iv, data),
                KeySize::Aes192 => cbc_open::<CbcDec<Aes192>>(k, iv, data),
                KeySize::Aes256 => cbc_open::<CbcDec<Aes256>>(k, iv, data),
            }
        }
        AesMode::Ctr => {
            check_len("nonce", iv.len(), &[CTR_NONCE_SIZE])?;
            ctr_apply(key, iv, data)
        }
        AesMode::Gcm => {
            let tag = envelope.tag.as_deref().ok_or_else(|| {
                Error::InvalidFormat("AES-GCM envelope is missing its tag".to_string())
            })?;
            check_len("nonce", iv.len(), &[GCM_NONCE_SIZE, GCM_WIDE_NONCE_SIZE])?;
            check_len("tag", tag.len(), &[TAG_SIZE])?;

            match (key.size(), iv.len() == GCM_NONCE_SIZE) {
                (KeySize::Aes128, true) => gcm_open::<Gcm<Aes128>>(k, iv, data, tag),
                (KeySize::Aes192, true) => gcm_open::<Gcm<Aes192>>(k, iv, data, tag),
                (KeySize::Aes256, true) => gcm_open::<Gcm<Aes256>>(k, iv, data, tag),
                (KeySize::Aes128, false) => gcm_open::<GcmWide<Aes128>>(k, iv, data, tag),
                (KeySize::Aes192, false) => gcm_open::<GcmWide<Aes192>>(k, iv, data, tag),
                (KeySize::Aes256, false) => gcm_open::<GcmWide<Aes256>>(k, iv, data, tag),
            }
        }
    }
}

/// Encrypt UTF-8 text and render the envelope
pub fn encrypt(
    text: &str,
    key: Option<&str>,
    mode: AesMode,
    format: OutputFormat,
) -> Result<String> {
    let key = AesKey::parse(key)?;
    let envelope = encrypt_bytes(text.as_bytes(), &key, mode)?;
    Ok(envelope.render(format))
}

/// Parse an envelope, decrypt it and decode the plaintext as UTF-8
pub fn decrypt(text: &str, key: Option<&str>) -> Result<String> {
    let key = AesKey::parse(key)?;
    let envelope = Envelope::parse(text)?;
    let plaintext = decrypt_bytes(&envelope, &key)?;

    String::from_utf8(plaintext).map_err(|_| {
        Error::InvalidInput("Decrypted AES plaintext is not valid UTF-8".to_string())
    })
}

fn sealed(mode: AesMode, iv: Vec<u8>, ciphertext: Vec<u8>, tag: Option<Vec<u8>>) -> Envelope {
    Envelope {
        mode,
        encoding: Encoding::Untagged,
        iv,
        ciphertext,
        tag,
    }
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

fn check_len(what: &str, len: usize, allowed: &[usize]) -> Result<()> {
    if allowed.contains(&len) {
        Ok(())
    } else {
        Err(Error::InvalidFormat(format!(
            "Invalid AES {} length: {} bytes",
            what, len
        )))
    }
}

fn cbc_seal<C>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: KeyIvInit + BlockEncryptMut,
{
    let cipher = C::new_from_slices(key, iv)
        .map_err(|_| Error::InvalidKey("Failed to create AES-CBC cipher".to_string()))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(data))
}

fn cbc_open<C>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: KeyIvInit + BlockDecryptMut,
{
    let cipher = C::new_from_slices(key, iv)
        .map_err(|_| Error::InvalidKey("Failed to create AES-CBC cipher".to_string()))?;
    cipher.decrypt_padded_vec_mut::<Pkcs7>(data).map_err(|_| {
        Error::InvalidInput("AES-CBC padding is incorrect - ciphertext corrupted or wrong key".to_string())
    })
}

/// CTR keystream; the counter block is `nonce || 0u64` incremented big-endian
fn ctr_apply(key: &AesKey, nonce: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut counter_block = [0u8; BLOCK_SIZE];
    counter_block[..CTR_NONCE_SIZE].copy_from_slice(nonce);

    let k = key.as_bytes();
    let mut buf = data.to_vec();
    match key.size() {
        KeySize::Aes128 => ctr_xor::<Ctr<Aes128>>(k, &counter_block, &mut buf)?,
        KeySize::Aes192 => ctr_xor::<Ctr<Aes192>>(k, &counter_block, &mut buf)?,
        KeySize::Aes256 => ctr_xor::<Ctr<Aes256>>(k, &counter_block, &mut buf)?,
    }
    Ok(buf)
}

fn ctr_xor<C>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<()>
where
    C: KeyIvInit + StreamCipher,
{
    let mut cipher = C::new_from_slices(key, iv)
        .map_err(|_| Error::InvalidKey("Failed to create AES-CTR cipher".to_string()))?;
    cipher.apply_keystream(buf);
    Ok(())
}

fn gcm_seal<A>(key: &[u8], nonce: &[u8], data: &[u8]) -> Result<(Vec<u8>, Vec<u8>)>
where
    A: AeadInPlace + KeyInit,
{
    let cipher = A::new_from_slice(key)
        .map_err(|_| Error::InvalidKey("Failed to create AES-GCM cipher".to_string()))?;
    check_len("nonce", nonce.len(), &[A::NonceSize::USIZE])?;

    let mut buf = data.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<A>::from_slice(nonce), b"", &mut buf)
        .map_err(|_| Error::InvalidInput("AES-GCM encryption failed".to_string()))?;

    Ok((buf, tag.to_vec()))
}

fn gcm_open<A>(key: &[u8], nonce: &[u8], data: &[u8], tag: &[u8]) -> Result<Vec<u8>>
where
    A: AeadInPlace + KeyInit,
{
    let cipher = A::new_from_slice(key)
        .map_err(|_| Error::InvalidKey("Failed to create AES-GCM cipher".to_string()))?;
    check_len("nonce", nonce.len(), &[A::NonceSize::USIZE])?;
    check_len("tag", tag.len(), &[A::TagSize::USIZE])?;

    let mut buf = data.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::<A>::from_slice(nonce),
            b"",
            &mut buf,
            Tag::<A>::from_slice(tag),
        )
        .map_err(|_| Error::AuthenticationFailed)?;

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_128: &str = "my secret key!!!";
    const KEY_256_HEX: &str =
        "0x603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4";

    #[test]
    fn test_cbc_roundtrip() {
        let encrypted = encrypt("Hello, AES!", Some(KEY_128), AesMode::Cbc, OutputFormat::Base64)
            .unwrap();
        assert!(encrypted.starts_with("CBC/b64:"));
        assert_eq!(decrypt(&encrypted, Some(KEY_128)).unwrap(), "Hello, AES!");
    }

    #[test]
    fn test_all_modes_and_formats() {
        for mode in [AesMode::Cbc, AesMode::Ctr, AesMode::Gcm] {
            for format in [OutputFormat::Base64, OutputFormat::Hex] {
                let text = "Grüße aus Köln";
                let encrypted = encrypt(text, Some(KEY_256_HEX), mode, format).unwrap();
                assert_eq!(
                    decrypt(&encrypted, Some(KEY_256_HEX)).unwrap(),
                    text,
                    "{} / {}",
                    mode,
                    format
                );
            }
        }
    }

    #[test]
    fn test_aes_192() {
        let key = "twenty-four byte key....";
        let encrypted = encrypt("192-bit", Some(key), AesMode::Gcm, OutputFormat::Hex).unwrap();
        assert_eq!(decrypt(&encrypted, Some(key)).unwrap(), "192-bit");
    }

    #[test]
    fn test_envelope_shapes() {
        let gcm = encrypt("x", Some(KEY_128), AesMode::Gcm, OutputFormat::Hex).unwrap();
        let parts: Vec<&str> = gcm.split(':').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1].len(), GCM_NONCE_SIZE * 2);
        assert_eq!(parts[3].len(), TAG_SIZE * 2);

        let ctr = encrypt("x", Some(KEY_128), AesMode::Ctr, OutputFormat::Hex).unwrap();
        let parts: Vec<&str> = ctr.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), CTR_NONCE_SIZE * 2);
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let a = encrypt("same", Some(KEY_128), AesMode::Cbc, OutputFormat::Hex).unwrap();
        let b = encrypt("same", Some(KEY_128), AesMode::Cbc, OutputFormat::Hex).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_gcm_tamper_detected() {
        let encrypted =
            encrypt("attack at dawn", Some(KEY_128), AesMode::Gcm, OutputFormat::Hex).unwrap();
        let mut parts: Vec<String> = encrypted.split(':').map(String::from).collect();
        let first = parts[2].remove(0);
        let replacement = if first == '0' { '1' } else { '0' };
        parts[2].insert(0, replacement);
        let tampered = parts.join(":");

        assert!(matches!(
            decrypt(&tampered, Some(KEY_128)),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_gcm_wrong_key() {
        let encrypted =
            encrypt("secret", Some(KEY_128), AesMode::Gcm, OutputFormat::Base64).unwrap();
        assert!(matches!(
            decrypt(&encrypted, Some("another key!!!!!")),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_untagged_cbc_envelope() {
        let key = AesKey::parse(Some(KEY_128)).unwrap();
        let envelope = encrypt_bytes(b"legacy", &key, AesMode::Cbc).unwrap();
        let b64 = envelope.render(OutputFormat::Base64);
        let legacy = b64.trim_start_matches("CBC/b64:");

        assert_eq!(decrypt(&format!("CBC:{}", legacy), Some(KEY_128)).unwrap(), "legacy");
        assert_eq!(decrypt(legacy, Some(KEY_128)).unwrap(), "legacy");
    }

    #[test]
    fn test_wide_gcm_nonce_accepted() {
        let key = AesKey::parse(Some(KEY_128)).unwrap();
        let nonce = [7u8; GCM_WIDE_NONCE_SIZE];
        let (ciphertext, tag) =
            gcm_seal::<GcmWide<Aes128>>(key.as_bytes(), &nonce, b"wide nonce").unwrap();
        let envelope = Envelope {
            mode: AesMode::Gcm,
            encoding: Encoding::Untagged,
            iv: nonce.to_vec(),
            ciphertext,
            tag: Some(tag),
        };
        assert_eq!(decrypt_bytes(&envelope, &key).unwrap(), b"wide nonce");
    }

    #[test]
    fn test_ctr_counter_layout() {
        use aes::cipher::BlockEncrypt;

        let key = AesKey::from_bytes(&[0x2b; 16]).unwrap();
        let nonce = [0xf0u8; CTR_NONCE_SIZE];
        let keystream = ctr_apply(&key, &nonce, &[0u8; 2 * BLOCK_SIZE]).unwrap();

        let cipher = Aes128::new_from_slice(key.as_bytes()).unwrap();
        for (counter, chunk) in keystream.chunks(BLOCK_SIZE).enumerate() {
            let mut block = [0u8; BLOCK_SIZE];
            block[..CTR_NONCE_SIZE].copy_from_slice(&nonce);
            block[BLOCK_SIZE - 1] = counter as u8;
            let mut block = aes::Block::clone_from_slice(&block);
            cipher.encrypt_block(&mut block);
            assert_eq!(chunk, block.as_slice());
        }
    }

    #[test]
    fn test_bad_component_lengths() {
        let key = AesKey::parse(Some(KEY_128)).unwrap();
        let envelope = Envelope {
            mode: AesMode::Cbc,
            encoding: Encoding::Untagged,
            iv: vec![0; 8],
            ciphertext: vec![0; 16],
            tag: None,
        };
        assert!(matches!(
            decrypt_bytes(&envelope, &key),
            Err(Error::InvalidFormat(_))
        ));

        let envelope = Envelope {
            iv: vec![0; 16],
            ciphertext: vec![0; 15],
            ..envelope
        };
        assert!(matches!(
            decrypt_bytes(&envelope, &key),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_non_utf8_plaintext() {
        let key = AesKey::parse(Some(KEY_128)).unwrap();
        let envelope = encrypt_bytes(&[0xff, 0xfe], &key, AesMode::Ctr).unwrap();
        let rendered = envelope.render(OutputFormat::Hex);
        assert!(matches!(
            decrypt(&rendered, Some(KEY_128)),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(
            decrypt_bytes(&Envelope::parse(&rendered).unwrap(), &key).unwrap(),
            vec![0xff, 0xfe]
        );
    }
}
