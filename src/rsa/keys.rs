//! RSA key pairs

use super::math::{gcd, is_probable_prime, mod_inverse, mod_pow};
use crate::error::{Error, Result};
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Default first prime
pub const DEFAULT_P: u64 = 7919;

/// Default second prime
pub const DEFAULT_Q: u64 = 1009;

/// Preferred public exponent
pub const DEFAULT_EXPONENT: u64 = 65537;

/// Attempts before `random_prime` gives up
const MAX_PRIME_ATTEMPTS: usize = 100_000;

/// Public key `(e, n)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    e: BigUint,
    n: BigUint,
}

/// Private key `(d, n)`
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    d: BigUint,
    n: BigUint,
}

/// Matching public and private keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

fn check_modulus(n: &BigUint) -> Result<()> {
    if n < &BigUint::from(2u32) {
        return Err(Error::InvalidKey(format!(
            "RSA modulus must be at least 2, got {}",
            n
        )));
    }
    Ok(())
}

/// Parse `"exponent,modulus"` in decimal
fn parse_pair(s: &str, what: &str) -> Result<(BigUint, BigUint)> {
    let (exp, modulus) = s.split_once(',').ok_or_else(|| {
        Error::InvalidKey(format!(
            "RSA {} key must be 'exponent,modulus', got '{}'",
            what, s
        ))
    })?;

    let parse = |v: &str| {
        BigUint::from_str(v.trim()).map_err(|_| {
            Error::InvalidKey(format!("RSA {} key component '{}' is not a number", what, v.trim()))
        })
    };

    Ok((parse(exp)?, parse(modulus)?))
}

impl PublicKey {
    pub fn new(e: BigUint, n: BigUint) -> Result<Self> {
        check_modulus(&n)?;
        Ok(PublicKey { e, n })
    }

    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// `m^e mod n`; fails when `m >= n`
    pub fn encrypt(&self, m: &BigUint) -> Result<BigUint> {
        if m >= &self.n {
            return Err(Error::MessageTooLarge { bits: m.bits() });
        }
        Ok(mod_pow(m, &self.e, &self.n))
    }
}

impl PrivateKey {
    pub fn new(d: BigUint, n: BigUint) -> Result<Self> {
        check_modulus(&n)?;
        Ok(PrivateKey { d, n })
    }

    pub fn exponent(&self) -> &BigUint {
        &self.d
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// `c^d mod n`; fails when `c >= n`
    pub fn decrypt(&self, c: &BigUint) -> Result<BigUint> {
        if c >= &self.n {
            return Err(Error::InvalidInput(format!(
                "RSA ciphertext {} is not below the modulus",
                c
            )));
        }
        Ok(mod_pow(c, &self.d, &self.n))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("n", &self.n)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.e, self.n)
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.d, self.n)
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (e, n) = parse_pair(s, "public")?;
        PublicKey::new(e, n)
    }
}

impl FromStr for PrivateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (d, n) = parse_pair(s, "private")?;
        PrivateKey::new(d, n)
    }
}

/// Raw RSA encryption `m^e mod n`
pub fn encrypt(m: &BigUint, e: &BigUint, n: &BigUint) -> Result<BigUint> {
    PublicKey::new(e.clone(), n.clone())?.encrypt(m)
}

/// Raw RSA decryption `c^d mod n`
pub fn decrypt(c: &BigUint, d: &BigUint, n: &BigUint) -> Result<BigUint> {
    PrivateKey::new(d.clone(), n.clone())?.decrypt(c)
}

/// Public exponent for `phi`: 65537 when usable, else the first odd coprime from 3
fn choose_exponent(phi: &BigUint) -> BigUint {
    let preferred = BigUint::from(DEFAULT_EXPONENT);
    if &preferred < phi && gcd(&preferred, phi).is_one() {
        return preferred;
    }

    let mut candidate = BigUint::from(3u32);
    while &candidate < phi {
        if gcd(&candidate, phi).is_one() {
            return candidate;
        }
        candidate += 2u32;
    }

    preferred
}

/// Build a key pair from two distinct primes
pub fn generate_keys(p: &BigUint, q: &BigUint) -> Result<KeyPair> {
    let two = BigUint::from(2u32);
    if p < &two || q < &two {
        return Err(Error::KeyGeneration(
            "RSA primes must be at least 2".to_string(),
        ));
    }
    if p == q {
        return Err(Error::KeyGeneration(
            "RSA primes p and q must be distinct".to_string(),
        ));
    }
    for prime in [p, q] {
        if !is_probable_prime(prime) {
            return Err(Error::KeyGeneration(format!("{} is not prime", prime)));
        }
    }

    let one = BigUint::one();
    let n = p * q;
    let phi = (p - &one) * (q - &one);
    let e = choose_exponent(&phi);
    let d = mod_inverse(&e, &phi).ok_or_else(|| {
        Error::KeyGeneration("Modular inverse of the public exponent does not exist".to_string())
    })?;

    debug!("Generated RSA keypair with {}-bit modulus", n.bits());

    Ok(KeyPair {
        public: PublicKey {
            e,
            n: n.clone(),
        },
        private: PrivateKey { d, n },
    })
}

/// Random prime with exactly `bits` bits
pub fn random_prime<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> Result<BigUint> {
    if bits < 2 {
        return Err(Error::KeyGeneration(format!(
            "Cannot generate a {}-bit prime",
            bits
        )));
    }

    let top = BigUint::one() << (bits - 1);
    for _ in 0..MAX_PRIME_ATTEMPTS {
        let mut candidate = rng.gen_biguint(bits) | &top;
        if candidate.is_even() {
            candidate += 1u32;
        }
        if candidate.bits() == bits && is_probable_prime(&candidate) {
            return Ok(candidate);
        }
    }

    Err(Error::KeyGeneration(format!(
        "No {}-bit prime found after {} attempts",
        bits, MAX_PRIME_ATTEMPTS
    )))
}

impl KeyPair {
    /// Key pair from the default primes 7919 and 1009
    pub fn default_pair() -> Result<Self> {
        generate_keys(&BigUint::from(DEFAULT_P), &BigUint::from(DEFAULT_Q))
    }

    /// Key pair from two random distinct `bits`-bit primes
    pub fn random<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> Result<Self> {
        let p = random_prime(bits, rng)?;
        let mut q = random_prime(bits, rng)?;
        while q == p {
            if bits < 3 {
                return Err(Error::KeyGeneration(format!(
                    "Not enough {}-bit primes for two distinct factors",
                    bits
                )));
            }
            q = random_prime(bits, rng)?;
        }
        generate_keys(&p, &q)
    }

    pub fn modulus(&self) -> &BigUint {
        &self.public.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_default_pair() {
        let pair = KeyPair::default_pair().unwrap();
        assert_eq!(pair.modulus(), &big(7919 * 1009));
        assert_eq!(pair.public.exponent(), &big(65537));

        let phi = big(7918 * 1008);
        let product = pair.public.exponent() * pair.private.exponent();
        assert!((product % phi).is_one());
    }

    #[test]
    fn test_numeric_roundtrip() {
        let pair = KeyPair::default_pair().unwrap();
        let m = big(123);
        let c = pair.public.encrypt(&m).unwrap();
        assert_ne!(c, m);
        assert_eq!(pair.private.decrypt(&c).unwrap(), m);
    }

    #[test]
    fn test_textbook_pair() {
        // p = 61, q = 53: 65537 is coprime to 3120 but larger, so 7 is chosen
        let pair = generate_keys(&big(61), &big(53)).unwrap();
        assert_eq!(pair.public.exponent(), &big(7));
        assert_eq!(pair.private.exponent(), &big(1783));
        let c = encrypt(&big(65), pair.public.exponent(), pair.modulus()).unwrap();
        assert_eq!(decrypt(&c, pair.private.exponent(), pair.modulus()).unwrap(), big(65));
    }

    #[test]
    fn test_message_too_large() {
        let pair = KeyPair::default_pair().unwrap();
        let m = pair.modulus().clone();
        assert!(matches!(
            pair.public.encrypt(&m),
            Err(Error::MessageTooLarge { .. })
        ));
        assert!(matches!(
            pair.private.decrypt(&(m + 1u32)),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_bad_primes() {
        for (p, q) in [(1u64, 7u64), (7, 7), (4, 7), (7919, 1000)] {
            assert!(
                matches!(generate_keys(&big(p), &big(q)), Err(Error::KeyGeneration(_))),
                "accepted ({}, {})",
                p,
                q
            );
        }
    }

    #[test]
    fn test_random_pair() {
        let mut rng = rand::thread_rng();
        let pair = KeyPair::random(24, &mut rng).unwrap();
        assert!(pair.modulus().bits() >= 47);
        let m = big(0xC0FFEE);
        let c = pair.public.encrypt(&m).unwrap();
        assert_eq!(pair.private.decrypt(&c).unwrap(), m);
    }

    #[test]
    fn test_random_prime_bits() {
        let mut rng = rand::thread_rng();
        for bits in [2u64, 8, 33] {
            let p = random_prime(bits, &mut rng).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(is_probable_prime(&p));
        }
        assert!(random_prime(1, &mut rng).is_err());
    }

    #[test]
    fn test_key_strings() {
        let pair = KeyPair::default_pair().unwrap();
        let public: PublicKey = pair.public.to_string().parse().unwrap();
        assert_eq!(public, pair.public);
        let private: PrivateKey = pair.private.to_string().parse().unwrap();
        assert_eq!(private, pair.private);

        assert!(matches!("65537".parse::<PublicKey>(), Err(Error::InvalidKey(_))));
        assert!(matches!("a,b".parse::<PublicKey>(), Err(Error::InvalidKey(_))));
        assert!(matches!("3,1".parse::<PrivateKey>(), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_private_debug_hides_exponent() {
        let pair = KeyPair::default_pair().unwrap();
        let debug = format!("{:?}", pair.private);
        assert!(debug.starts_with("PrivateKey { n: 7990271"));
        assert!(!debug.contains("d:"));
    }
}
