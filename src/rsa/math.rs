//! Number theory for RSA: modular exponentiation, Euclid, primality

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// Primes used for trial division before Miller-Rabin
const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Miller-Rabin bases; deterministic for every n below 3.3 * 10^24
const WITNESSES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Extra random rounds for candidates beyond the deterministic range
const RANDOM_ROUNDS: usize = 16;

/// `base^exponent mod modulus` by square-and-multiply.
///
/// A modulus of zero or one yields zero.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    if modulus.is_zero() || modulus.is_one() {
        return BigUint::zero();
    }

    let mut result = BigUint::one();
    let mut base = base % modulus;
    let mut exp = exponent.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exp >>= 1u32;
    }

    result
}

/// Greatest common divisor
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Extended Euclid: returns `(g, x, y)` with `a*x + b*y = g`
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_x, mut x) = (BigInt::one(), BigInt::zero());
    let (mut old_y, mut y) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;

        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_x = &old_x - &q * &x;
        old_x = std::mem::replace(&mut x, next_x);

        let next_y = &old_y - &q * &y;
        old_y = std::mem::replace(&mut y, next_y);
    }

    if old_r.is_negative() {
        (-old_r, -old_x, -old_y)
    } else {
        (old_r, old_x, old_y)
    }
}

/// Multiplicative inverse of `a` mod `m`, if `gcd(a, m) = 1`
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }

    let a = BigInt::from_biguint(Sign::Plus, a.clone());
    let m = BigInt::from_biguint(Sign::Plus, m.clone());
    let (g, x, _) = extended_gcd(&a, &m);
    if !g.is_one() {
        return None;
    }

    x.mod_floor(&m).to_biguint()
}

/// Trial division followed by Miller-Rabin
pub fn is_probable_prime(n: &BigUint) -> bool {
    if n < &BigUint::from(2u32) {
        return false;
    }

    for &p in SMALL_PRIMES.iter() {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    let passes = |a: &BigUint| -> bool {
        let mut x = mod_pow(a, &d, n);
        if x.is_one() || x == n_minus_one {
            return true;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                return true;
            }
        }
        false
    };

    if !WITNESSES.iter().all(|&a| passes(&BigUint::from(a))) {
        return false;
    }

    if n.bits() > 80 {
        let mut rng = rand::thread_rng();
        let low = BigUint::from(2u32);
        for _ in 0..RANDOM_ROUNDS {
            let a = rng.gen_biguint_range(&low, &n_minus_one);
            if !passes(&a) {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_mod_pow_matches_builtin() {
        let cases = [(4u64, 13u64, 497u64), (123, 65537, 7990271), (2, 0, 7), (0, 5, 11)];
        for (b, e, m) in cases {
            assert_eq!(
                mod_pow(&big(b), &big(e), &big(m)),
                big(b).modpow(&big(e), &big(m))
            );
        }
        assert_eq!(mod_pow(&big(4), &big(13), &big(497)), big(445));
        assert_eq!(mod_pow(&big(5), &big(3), &big(1)), big(0));
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(&big(48), &big(18)), big(6));
        assert_eq!(gcd(&big(17), &big(0)), big(17));
        assert_eq!(gcd(&big(65537), &big(7981344)), big(1));
    }

    #[test]
    fn test_extended_gcd_identity() {
        let a = BigInt::from(240);
        let b = BigInt::from(46);
        let (g, x, y) = extended_gcd(&a, &b);
        assert_eq!(g, BigInt::from(2));
        assert_eq!(&a * &x + &b * &y, g);
    }

    #[test]
    fn test_mod_inverse() {
        assert_eq!(mod_inverse(&big(3), &big(11)), Some(big(4)));
        assert_eq!(mod_inverse(&big(17), &big(3120)), Some(big(2753)));
        assert_eq!(mod_inverse(&big(6), &big(9)), None);
        assert_eq!(mod_inverse(&big(5), &big(0)), None);
    }

    #[test]
    fn test_primality() {
        for p in [2u64, 3, 97, 1009, 7919, 65537, 2147483647, 1000000007] {
            assert!(is_probable_prime(&big(p)), "{} should be prime", p);
        }
        // 561 and 41041 are Carmichael numbers
        for c in [0u64, 1, 4, 561, 41041, 7990271, 1000000007 * 3] {
            assert!(!is_probable_prime(&big(c)), "{} should be composite", c);
        }
    }

    #[test]
    fn test_large_prime() {
        // 2^89 - 1 is a Mersenne prime
        let m89 = (BigUint::one() << 89u32) - BigUint::one();
        assert!(is_probable_prime(&m89));
        assert!(!is_probable_prime(&(&m89 * &big(3))));
    }
}
