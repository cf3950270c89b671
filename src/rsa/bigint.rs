// RSA Big Integer Operations
// Wrapper around num-bigint for RSA-specific operations

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::{Integer, Roots};
use num_traits::{One, Signed, Zero};
use rand::thread_rng;

use crate::error::{CryptoError, CryptoResult};

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Create a big integer from bytes (big-endian)
pub fn from_bytes(bytes: &[u8]) -> RsaBigInt {
    RsaBigInt::from_bytes_be(bytes)
}

/// Convert a big integer to a big-endian block of exactly `len` bytes,
/// left-padded with zero bytes
pub fn to_fixed_bytes(n: &RsaBigInt, len: usize) -> CryptoResult<Vec<u8>> {
    let bytes = n.to_bytes_be();
    if bytes.len() > len {
        return Err(CryptoError::BlockLength {
            expected: len,
            actual: bytes.len(),
        });
    }
    let mut block = vec![0u8; len];
    block[len - bytes.len()..].copy_from_slice(&bytes);
    Ok(block)
}

/// Modular exponentiation: base^exp mod modulus
/// Uses square-and-multiply algorithm
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> CryptoResult<RsaBigInt> {
    if modulus.is_zero() {
        return Err(CryptoError::Arithmetic(
            "modulus must be positive".to_string(),
        ));
    }
    Ok(pow_mod(base, exp, modulus))
}

// Core square-and-multiply loop; modulus must be nonzero
fn pow_mod(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> RsaBigInt {
    if modulus.is_one() {
        return RsaBigInt::zero();
    }

    let mut result = RsaBigInt::one();
    let mut base = base % modulus;
    let mut exp = exp.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exp >>= 1;
    }

    result
}

/// Compute modular inverse a^(-1) mod m by the extended Euclidean algorithm
/// Returns None if the inverse doesn't exist
pub fn mod_inverse(a: &RsaBigInt, m: &RsaBigInt) -> Option<RsaBigInt> {
    // signed intermediates, the coefficients go negative during the descent
    let (mut t, mut newt) = (BigInt::zero(), BigInt::one());
    let (mut r, mut newr) = (BigInt::from(m.clone()), BigInt::from(a.clone()));

    while !newr.is_zero() {
        let quotient = &r / &newr;
        let tmp_t = t.clone();
        t = newt.clone();
        newt = tmp_t - &quotient * newt;

        let tmp_r = r.clone();
        r = newr.clone();
        newr = tmp_r - quotient * newr;
    }

    if r > BigInt::one() {
        return None;
    }

    while t.is_negative() {
        t += BigInt::from(m.clone());
    }

    t.to_biguint()
}

/// Miller-Rabin primality test
/// Returns true if n is probably prime
pub fn is_probable_prime(n: &RsaBigInt, iterations: u32) -> bool {
    if n < &RsaBigInt::from(2u8) {
        return false;
    }
    if n == &RsaBigInt::from(2u8) || n == &RsaBigInt::from(3u8) {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n-1 as d * 2^s with d odd
    let mut d = n.clone() - 1u8;
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    // Witness loop
    let mut rng = thread_rng();
    let two = RsaBigInt::from(2u8);
    let n_minus_two = n - RsaBigInt::from(2u8);

    for _ in 0..iterations {
        // Pick random witness a in [2, n-2]
        let a = rng.gen_biguint_range(&two, &n_minus_two);

        // Compute x = a^d mod n
        let mut x = pow_mod(&a, &d, n);

        if x == RsaBigInt::one() || x == n - 1u8 {
            continue;
        }

        let mut continue_outer = false;
        for _ in 1..s {
            x = pow_mod(&x, &two, n);
            if x == n - 1u8 {
                continue_outer = true;
                break;
            }
        }

        if continue_outer {
            continue;
        }

        // Composite
        return false;
    }

    // Probably prime
    true
}

/// Generate a random prime of the specified bit length that is usable with
/// the public exponent e, i.e. gcd(e, p-1) = 1
pub fn random_prime(bit_length: u32, e: &RsaBigInt) -> RsaBigInt {
    let mut rng = thread_rng();

    loop {
        // Generate random number with specified bit length
        let lower = RsaBigInt::one() << (bit_length - 1);
        let upper = (RsaBigInt::one() << bit_length) - 1u8;

        let mut prime = rng.gen_biguint_range(&lower, &upper);

        // Make it odd
        if prime.is_even() {
            prime += 1u8;
        }

        // Check primality
        if !is_probable_prime(&prime, 10) {
            continue;
        }

        // e must be invertible mod p-1
        if gcd(e, &(&prime - 1u8)).is_one() {
            return prime;
        }
    }
}

/// Floor integer e-th root of n
pub fn nth_root(n: &RsaBigInt, e: u32) -> RsaBigInt {
    n.nth_root(e)
}

/// Greatest common divisor
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}

/// Least common multiple
pub fn lcm(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    if a.is_zero() || b.is_zero() {
        return RsaBigInt::zero();
    }
    (a * b) / gcd(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod_pow() {
        // 3^5 mod 7 = 243 mod 7 = 5
        let base = from_u64(3);
        let exp = from_u64(5);
        let modulus = from_u64(7);
        let result = mod_pow(&base, &exp, &modulus).unwrap();
        assert_eq!(result, from_u64(5));
    }

    #[test]
    fn test_mod_pow_zero_modulus() {
        let result = mod_pow(&from_u64(3), &from_u64(5), &from_u64(0));
        assert!(matches!(result, Err(CryptoError::Arithmetic(_))));
    }

    #[test]
    fn test_mod_pow_one_modulus() {
        let result = mod_pow(&from_u64(3), &from_u64(5), &from_u64(1)).unwrap();
        assert_eq!(result, from_u64(0));
    }

    #[test]
    fn test_mod_inverse() {
        // 3 * 5 = 15 ≡ 1 mod 7, so inverse of 3 mod 7 is 5
        let a = from_u64(3);
        let m = from_u64(7);
        let inv = mod_inverse(&a, &m).unwrap();
        assert_eq!(inv, from_u64(5));
        assert_eq!((a * inv) % m, from_u64(1));

        // known vector: 17^(-1) mod 3120 = 2753
        assert_eq!(
            mod_inverse(&from_u64(17), &from_u64(3120)),
            Some(from_u64(2753))
        );

        // no inverse when gcd != 1
        assert_eq!(mod_inverse(&from_u64(15), &from_u64(45)), None);
        assert_eq!(mod_inverse(&from_u64(14), &from_u64(28)), None);
    }

    #[test]
    fn test_is_probable_prime() {
        assert!(is_probable_prime(&from_u64(2), 5));
        assert!(is_probable_prime(&from_u64(3), 5));
        assert!(is_probable_prime(&from_u64(7), 5));
        assert!(!is_probable_prime(&from_u64(4), 5));
        assert!(!is_probable_prime(&from_u64(9), 5));

        // large prime
        assert!(is_probable_prime(&from_u64(2305843009213693951), 10));
        // Carmichael number
        assert!(!is_probable_prime(&from_u64(25326001), 10));
    }

    #[test]
    fn test_random_prime_usable_with_small_e() {
        let e = from_u64(3);
        let p = random_prime(64, &e);
        assert_eq!(p.bits(), 64);
        assert!(is_probable_prime(&p, 10));
        assert!(gcd(&e, &(&p - 1u8)).is_one());
    }

    #[test]
    fn test_nth_root() {
        assert_eq!(nth_root(&from_u64(27), 3), from_u64(3));
        // floor behavior
        assert_eq!(nth_root(&from_u64(26), 3), from_u64(2));
        assert_eq!(nth_root(&from_u64(0), 3), from_u64(0));

        // exact root of a large power
        let base = from_u64(0xDEADBEEF);
        let cube = &base * &base * &base;
        assert_eq!(nth_root(&cube, 3), base);
        assert_eq!(nth_root(&(cube - 1u8), 3), &base - 1u8);
    }

    #[test]
    fn test_lcm() {
        assert_eq!(lcm(&from_u64(4), &from_u64(6)), from_u64(12));
        assert_eq!(lcm(&from_u64(0), &from_u64(6)), from_u64(0));
    }

    #[test]
    fn test_to_fixed_bytes() {
        let n = from_u64(0x0102);
        let block = to_fixed_bytes(&n, 4).unwrap();
        assert_eq!(block, vec![0x00, 0x00, 0x01, 0x02]);

        // zero still yields a full-length block
        assert_eq!(to_fixed_bytes(&from_u64(0), 3).unwrap(), vec![0, 0, 0]);

        // integer too wide for the block
        let result = to_fixed_bytes(&from_u64(0x01020304), 3);
        assert!(matches!(
            result,
            Err(CryptoError::BlockLength {
                expected: 3,
                actual: 4
            })
        ));
    }
}
