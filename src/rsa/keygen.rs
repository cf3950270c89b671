// RSA Key Generation
// Key pair construction for the signature demo, with a fixed precomputed
// pair for deterministic runs

use num_traits::One;

use super::bigint::{
    from_bytes, from_u64, lcm, mod_inverse, mod_pow, random_prime, RsaBigInt,
};
use super::padding::{encode, DigestAlgorithm};
use crate::error::{CryptoError, CryptoResult};

/// Demo modulus size in bits
pub const KEY_BIT_LENGTH: u32 = 2048;

/// Demo public exponent; must stay small for the forgery demonstration
/// to have enough attacker slack below the e-th root
pub const PUBLIC_EXPONENT: u64 = 3;

// Fixed 1024-bit primes for the deterministic demo keypair. Both satisfy
// gcd(3, p-1) = 1 and their product is exactly 2048 bits wide.
const DEMO_P_HEX: &str = concat!(
    "911806caa2a2933f1e849c9f2bfa071ccfe01cc8871d88a38a12f611a1ed18be",
    "b070734481bb7d53a6a4f4498982809fd463eb2a1cf0400c338c0b716046f277",
    "e4f39d6517ad77db00d042871585cc95c8cf07bb59fd098419cfcf08a83d6819",
    "b66fbe39f19d5686124a8718d539cd6b5e91cc42672b8bf55ead9be75d1bc183",
);
const DEMO_Q_HEX: &str = concat!(
    "e8edc1c8692dbf95c01803daa066ffa5c9930522421ae863585747dcb144144e",
    "8d62883699b363b8dfc655225c0c2cac27f367f44ad86132aceee1919e9137a2",
    "4d2ad8b674af002302fdf4d938d3a83fba42e8ab8fc10a55e775a8e10f1b0e4f",
    "71dc39009674b85a8ea5a47de95e73efe482cb696026e8ef023175d7e09e7839",
);

/// RSA Public Key
#[derive(Debug, Clone, PartialEq)]
pub struct RsaPublicKey {
    pub n: RsaBigInt, // Modulus
    pub e: RsaBigInt, // Public exponent
}

/// RSA Private Key
#[derive(Debug, Clone, PartialEq)]
pub struct RsaPrivateKey {
    pub n: RsaBigInt,     // Modulus (same as public)
    pub d: RsaBigInt,     // Private exponent
    pub p: RsaBigInt,     // First prime factor
    pub q: RsaBigInt,     // Second prime factor
    // Pre-computed values for faster signing
    pub d_p: RsaBigInt,   // d mod (p-1)
    pub d_q: RsaBigInt,   // d mod (q-1)
    pub q_inv: RsaBigInt, // q^(-1) mod p
}

/// RSA Key Pair (both public and private keys)
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    pub public_key: RsaPublicKey,
    pub private_key: RsaPrivateKey,
    pub bit_length: u32,
}

/// Where the process-wide demo keypair comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Fixed precomputed primes, deterministic across runs
    Fixed,
    /// Fresh primes each run
    Generate,
}

impl RsaPublicKey {
    /// Bit length of the modulus
    pub fn bit_length(&self) -> u32 {
        self.n.bits() as u32
    }

    /// Byte length of the modulus, the padded block size L
    pub fn byte_length(&self) -> usize {
        ((self.n.bits() + 7) / 8) as usize
    }

    /// "Decrypt" a signature: recover the padded-block integer s^e mod n.
    /// Independent of which padding parser is applied afterwards.
    pub fn raw_verify(&self, signature: &RsaBigInt) -> CryptoResult<RsaBigInt> {
        mod_pow(signature, &self.e, &self.n)
    }
}

impl RsaPrivateKey {
    /// Private-key operation m^d mod n, via the Chinese Remainder Theorem
    fn private_op(&self, m: &RsaBigInt) -> CryptoResult<RsaBigInt> {
        // m1 = m^d_p mod p
        let m1 = mod_pow(m, &self.d_p, &self.p)?;

        // m2 = m^d_q mod q
        let m2 = mod_pow(m, &self.d_q, &self.q)?;

        // h = (m1 - m2) * q_inv mod p
        let mut h = if m1 >= m2 {
            m1 - &m2
        } else {
            m1 + &self.p - &m2
        };
        h = (h * &self.q_inv) % &self.p;

        // m^d = m2 + q * h
        let result = m2 + &self.q * h;

        if result >= self.n {
            return Ok(result - &self.n);
        }
        Ok(result)
    }
}

impl RsaKeyPair {
    /// Bit length of the key
    pub fn bit_length(&self) -> u32 {
        self.public_key.bit_length()
    }

    /// Sign a digest: PKCS#1 v1.5 encode, then apply the private exponent.
    /// Returns the signature as an integer.
    pub fn sign_digest(
        &self,
        digest: &[u8],
        algorithm: DigestAlgorithm,
    ) -> CryptoResult<RsaBigInt> {
        let block = encode(digest, algorithm, self.public_key.byte_length())?;
        let m = from_bytes(&block);
        self.private_key.private_op(&m)
    }
}

/// Generate RSA key pair with specified bit length and public exponent
/// bit_length: Size of the modulus in bits (2048, 3072, 4096, etc.)
/// e: Public exponent (common values: 3, 17, 65537)
pub fn generate_keypair(bit_length: u32, e: u64) -> CryptoResult<RsaKeyPair> {
    if bit_length < 512 {
        return Err(CryptoError::InvalidKey(
            "bit length must be at least 512".to_string(),
        ));
    }
    if bit_length % 2 != 0 {
        return Err(CryptoError::InvalidKey(
            "bit length must be even (p and q should have equal bit length)".to_string(),
        ));
    }

    let e = from_u64(e);
    let half_bits = bit_length / 2;

    loop {
        // random_prime only returns primes compatible with e
        let p = random_prime(half_bits, &e);
        let q = random_prime(half_bits, &e);

        if p == q {
            continue;
        }

        // the modulus must come out at full size
        if (&p * &q).bits() != bit_length as u64 {
            continue;
        }

        return build_keypair(p, q, e, bit_length);
    }
}

/// Fixed precomputed 2048-bit keypair for deterministic demo runs
pub fn demo_keypair() -> CryptoResult<RsaKeyPair> {
    let p = RsaBigInt::parse_bytes(DEMO_P_HEX.as_bytes(), 16)
        .ok_or_else(|| CryptoError::InvalidKey("malformed demo prime constant".to_string()))?;
    let q = RsaBigInt::parse_bytes(DEMO_Q_HEX.as_bytes(), 16)
        .ok_or_else(|| CryptoError::InvalidKey("malformed demo prime constant".to_string()))?;

    build_keypair(p, q, from_u64(PUBLIC_EXPONENT), KEY_BIT_LENGTH)
}

/// Build the process-wide keypair at startup
pub fn initialize(source: KeySource) -> CryptoResult<RsaKeyPair> {
    match source {
        KeySource::Fixed => demo_keypair(),
        KeySource::Generate => generate_keypair(KEY_BIT_LENGTH, PUBLIC_EXPONENT),
    }
}

// Assemble a keypair from two primes and the public exponent, deriving the
// private exponent mod λ(n) and the CRT parameters
fn build_keypair(p: RsaBigInt, q: RsaBigInt, e: RsaBigInt, bit_length: u32) -> CryptoResult<RsaKeyPair> {
    // Ensure p > q (for q_inv calculation)
    let (p, q) = if p < q { (q, p) } else { (p, q) };

    // n = p * q
    let n = &p * &q;

    // d = e^(-1) mod λ(n), λ(n) = lcm(p-1, q-1)
    let p_minus_1 = &p - 1u8;
    let q_minus_1 = &q - 1u8;
    let lambda_n = lcm(&p_minus_1, &q_minus_1);

    let d = mod_inverse(&e, &lambda_n).ok_or_else(|| {
        CryptoError::InvalidKey(format!("e={} is not invertible mod λ(n)", e))
    })?;

    // defensive self-check on the keypair invariant
    if (&e * &d) % &lambda_n != RsaBigInt::one() {
        return Err(CryptoError::InvalidKey(
            "e·d mod λ(n) != 1 for the constructed pair".to_string(),
        ));
    }

    // CRT parameters for faster signing
    let d_p = &d % &p_minus_1;
    let d_q = &d % &q_minus_1;
    let q_inv = mod_inverse(&q, &p).ok_or_else(|| {
        CryptoError::InvalidKey("failed to compute q^(-1) mod p".to_string())
    })?;

    let public_key = RsaPublicKey {
        n: n.clone(),
        e: e.clone(),
    };

    let private_key = RsaPrivateKey {
        n,
        d,
        p,
        q,
        d_p,
        d_q,
        q_inv,
    };

    Ok(RsaKeyPair {
        public_key,
        private_key,
        bit_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::{gcd, to_fixed_bytes};
    use crate::rsa::padding::parse_strict;

    #[test]
    fn test_key_generation() {
        let keypair = generate_keypair(512, 65537);
        assert!(keypair.is_ok());

        let keypair = keypair.unwrap();
        assert_eq!(keypair.bit_length(), 512);
        assert!(keypair.public_key.n > from_u64(0));
        assert!(keypair.private_key.d > from_u64(0));
    }

    #[test]
    fn test_key_generation_small_exponent() {
        // e=3 must work: the prime search skips p with 3 | p-1
        let keypair = generate_keypair(512, 3).unwrap();
        let p = &keypair.private_key.p;
        let q = &keypair.private_key.q;
        assert!(gcd(&from_u64(3), &(p - 1u8)).is_one());
        assert!(gcd(&from_u64(3), &(q - 1u8)).is_one());
    }

    #[test]
    fn test_key_properties() {
        let keypair = generate_keypair(512, 17).unwrap();

        // Verify n = p * q
        assert_eq!(
            keypair.private_key.n,
            &keypair.private_key.p * &keypair.private_key.q
        );

        // Verify e * d ≡ 1 (mod λ(n))
        let lambda_n = lcm(
            &(&keypair.private_key.p - 1u8),
            &(&keypair.private_key.q - 1u8),
        );
        let product = &keypair.public_key.e * &keypair.private_key.d;
        assert_eq!(product % &lambda_n, from_u64(1));
    }

    #[test]
    fn test_key_generation_rejects_bad_bit_lengths() {
        assert!(matches!(
            generate_keypair(256, 65537),
            Err(CryptoError::InvalidKey(_))
        ));
        assert!(matches!(
            generate_keypair(513, 65537),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_demo_keypair() {
        let keypair = demo_keypair().unwrap();
        assert_eq!(keypair.bit_length(), 2048);
        assert_eq!(keypair.public_key.byte_length(), 256);
        assert_eq!(keypair.public_key.e, from_u64(3));
        assert_eq!(
            keypair.private_key.n,
            &keypair.private_key.p * &keypair.private_key.q
        );
        // deterministic across calls
        let again = demo_keypair().unwrap();
        assert_eq!(keypair.public_key, again.public_key);
    }

    #[test]
    fn test_sign_digest_round_trip() {
        let keypair = demo_keypair().unwrap();
        let algorithm = DigestAlgorithm::Sha256;
        let digest: Vec<u8> = (0..32).collect();

        let signature = keypair.sign_digest(&digest, algorithm).unwrap();
        let recovered = keypair.public_key.raw_verify(&signature).unwrap();

        let block = to_fixed_bytes(&recovered, keypair.public_key.byte_length()).unwrap();
        let parsed = parse_strict(&block, block.len(), algorithm).unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn test_crt_matches_plain_exponentiation() {
        let keypair = demo_keypair().unwrap();
        let key = &keypair.private_key;
        let m = from_u64(0xC0FFEE);

        let crt = key.private_op(&m).unwrap();
        let plain = mod_pow(&m, &key.d, &key.n).unwrap();
        assert_eq!(crt, plain);
    }

    #[test]
    fn test_initialize_fixed() {
        let keypair = initialize(KeySource::Fixed).unwrap();
        assert_eq!(keypair.bit_length(), KEY_BIT_LENGTH);
    }
}
