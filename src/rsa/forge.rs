// Signature Forgery
// Low-exponent PKCS#1 v1.5 forgery against the lenient parser, after
// Bleichenbacher's e-th root technique

use num_traits::{One, Pow, ToPrimitive};

use super::bigint::{from_bytes, nth_root, to_fixed_bytes, RsaBigInt};
use super::keygen::RsaPublicKey;
use super::padding::DigestAlgorithm;
use crate::error::{CryptoError, CryptoResult};

/// Number of 0xFF bytes placed in the forged block, far fewer than a
/// legitimate signature carries
const FORGED_PAD_LEN: usize = 8;

/// Forge a signature the lenient parser accepts for `target_digest`, using
/// only the public key.
///
/// The block 00 01 FF*8 00 || digest_info || digest is taken as the
/// high-order prefix of the decrypted value and every byte below it is
/// attacker slack. The floor e-th root of the largest integer carrying that
/// prefix is a signature whose e-th power keeps the prefix intact, with the
/// rounding mismatch confined to the trailing region the lenient parser
/// never reads.
pub fn forge(
    target_digest: &[u8],
    algorithm: DigestAlgorithm,
    public_key: &RsaPublicKey,
) -> CryptoResult<RsaBigInt> {
    if target_digest.len() != algorithm.digest_len() {
        return Err(CryptoError::Padding(format!(
            "target digest is {} bytes, {:?} produces {}",
            target_digest.len(),
            algorithm,
            algorithm.digest_len()
        )));
    }

    let block_len = public_key.byte_length();
    let info = algorithm.digest_info();
    let prefix_len = 3 + FORGED_PAD_LEN + info.len() + target_digest.len();
    if prefix_len >= block_len {
        return Err(CryptoError::Padding(
            "no trailing slack left below the forged prefix".to_string(),
        ));
    }

    let mut prefix = Vec::with_capacity(prefix_len);
    prefix.push(0x00);
    prefix.push(0x01);
    prefix.extend(std::iter::repeat(0xFF).take(FORGED_PAD_LEN));
    prefix.push(0x00);
    prefix.extend_from_slice(info);
    prefix.extend_from_slice(target_digest);

    // largest block-sized integer whose leading bytes are exactly the prefix
    let slack_bits = 8 * (block_len - prefix_len);
    let x = from_bytes(&prefix);
    let target = ((x + RsaBigInt::one()) << slack_bits) - RsaBigInt::one();

    let e = public_key.e.to_u32().ok_or_else(|| {
        CryptoError::InvalidKey("public exponent too large for root extraction".to_string())
    })?;
    let signature = nth_root(&target, e);

    // the construction only holds while s^e stays below n and the rounding
    // error stays inside the slack; re-derive the block and check
    let raw = Pow::pow(&signature, e);
    if raw >= public_key.n {
        return Err(CryptoError::Arithmetic(
            "forged value exceeds the modulus".to_string(),
        ));
    }
    let block = to_fixed_bytes(&raw, block_len)?;
    if block[..prefix_len] != prefix[..] {
        return Err(CryptoError::Arithmetic(
            "root rounding spilled into the digest region".to_string(),
        ));
    }

    Ok(signature)
}
