// Verification Engine
// Orchestrates signing and the two verification flows, producing a
// structured result with a step-by-step diagnostic trail

use super::bigint::{to_fixed_bytes, RsaBigInt};
use super::forge;
use super::keygen::{RsaKeyPair, RsaPublicKey};
use super::padding::{parse_lenient, parse_strict, DigestAlgorithm};
use crate::error::{CryptoError, CryptoResult};

/// Which padding parser a verification run dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Exact-structure parsing, the legitimate path
    Strict,
    /// Trailing-byte-tolerant parsing, the exploitable path
    Lenient,
}

/// One diagnostic step of a verification run
#[derive(Debug, Clone)]
pub struct TrailStep {
    pub title: String,
    pub detail: String,
    pub passed: bool,
}

/// Outcome of a verification run; immutable once produced, owned by the caller
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub accepted: bool,
    pub recovered_digest: Option<Vec<u8>>,
    pub trail: Vec<TrailStep>,
}

/// Sign a message: hash it, then apply the keypair to the digest
pub fn sign(
    message: &[u8],
    key: &RsaKeyPair,
    algorithm: DigestAlgorithm,
) -> CryptoResult<RsaBigInt> {
    let digest = algorithm.hash(message);
    key.sign_digest(&digest, algorithm)
}

/// Verify a signature against a message under the requested parse mode.
///
/// Parse failures never escape as errors; they are folded into a Rejected
/// result with the parser's reason in the trail. Arithmetic and block-size
/// failures propagate, they indicate a broken setup rather than a bad
/// signature.
pub fn verify(
    message: &[u8],
    signature: &RsaBigInt,
    public_key: &RsaPublicKey,
    algorithm: DigestAlgorithm,
    mode: ParseMode,
) -> CryptoResult<VerificationResult> {
    let mut trail = Vec::new();
    let block_len = public_key.byte_length();

    // Step 1: public-key operation recovers the padded-block integer
    let recovered = public_key.raw_verify(signature)?;
    trail.push(TrailStep {
        title: "Decrypt signature: M = S^e mod N".to_string(),
        detail: format!("e = {}, modulus of {} bytes", public_key.e, block_len),
        passed: true,
    });

    // Step 2: render the integer as an L-byte block
    let block = to_fixed_bytes(&recovered, block_len)?;
    trail.push(TrailStep {
        title: format!("Render {}-byte padded block", block_len),
        detail: format!("leading bytes {}", hex::encode(&block[..8.min(block.len())])),
        passed: true,
    });

    // Step 3: dispatch to the requested parser
    let parsed = match mode {
        ParseMode::Strict => parse_strict(&block, block_len, algorithm),
        ParseMode::Lenient => parse_lenient(&block, block_len, algorithm),
    };

    let recovered_digest = match parsed {
        Ok(digest) => digest,
        Err(CryptoError::PaddingRejected(reason)) => {
            trail.push(TrailStep {
                title: parse_step_title(mode),
                detail: reason,
                passed: false,
            });
            return Ok(VerificationResult {
                accepted: false,
                recovered_digest: None,
                trail,
            });
        }
        Err(e) => return Err(e),
    };
    trail.push(TrailStep {
        title: parse_step_title(mode),
        detail: format!("recovered a {}-byte digest", recovered_digest.len()),
        passed: true,
    });

    // Step 4: byte-exact digest comparison
    let expected = algorithm.hash(message);
    let matches = recovered_digest == expected;
    trail.push(TrailStep {
        title: "Compare embedded digest against message digest".to_string(),
        detail: format!(
            "embedded {} / computed {}",
            hex::encode(&recovered_digest),
            hex::encode(&expected)
        ),
        passed: matches,
    });

    Ok(VerificationResult {
        accepted: matches,
        recovered_digest: Some(recovered_digest),
        trail,
    })
}

/// Verify with the exact-structure parser
pub fn verify_strict(
    message: &[u8],
    signature: &RsaBigInt,
    public_key: &RsaPublicKey,
    algorithm: DigestAlgorithm,
) -> CryptoResult<VerificationResult> {
    verify(message, signature, public_key, algorithm, ParseMode::Strict)
}

/// Verify with the trailing-byte-tolerant parser
pub fn verify_lenient(
    message: &[u8],
    signature: &RsaBigInt,
    public_key: &RsaPublicKey,
    algorithm: DigestAlgorithm,
) -> CryptoResult<VerificationResult> {
    verify(message, signature, public_key, algorithm, ParseMode::Lenient)
}

/// Forge a signature the lenient mode accepts for `target_digest`, without
/// the private key
pub fn forge_lenient_signature(
    target_digest: &[u8],
    algorithm: DigestAlgorithm,
    public_key: &RsaPublicKey,
) -> CryptoResult<RsaBigInt> {
    forge::forge(target_digest, algorithm, public_key)
}

fn parse_step_title(mode: ParseMode) -> String {
    match mode {
        ParseMode::Strict => "Parse padded block (strict)".to_string(),
        ParseMode::Lenient => "Parse padded block (lenient)".to_string(),
    }
}
