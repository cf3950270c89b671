// PKCS#1 v1.5 Signature Padding
// Block encoding plus the two parsers the demo contrasts: the exact parser
// and the lenient parser that reproduces the historical bootROM flaw

use sha2::{Digest, Sha256, Sha512};

use crate::error::{CryptoError, CryptoResult};

/// Minimum number of 0xFF padding bytes required by the standard
const MIN_PAD_LEN: usize = 8;

// DER-encoded DigestInfo prefixes (ASN.1 AlgorithmIdentifier + OCTET STRING tag)
const SHA256_DIGEST_INFO: [u8; 19] = [
    0x30, 0x31, 0x30, 0x0D, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
    0x05, 0x00, 0x04, 0x20,
];
const SHA512_DIGEST_INFO: [u8; 19] = [
    0x30, 0x51, 0x30, 0x0D, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x03,
    0x05, 0x00, 0x04, 0x40,
];

/// Digest algorithm embedded in the padded block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// DigestInfo prefix bytes tagging this algorithm inside the block
    pub fn digest_info(&self) -> &'static [u8] {
        match self {
            DigestAlgorithm::Sha256 => &SHA256_DIGEST_INFO,
            DigestAlgorithm::Sha512 => &SHA512_DIGEST_INFO,
        }
    }

    /// Digest length in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// Hash a message with this algorithm
    pub fn hash(&self, message: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha256 => Sha256::digest(message).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(message).to_vec(),
        }
    }
}

/// Build the padded block 0x00 || 0x01 || FF*k || 0x00 || digest_info || digest
/// of exactly `block_len` bytes
pub fn encode(digest: &[u8], algorithm: DigestAlgorithm, block_len: usize) -> CryptoResult<Vec<u8>> {
    if digest.len() != algorithm.digest_len() {
        return Err(CryptoError::Padding(format!(
            "digest is {} bytes, {:?} produces {}",
            digest.len(),
            algorithm,
            algorithm.digest_len()
        )));
    }

    let info = algorithm.digest_info();
    let tail_len = info.len() + digest.len();

    // 0x00 0x01 (2 bytes) + PS + 0x00 (1 byte) + tail must fill the block
    let pad_len = match block_len.checked_sub(3 + tail_len) {
        Some(k) if k >= MIN_PAD_LEN => k,
        _ => {
            return Err(CryptoError::Padding(format!(
                "block of {} bytes cannot hold the digest with {} padding bytes",
                block_len, MIN_PAD_LEN
            )));
        }
    };

    let mut block = Vec::with_capacity(block_len);
    block.push(0x00);
    block.push(0x01);
    block.extend(std::iter::repeat(0xFF).take(pad_len));
    block.push(0x00);
    block.extend_from_slice(info);
    block.extend_from_slice(digest);

    Ok(block)
}

// Shared prefix scan for both parsers: checks the 0x00 0x01 header and walks
// the 0xFF run up to its 0x00 terminator. Returns the index one past the
// terminator and the run length.
fn scan_padding_run(block: &[u8]) -> CryptoResult<(usize, usize)> {
    if block.len() < 3 {
        return Err(CryptoError::PaddingRejected(
            "block too short for a padding header".to_string(),
        ));
    }
    if block[0] != 0x00 {
        return Err(CryptoError::PaddingRejected(format!(
            "leading byte is 0x{:02X}, expected 0x00",
            block[0]
        )));
    }
    if block[1] != 0x01 {
        return Err(CryptoError::PaddingRejected(format!(
            "block type is 0x{:02X}, expected 0x01",
            block[1]
        )));
    }

    let mut pos = 2;
    while pos < block.len() && block[pos] == 0xFF {
        pos += 1;
    }

    if pos >= block.len() || block[pos] != 0x00 {
        return Err(CryptoError::PaddingRejected(
            "padding run has no 0x00 terminator".to_string(),
        ));
    }

    Ok((pos + 1, pos - 2))
}

/// Strict parser, the legitimate path: every structural byte is checked and
/// the digest must end exactly at the end of the block
pub fn parse_strict(
    block: &[u8],
    block_len: usize,
    algorithm: DigestAlgorithm,
) -> CryptoResult<Vec<u8>> {
    if block.len() != block_len {
        return Err(CryptoError::PaddingRejected(format!(
            "block is {} bytes, expected {}",
            block.len(),
            block_len
        )));
    }

    let (tail_start, run_len) = scan_padding_run(block)?;
    if run_len < MIN_PAD_LEN {
        return Err(CryptoError::PaddingRejected(format!(
            "padding run of {} bytes, minimum is {}",
            run_len, MIN_PAD_LEN
        )));
    }

    // DigestInfo must immediately follow the terminator, byte-exact
    let info = algorithm.digest_info();
    let tail = &block[tail_start..];
    if tail.len() < info.len() || &tail[..info.len()] != info {
        return Err(CryptoError::PaddingRejected(
            "DigestInfo prefix does not follow the terminator".to_string(),
        ));
    }

    // the digest must fill the remainder of the block, no trailing bytes
    let digest = &tail[info.len()..];
    if digest.len() != algorithm.digest_len() {
        return Err(CryptoError::PaddingRejected(format!(
            "{} bytes after DigestInfo, expected exactly {}",
            digest.len(),
            algorithm.digest_len()
        )));
    }

    Ok(digest.to_vec())
}

/// Lenient parser, the exploitable path: locates DigestInfo by substring
/// scan instead of requiring it at the terminator, and never examines the
/// bytes that follow the digest
pub fn parse_lenient(
    block: &[u8],
    _block_len: usize,
    algorithm: DigestAlgorithm,
) -> CryptoResult<Vec<u8>> {
    let (tail_start, _run_len) = scan_padding_run(block)?;

    let info = algorithm.digest_info();
    let digest_len = algorithm.digest_len();
    let tail = &block[tail_start..];

    if tail.len() < info.len() {
        return Err(CryptoError::PaddingRejected(
            "DigestInfo prefix not found in block".to_string(),
        ));
    }

    let found = tail.windows(info.len()).position(|window| window == info);
    let at = match found {
        Some(at) => at,
        None => {
            return Err(CryptoError::PaddingRejected(
                "DigestInfo prefix not found in block".to_string(),
            ));
        }
    };

    let digest_start = tail_start + at + info.len();
    if digest_start + digest_len > block.len() {
        return Err(CryptoError::PaddingRejected(
            "no room for a digest after the DigestInfo prefix".to_string(),
        ));
    }

    // trailing bytes beyond the digest are never checked
    Ok(block[digest_start..digest_start + digest_len].to_vec())
}
