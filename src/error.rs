// Crypto Error Types
// Typed failures surfaced by the verification engine and its helpers

use thiserror::Error;

/// Errors that can occur in the RSA demo engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Invalid arithmetic input, such as a zero modulus
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// Keypair failed its construction self-check
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Encoder cannot fit the digest into the block
    #[error("padding error: {0}")]
    Padding(String),

    /// Parser cannot locate the required padding structure
    #[error("padding rejected: {0}")]
    PaddingRejected(String),

    /// Recovered integer does not fit the expected block size
    #[error("block length error: expected {expected} bytes, got {actual}")]
    BlockLength { expected: usize, actual: usize },
}

/// Result type for engine operations
pub type CryptoResult<T> = Result<T, CryptoError>;
