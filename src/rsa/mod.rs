// RSA Module - Main module file
// Exports all signature-demo functionality

pub mod bigint;
pub mod forge;
pub mod keygen;
pub mod padding;
pub mod verify;

pub use forge::forge;
pub use keygen::{
    demo_keypair, generate_keypair, initialize, KeySource, RsaKeyPair, RsaPrivateKey,
    RsaPublicKey, KEY_BIT_LENGTH, PUBLIC_EXPONENT,
};
pub use padding::{encode, parse_lenient, parse_strict, DigestAlgorithm};
pub use verify::{
    forge_lenient_signature, sign, verify, verify_lenient, verify_strict, ParseMode, TrailStep,
    VerificationResult,
};
