// Sighax Simulator Library
// RSA-2048 PKCS#1 v1.5 signature verification demo: a strict verifier
// contrasted with the lenient parser behind the sighax class of exploits

pub mod error;
pub mod rsa;

pub use error::{CryptoError, CryptoResult};
