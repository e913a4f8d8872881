//! Cryptographic error types for `confseal-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed (invalid PBKDF2 parameters, salt generation).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Structural encryption/decryption failure (bad key length, truncated token).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag verification failed: ciphertext tampered or wrong key.
    #[error("decryption failed: authentication tag mismatch")]
    Decryption,
}
