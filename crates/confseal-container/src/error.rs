//! Container error types for `confseal-container`.

use confseal_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced while writing or reading configuration containers.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The format tag is missing or not one this crate can decrypt, or the
    /// container names an algorithm/KDF it does not implement.
    #[error("unsupported container format: {0}")]
    UnsupportedFormat(String),

    /// The encryption block carries no usable salt.
    #[error("encrypted container has no salt")]
    MissingSalt,

    /// Authentication failed. A wrong password and a tampered payload are
    /// indistinguishable and reported the same way.
    #[error("wrong password or corrupted container")]
    WrongPasswordOrCorrupted,

    /// Any other failure while decrypting (bad base64, truncated token,
    /// non-UTF-8 or non-JSON plaintext).
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// An encrypted container was opened without a password.
    #[error("a password is required to open this container")]
    PasswordRequired,

    /// The document carries a known format tag but not the matching shape.
    #[error("invalid container document: {0}")]
    InvalidDocument(String),

    /// Key derivation or encryption failed while writing a container.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Outer document could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
