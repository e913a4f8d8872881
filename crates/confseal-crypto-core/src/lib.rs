//! `confseal-crypto-core`: primitives behind confseal configuration containers.
//!
//! No file I/O and no async: key derivation, authenticated encryption, secure
//! memory, and the password policy / strength rules that gate them.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod kdf;
pub mod symmetric;

pub mod password;

pub use error::CryptoError;
pub use kdf::{
    derive_key, DerivedKey, Pbkdf2Params, DEFAULT_ITERATIONS, KDF_ID, MAX_ITERATIONS, SALT_LEN,
};
pub use memory::{SecretBuffer, SecretBytes};
pub use password::{
    score_password, PasswordPolicy, PasswordValidator, PolicyViolation, StrengthLabel,
    StrengthReport, ValidationResult,
};
pub use symmetric::{decrypt, encrypt, open_token, seal_token, SealedData, ALGORITHM_ID};
