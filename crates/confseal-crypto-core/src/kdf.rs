//! PBKDF2-HMAC-SHA256 key derivation.
//!
//! This module provides:
//! - [`derive_key`]: derive a 256-bit key from a password, generating a salt if needed
//! - [`Pbkdf2Params`]: iteration count, stored alongside every encrypted container
//! - [`DerivedKey`]: the key together with the salt that produced it
//!
//! # Stored Parameters
//!
//! Decryption must always use the iteration count and salt recorded in the
//! container, never [`DEFAULT_ITERATIONS`]. The default only applies when a new
//! container is written, so raising it later keeps old files readable.

use crate::error::CryptoError;
use crate::memory::SecretBytes;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

/// Output length of the KDF in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Iteration count for newly written containers (OWASP 2023 floor for
/// PBKDF2-HMAC-SHA256).
pub const DEFAULT_ITERATIONS: u32 = 480_000;

/// Upper bound on the iteration count. Containers carry their own count, so
/// an unbounded value would let a crafted file stall the reader.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Identifier written to the container's `encryption.kdf` field.
pub const KDF_ID: &str = "PBKDF2-HMAC-SHA256";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// PBKDF2 parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pbkdf2Params {
    /// Number of HMAC-SHA256 rounds. Must be at least 1.
    pub iterations: u32,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// A derived key and the salt it was derived with.
#[derive(Debug)]
pub struct DerivedKey {
    /// 32-byte symmetric key, zeroized on drop.
    pub key: SecretBytes<KEY_LEN>,
    /// Salt used for the derivation; persisted next to the ciphertext.
    pub salt: [u8; SALT_LEN],
}

// ---------------------------------------------------------------------------
// Core KDF
// ---------------------------------------------------------------------------

/// Derive a 256-bit key from `password`.
///
/// When `salt` is `None`, 16 fresh bytes are drawn from `OsRng`. The output is
/// deterministic for a fixed (password, salt, iterations) triple.
///
/// Any password is accepted, including the empty string; strength rules are
/// enforced upstream by [`crate::password::policy`].
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if `params.iterations` is zero or
/// above [`MAX_ITERATIONS`], or the CSPRNG cannot produce a salt.
pub fn derive_key(
    password: &[u8],
    salt: Option<&[u8; SALT_LEN]>,
    params: &Pbkdf2Params,
) -> Result<DerivedKey, CryptoError> {
    if params.iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be at least 1".into(),
        ));
    }
    if params.iterations > MAX_ITERATIONS {
        return Err(CryptoError::KeyDerivation(format!(
            "iteration count {} exceeds maximum {MAX_ITERATIONS}",
            params.iterations
        )));
    }

    let salt = match salt {
        Some(s) => *s,
        None => generate_salt()?,
    };

    let mut output = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, &salt, params.iterations, &mut output);

    let key = SecretBytes::new(output);
    output.zeroize();
    Ok(DerivedKey { key, salt })
}

/// Draw a fresh random salt.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the OS CSPRNG fails.
pub fn generate_salt() -> Result<[u8; SALT_LEN], CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| CryptoError::KeyDerivation(format!("salt generation failed: {e}")))?;
    Ok(salt)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
