//! AES-256-GCM authenticated encryption of container payloads.
//!
//! This module provides:
//! - [`encrypt`] / [`decrypt`]: seal and open a [`SealedData`]
//! - [`seal_token`] / [`open_token`]: the same, on the flat token bytes stored
//!   (base64-encoded) in an encrypted container
//!
//! # Token Format
//!
//! ```text
//! nonce (12 B) | ciphertext (N B) | tag (16 B)
//! ```
//!
//! The nonce and tag travel inside the token, so the container only has to
//! store the token itself. A wrong key, any flipped bit, or a mismatched AAD
//! all surface as [`CryptoError::Decryption`]; malformed input (bad key length,
//! a token shorter than nonce + tag) surfaces as [`CryptoError::Encryption`].

use crate::error::CryptoError;
use crate::memory::SecretBuffer;
use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Identifier written to the container's `encryption.algorithm` field.
pub const ALGORITHM_ID: &str = "AES-256-GCM";

/// Minimum valid token length: nonce + empty ciphertext + tag.
const MIN_TOKEN_LEN: usize = NONCE_LEN + TAG_LEN;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Nonce + ciphertext + tag.
#[must_use = "encrypted data must be stored"]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedData {
    /// 96-bit random nonce, unique per encryption.
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted bytes (same length as the plaintext).
    pub ciphertext: Vec<u8>,
    /// 128-bit authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl SealedData {
    /// Flatten to `nonce || ciphertext || tag`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let capacity = NONCE_LEN
            .saturating_add(self.ciphertext.len())
            .saturating_add(TAG_LEN);
        let mut out = Vec::with_capacity(capacity);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Split a flat token back into its parts.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encryption` if the token is shorter than 28 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_TOKEN_LEN {
            return Err(CryptoError::Encryption(format!(
                "token too short: {} bytes (minimum {MIN_TOKEN_LEN})",
                bytes.len()
            )));
        }

        let (nonce_part, rest) = bytes.split_at(NONCE_LEN);
        let ct_len = rest
            .len()
            .checked_sub(TAG_LEN)
            .ok_or_else(|| CryptoError::Encryption("token length underflow".into()))?;
        let (ciphertext, tag_part) = rest.split_at(ct_len);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_part);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(tag_part);

        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
            tag,
        })
    }
}

// ---------------------------------------------------------------------------
// Core encryption
// ---------------------------------------------------------------------------

fn aes_key(key: &[u8]) -> Result<aead::LessSafeKey, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::Encryption(format!(
            "invalid key length: {} bytes (expected {KEY_LEN})",
            key.len()
        )));
    }
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
    Ok(aead::LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under a 32-byte `key` with a fresh random nonce.
///
/// `aad` is authenticated but not encrypted and must be supplied unchanged
/// to [`decrypt`].
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the key is not 32 bytes, the CSPRNG
/// fails, or sealing fails.
pub fn encrypt(plaintext: &[u8], key: &[u8], aad: &[u8]) -> Result<SealedData, CryptoError> {
    let sealing_key = aes_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| CryptoError::Encryption(format!("nonce generation failed: {e}")))?;
    let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    let Ok(tag) = sealing_key.seal_in_place_separate_tag(nonce, aead::Aad::from(aad), &mut in_out)
    else {
        in_out.zeroize();
        return Err(CryptoError::Encryption(
            "AES-256-GCM encryption failed".into(),
        ));
    };

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_ref());

    Ok(SealedData {
        nonce: nonce_bytes,
        ciphertext: in_out,
        tag: tag_bytes,
    })
}

/// Authenticate and decrypt `sealed`.
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the key is not 32 bytes.
/// Returns `CryptoError::Decryption` if authentication fails (wrong key,
/// tampered nonce/ciphertext/tag, or wrong AAD).
pub fn decrypt(sealed: &SealedData, key: &[u8], aad: &[u8]) -> Result<SecretBuffer, CryptoError> {
    let opening_key = aes_key(key)?;
    let nonce = aead::Nonce::assume_unique_for_key(sealed.nonce);

    let mut ct_tag = Vec::with_capacity(sealed.ciphertext.len().saturating_add(TAG_LEN));
    ct_tag.extend_from_slice(&sealed.ciphertext);
    ct_tag.extend_from_slice(&sealed.tag);

    let result = match opening_key.open_in_place(nonce, aead::Aad::from(aad), &mut ct_tag) {
        Ok(plaintext) => Ok(SecretBuffer::new(plaintext)),
        Err(_) => Err(CryptoError::Decryption),
    };
    ct_tag.zeroize();
    result
}

/// Encrypt and flatten into a token.
///
/// # Errors
///
/// See [`encrypt`].
pub fn seal_token(plaintext: &[u8], key: &[u8], aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
    encrypt(plaintext, key, aad).map(|sealed| sealed.to_bytes())
}

/// Parse and decrypt a token produced by [`seal_token`].
///
/// # Errors
///
/// `CryptoError::Encryption` for a truncated token or bad key length,
/// `CryptoError::Decryption` when authentication fails.
pub fn open_token(token: &[u8], key: &[u8], aad: &[u8]) -> Result<SecretBuffer, CryptoError> {
    let sealed = SealedData::from_bytes(token)?;
    decrypt(&sealed, key, aad)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
