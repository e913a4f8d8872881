//! Container codec: configuration value <-> encrypted envelope.
//!
//! The payload is the compact JSON serialization of the configuration,
//! sealed with AES-256-GCM under a PBKDF2-derived key. The format tag is
//! bound as associated data, so a token cannot be replayed under a different
//! envelope version.
//!
//! Decryption always uses the iteration count and salt stored in the
//! container, never [`DEFAULT_ITERATIONS`](confseal_crypto_core::DEFAULT_ITERATIONS).

use confseal_crypto_core::{
    kdf, symmetric, CryptoError, Pbkdf2Params, ALGORITHM_ID, KDF_ID, SALT_LEN,
};
use data_encoding::BASE64;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use zeroize::Zeroize;

use crate::container::{
    ContainerKind, ContainerMetadata, EncryptedContainer, EncryptionParams, ENCRYPTED_FORMAT,
};
use crate::error::ContainerError;

/// Associated data bound to every token.
const AAD: &[u8] = ENCRYPTED_FORMAT.as_bytes();

/// Current UTC time, `YYYY-MM-DDTHH:MM:SSZ`.
#[must_use]
pub fn now_iso8601() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Encrypt `config` under `password` with the default PBKDF2 work factor.
///
/// # Errors
///
/// See [`encrypt_config_with_params`].
pub fn encrypt_config<T: Serialize + ?Sized>(
    config: &T,
    password: &str,
    metadata: Option<ContainerMetadata>,
) -> Result<EncryptedContainer, ContainerError> {
    encrypt_config_with_params(config, password, metadata, &Pbkdf2Params::default())
}

/// Encrypt `config` under `password` with an explicit iteration count.
///
/// A fresh salt and nonce are drawn on every call, so encrypting the same
/// value twice never produces the same container. Missing descriptive
/// metadata is filled in (see [`ContainerMetadata::with_defaults`]).
///
/// # Errors
///
/// Returns `ContainerError::Json` if `config` cannot be serialized and
/// `ContainerError::Crypto` if key derivation or encryption fails.
pub fn encrypt_config_with_params<T: Serialize + ?Sized>(
    config: &T,
    password: &str,
    metadata: Option<ContainerMetadata>,
    params: &Pbkdf2Params,
) -> Result<EncryptedContainer, ContainerError> {
    let mut plaintext = serde_json::to_vec(config)?;

    let sealed = kdf::derive_key(password.as_bytes(), None, params).and_then(|derived| {
        symmetric::seal_token(&plaintext, derived.key.expose(), AAD).map(|t| (t, derived.salt))
    });
    plaintext.zeroize();
    let (token, salt) = sealed?;

    Ok(EncryptedContainer {
        format: ENCRYPTED_FORMAT.into(),
        encryption: EncryptionParams {
            algorithm: ALGORITHM_ID.into(),
            kdf: KDF_ID.into(),
            iterations: params.iterations,
            salt: Some(BASE64.encode(&salt)),
        },
        metadata: metadata.unwrap_or_default().with_defaults(&now_iso8601()),
        data: BASE64.encode(&token),
    })
}

/// Decrypt an encrypted container back into a configuration value.
///
/// # Errors
///
/// - `UnsupportedFormat` if the format tag, algorithm or KDF is not the one
///   this crate writes.
/// - `MissingSalt` if the salt is absent or empty.
/// - `WrongPasswordOrCorrupted` if authentication fails.
/// - `DecryptionFailed` for everything else: undecodable base64, a salt of
///   the wrong size, an iteration count of zero or above
///   [`MAX_ITERATIONS`](confseal_crypto_core::MAX_ITERATIONS), a truncated
///   token, non-UTF-8 or non-JSON plaintext, or a payload that does not
///   match `T`.
pub fn decrypt_config<T: DeserializeOwned>(
    container: &EncryptedContainer,
    password: &str,
) -> Result<T, ContainerError> {
    check_envelope(container)?;

    let salt = decode_salt(container.encryption.salt.as_deref())?;
    let params = Pbkdf2Params {
        iterations: container.encryption.iterations,
    };
    let derived = kdf::derive_key(password.as_bytes(), Some(&salt), &params)
        .map_err(|e| ContainerError::DecryptionFailed(e.to_string()))?;

    let token = BASE64
        .decode(container.data.as_bytes())
        .map_err(|e| ContainerError::DecryptionFailed(format!("invalid base64 payload: {e}")))?;

    let plaintext =
        symmetric::open_token(&token, derived.key.expose(), AAD).map_err(|e| match e {
            CryptoError::Decryption => ContainerError::WrongPasswordOrCorrupted,
            other => ContainerError::DecryptionFailed(other.to_string()),
        })?;

    let text = std::str::from_utf8(plaintext.expose())
        .map_err(|e| ContainerError::DecryptionFailed(format!("plaintext is not UTF-8: {e}")))?;
    serde_json::from_str(text)
        .map_err(|e| ContainerError::DecryptionFailed(format!("plaintext is not valid JSON: {e}")))
}

/// Whether a parsed document is an encrypted container.
///
/// Looks at the `format` tag only; never decrypts and never fails.
#[must_use]
pub fn is_encrypted(document: &Value) -> bool {
    ContainerKind::of_document(document) == Some(ContainerKind::Encrypted)
}

fn check_envelope(container: &EncryptedContainer) -> Result<(), ContainerError> {
    if container.format != ENCRYPTED_FORMAT {
        return Err(ContainerError::UnsupportedFormat(format!(
            "expected {ENCRYPTED_FORMAT}, found {:?}",
            container.format
        )));
    }
    if container.encryption.algorithm != ALGORITHM_ID {
        return Err(ContainerError::UnsupportedFormat(format!(
            "unknown algorithm {:?}",
            container.encryption.algorithm
        )));
    }
    if container.encryption.kdf != KDF_ID {
        return Err(ContainerError::UnsupportedFormat(format!(
            "unknown key derivation {:?}",
            container.encryption.kdf
        )));
    }
    Ok(())
}

fn decode_salt(encoded: Option<&str>) -> Result<[u8; SALT_LEN], ContainerError> {
    let encoded = encoded
        .filter(|s| !s.is_empty())
        .ok_or(ContainerError::MissingSalt)?;
    let bytes = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| ContainerError::DecryptionFailed(format!("invalid base64 salt: {e}")))?;
    <[u8; SALT_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
        ContainerError::DecryptionFailed(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            bytes.len()
        ))
    })
}
