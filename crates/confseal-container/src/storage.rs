//! Container files on disk.
//!
//! Three document shapes are accepted on read:
//!
//! | `format`        | payload                                   |
//! |-----------------|-------------------------------------------|
//! | `encrypted-v1`  | decrypted with the caller's password      |
//! | `plain-v1`      | the `config` member                       |
//! | anything else   | legacy: the whole document is the config  |
//!
//! Writes always produce one of the first two shapes, pretty-printed, and
//! overwrite the target in place.

use std::fs;
use std::path::Path;

use confseal_crypto_core::Pbkdf2Params;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::codec::{decrypt_config, encrypt_config_with_params, is_encrypted};
use crate::container::{
    ContainerKind, ContainerMetadata, EncryptedContainer, PeekedMetadata, PlainContainer,
};
use crate::error::ContainerError;

// ---------------------------------------------------------------------------
// Write
// ---------------------------------------------------------------------------

/// Save `config` to `path`, encrypted when a password is given.
///
/// # Errors
///
/// See [`save_with_params`].
pub fn save<T: Serialize + ?Sized>(
    path: &Path,
    config: &T,
    password: Option<&str>,
    metadata: Option<ContainerMetadata>,
) -> Result<(), ContainerError> {
    save_with_params(path, config, password, metadata, &Pbkdf2Params::default())
}

/// Save `config` to `path` with an explicit PBKDF2 work factor.
///
/// With a password the file is an encrypted container; without one it is a
/// plain container whose metadata is exactly what the caller supplied.
///
/// # Errors
///
/// Returns `ContainerError::Json` if `config` cannot be serialized,
/// `ContainerError::Crypto` if encryption fails and `ContainerError::Io` if
/// the file cannot be written.
pub fn save_with_params<T: Serialize + ?Sized>(
    path: &Path,
    config: &T,
    password: Option<&str>,
    metadata: Option<ContainerMetadata>,
    params: &Pbkdf2Params,
) -> Result<(), ContainerError> {
    let (kind, json) = if let Some(password) = password {
        let container = encrypt_config_with_params(config, password, metadata, params)?;
        (
            ContainerKind::Encrypted,
            serde_json::to_string_pretty(&container)?,
        )
    } else {
        let container =
            PlainContainer::new(serde_json::to_value(config)?, metadata.unwrap_or_default());
        (
            ContainerKind::Plain,
            serde_json::to_string_pretty(&container)?,
        )
    };

    fs::write(path, json)?;
    debug!(path = %path.display(), ?kind, "container saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// Load the configuration stored at `path`.
///
/// # Errors
///
/// - `Io` / `Json` if the file cannot be read or is not JSON.
/// - `PasswordRequired` if the file is encrypted and `password` is `None`.
/// - `InvalidDocument` if a tagged document lacks its required members.
/// - Any [`decrypt_config`] error for encrypted files.
/// - `Json` if a plain or legacy payload does not match `T`.
pub fn load<T: DeserializeOwned>(path: &Path, password: Option<&str>) -> Result<T, ContainerError> {
    open_document(path, read_document(path)?, password)
}

fn open_document<T: DeserializeOwned>(
    path: &Path,
    document: Value,
    password: Option<&str>,
) -> Result<T, ContainerError> {
    let kind = ContainerKind::of_document(&document);
    debug!(path = %path.display(), ?kind, "loading container");

    match kind {
        Some(ContainerKind::Encrypted) => {
            let password = password.ok_or(ContainerError::PasswordRequired)?;
            decrypt_config(&as_encrypted(document)?, password)
        }
        Some(ContainerKind::Plain) => Ok(serde_json::from_value(as_plain(document)?.config)?),
        None => {
            debug!(path = %path.display(), "no recognised format tag, reading as legacy config");
            Ok(serde_json::from_value(document)?)
        }
    }
}

/// Load `path`, asking `prompt` for a password when the file is encrypted.
///
/// `prompt` receives the 1-based attempt number and returns `None` to give
/// up. Only a wrong password is retried; any other error is returned at once.
/// Unencrypted files never call `prompt`.
///
/// # Errors
///
/// - `PasswordRequired` if `prompt` returns `None` or `max_attempts` is 0.
/// - `WrongPasswordOrCorrupted` once every attempt has failed.
/// - Any other [`load`] error unchanged.
pub fn load_with_prompt<T, F>(
    path: &Path,
    max_attempts: u32,
    mut prompt: F,
) -> Result<T, ContainerError>
where
    T: DeserializeOwned,
    F: FnMut(u32) -> Option<String>,
{
    let document = read_document(path)?;
    if !is_encrypted(&document) {
        return open_document(path, document, None);
    }
    let container = as_encrypted(document)?;

    let mut last_error = ContainerError::PasswordRequired;
    for attempt in 1..=max_attempts {
        let Some(mut password) = prompt(attempt) else {
            return Err(ContainerError::PasswordRequired);
        };
        let result = decrypt_config(&container, &password);
        password.zeroize();

        match result {
            Err(ContainerError::WrongPasswordOrCorrupted) => {
                warn!(path = %path.display(), attempt, max_attempts, "password rejected");
                last_error = ContainerError::WrongPasswordOrCorrupted;
            }
            other => {
                if other.is_ok() {
                    info!(path = %path.display(), attempt, "container unlocked");
                }
                return other;
            }
        }
    }
    Err(last_error)
}

/// Whether the file at `path` is an encrypted container.
///
/// Reads the outer JSON only. Unreadable or unparsable files are reported as
/// not encrypted.
#[must_use]
pub fn is_encrypted_file(path: &Path) -> bool {
    read_document(path).is_ok_and(|document| is_encrypted(&document))
}

/// Read a container's metadata without a password.
///
/// Legacy documents are read best-effort: their `metadata` object if they
/// have one, otherwise the document itself, with the file stem as the name
/// when none is given. Failures are logged and yield `None`.
#[must_use]
pub fn peek_metadata(path: &Path) -> Option<PeekedMetadata> {
    let peeked = read_document(path).and_then(|document| peek_document(&document, path));
    match peeked {
        Ok(peeked) => Some(peeked),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read container metadata");
            None
        }
    }
}

fn peek_document(document: &Value, path: &Path) -> Result<PeekedMetadata, ContainerError> {
    let kind = ContainerKind::of_document(document);

    let source = match (kind, document.get("metadata")) {
        (Some(_), Some(Value::Object(metadata))) => metadata.clone(),
        (Some(_), _) => Map::new(),
        (None, Some(Value::Object(metadata))) => metadata.clone(),
        (None, _) => document.as_object().cloned().ok_or_else(|| {
            ContainerError::InvalidDocument("legacy document is not a JSON object".into())
        })?,
    };

    let mut metadata = ContainerMetadata::from_map(source);
    metadata.extra.remove("encrypted");
    if kind.is_none() && metadata.name.is_none() {
        metadata.extra.remove("name");
        metadata.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }

    Ok(PeekedMetadata {
        metadata,
        encrypted: kind == Some(ContainerKind::Encrypted),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_document(path: &Path) -> Result<Value, ContainerError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn as_encrypted(document: Value) -> Result<EncryptedContainer, ContainerError> {
    serde_json::from_value(document)
        .map_err(|e| ContainerError::InvalidDocument(format!("encrypted container: {e}")))
}

fn as_plain(document: Value) -> Result<PlainContainer, ContainerError> {
    serde_json::from_value(document)
        .map_err(|e| ContainerError::InvalidDocument(format!("plain container: {e}")))
}
