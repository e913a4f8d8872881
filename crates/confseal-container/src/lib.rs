//! `confseal-container`: versioned JSON containers for configuration data.
//!
//! A container is either encrypted (PBKDF2 + AES-256-GCM, see
//! [`confseal_crypto_core`]) or plain, and always carries readable metadata
//! so a file list can be shown without asking for passwords.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod container;
pub mod error;

pub mod codec;
pub mod storage;

pub mod filename;
pub mod settings;

pub use codec::{decrypt_config, encrypt_config, encrypt_config_with_params, is_encrypted};
pub use container::{
    ContainerKind, ContainerMetadata, EncryptedContainer, EncryptionParams, PeekedMetadata,
    PlainContainer, CONTAINER_VERSION, DEFAULT_NAME, ENCRYPTED_EXTENSION, ENCRYPTED_FORMAT,
    PLAIN_EXTENSION, PLAIN_FORMAT,
};
pub use error::ContainerError;
pub use filename::{generate_filename, generate_filename_at, sanitize_name};
pub use settings::SecuritySettings;
pub use storage::{is_encrypted_file, load, load_with_prompt, peek_metadata, save, save_with_params};
