//! On-disk container envelope.
//!
//! ```text
//! encrypted: {"format": "encrypted-v1", "encryption": {..}, "metadata": {..}, "data": "<base64 token>"}
//! plain:     {"format": "plain-v1", "metadata": {..}, "config": <any JSON>}
//! ```
//!
//! Anything else is a legacy document: readers fall back to treating it as
//! bare configuration (see [`crate::storage`]).

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Format tag of encrypted containers.
pub const ENCRYPTED_FORMAT: &str = "encrypted-v1";

/// Format tag of plain containers.
pub const PLAIN_FORMAT: &str = "plain-v1";

/// File extension for encrypted containers.
pub const ENCRYPTED_EXTENSION: &str = "confseal";

/// File extension for plain containers.
pub const PLAIN_EXTENSION: &str = "json";

/// Schema version written to `metadata.version` when the caller gives none.
pub const CONTAINER_VERSION: &str = "1.0";

/// Name written to `metadata.name` when the caller gives none.
pub const DEFAULT_NAME: &str = "Untitled Configuration";

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// Encrypted or plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Encrypted,
    Plain,
}

impl ContainerKind {
    #[must_use]
    pub const fn from_encrypted(encrypted: bool) -> Self {
        if encrypted {
            Self::Encrypted
        } else {
            Self::Plain
        }
    }

    /// Kind for a `format` tag, `None` for legacy/unknown tags.
    #[must_use]
    pub fn from_format_tag(tag: &str) -> Option<Self> {
        match tag {
            ENCRYPTED_FORMAT => Some(Self::Encrypted),
            PLAIN_FORMAT => Some(Self::Plain),
            _ => None,
        }
    }

    /// Kind of a parsed document, judged by its `format` tag only.
    #[must_use]
    pub fn of_document(document: &Value) -> Option<Self> {
        document
            .get("format")
            .and_then(Value::as_str)
            .and_then(Self::from_format_tag)
    }

    /// Guess the kind from a file extension (case-insensitive). Does not
    /// open the file.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case(ENCRYPTED_EXTENSION) {
            Some(Self::Encrypted)
        } else if ext.eq_ignore_ascii_case(PLAIN_EXTENSION) {
            Some(Self::Plain)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn format_tag(self) -> &'static str {
        match self {
            Self::Encrypted => ENCRYPTED_FORMAT,
            Self::Plain => PLAIN_FORMAT,
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Encrypted => ENCRYPTED_EXTENSION,
            Self::Plain => PLAIN_EXTENSION,
        }
    }

    #[must_use]
    pub const fn is_encrypted(self) -> bool {
        matches!(self, Self::Encrypted)
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Informational envelope metadata. Never needed to decode a payload.
///
/// Unknown keys are kept in [`Self::extra`] so a read/modify/write cycle
/// does not drop fields written by newer versions. Decoding never fails on
/// content: a known key holding the wrong JSON type is left in `extra` and
/// the typed field stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContainerMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO 8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// ISO 8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    // Provenance of the configuration, when it was pulled from a remote source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_tenant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_tsg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folders_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippets_count: Option<u64>,

    /// Keys this version does not know about, or known keys with a value of
    /// the wrong type, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    if !map.get(key).is_some_and(Value::is_string) {
        return None;
    }
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn take_count(map: &mut Map<String, Value>, key: &str) -> Option<u64> {
    let count = map.get(key).and_then(Value::as_u64)?;
    map.remove(key);
    Some(count)
}

impl ContainerMetadata {
    /// Metadata with only a name set.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Lift the known keys that carry the expected type out of `map`.
    /// Everything else stays in [`Self::extra`].
    #[must_use]
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        Self {
            name: take_string(&mut map, "name"),
            description: take_string(&mut map, "description"),
            created_at: take_string(&mut map, "created_at"),
            modified_at: take_string(&mut map, "modified_at"),
            version: take_string(&mut map, "version"),
            source_tenant: take_string(&mut map, "source_tenant"),
            source_tsg: take_string(&mut map, "source_tsg"),
            pull_date: take_string(&mut map, "pull_date"),
            item_count: take_count(&mut map, "item_count"),
            folders_count: take_count(&mut map, "folders_count"),
            snippets_count: take_count(&mut map, "snippets_count"),
            extra: map,
        }
    }

    /// Fill every unset descriptive field: default name, empty description,
    /// `now` for both timestamps, and the current schema version. Provenance
    /// fields are left as supplied. A mistyped value parked in `extra` under
    /// a filled key is replaced.
    #[must_use]
    pub fn with_defaults(mut self, now: &str) -> Self {
        let extra = &mut self.extra;
        let mut fill = |field: &mut Option<String>, key: &str, value: &str| {
            if field.is_none() {
                extra.remove(key);
                *field = Some(value.into());
            }
        };
        fill(&mut self.name, "name", DEFAULT_NAME);
        fill(&mut self.description, "description", "");
        fill(&mut self.created_at, "created_at", now);
        fill(&mut self.modified_at, "modified_at", now);
        fill(&mut self.version, "version", CONTAINER_VERSION);
        self
    }
}

impl<'de> Deserialize<'de> for ContainerMetadata {
    /// Accepts any JSON value. Non-object metadata decodes as empty.
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => Self::from_map(map),
            _ => Self::default(),
        })
    }
}

/// Metadata returned by [`crate::storage::peek_metadata`].
///
/// Serializes flat: every metadata key plus `"encrypted": bool`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeekedMetadata {
    #[serde(flatten)]
    pub metadata: ContainerMetadata,
    pub encrypted: bool,
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// The `encryption` block of an encrypted container.
///
/// Readers must derive the key from these values, never from compile-time
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionParams {
    pub algorithm: String,
    pub kdf: String,
    pub iterations: u32,
    /// Base64 of the 16-byte salt. Optional on read so that a damaged file
    /// reports a missing salt rather than a parse error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

/// An encrypted container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedContainer {
    pub format: String,
    pub encryption: EncryptionParams,
    #[serde(default)]
    pub metadata: ContainerMetadata,
    /// Base64 of the `nonce || ciphertext || tag` token.
    pub data: String,
}

/// A plain (unencrypted) container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainContainer {
    pub format: String,
    #[serde(default)]
    pub metadata: ContainerMetadata,
    pub config: Value,
}

impl PlainContainer {
    #[must_use]
    pub fn new(config: Value, metadata: ContainerMetadata) -> Self {
        Self {
            format: PLAIN_FORMAT.into(),
            metadata,
            config,
        }
    }
}
