//! Security settings, stored as plain JSON next to the containers.
//!
//! Nothing in here is secret: the password policy, the PBKDF2 work factor for
//! new containers, and how many password attempts a caller should allow.

use std::fs;
use std::path::Path;

use confseal_crypto_core::{PasswordPolicy, PasswordValidator, Pbkdf2Params, DEFAULT_ITERATIONS};
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "security-settings.json";
const SETTINGS_TMP_FILE: &str = ".security-settings.json.tmp";

/// Persisted security settings.
///
/// Every field has a serde default, so a partial file only overrides what it
/// names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    /// Rules new passwords are validated against.
    #[serde(default)]
    pub password_policy: PasswordPolicy,

    /// PBKDF2 iterations for newly written containers. Existing containers
    /// always decrypt with the count stored inside them.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Password prompts offered before giving up on an encrypted file.
    #[serde(default = "default_max_password_attempts")]
    pub max_password_attempts: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            password_policy: PasswordPolicy::default(),
            kdf_iterations: default_kdf_iterations(),
            max_password_attempts: default_max_password_attempts(),
        }
    }
}

const fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}
const fn default_max_password_attempts() -> u32 {
    3
}

impl SecuritySettings {
    /// KDF parameters for new containers. A zero count falls back to the
    /// default rather than producing an unusable container.
    #[must_use]
    pub const fn kdf_params(&self) -> Pbkdf2Params {
        let iterations = if self.kdf_iterations == 0 {
            DEFAULT_ITERATIONS
        } else {
            self.kdf_iterations
        };
        Pbkdf2Params { iterations }
    }

    /// Validator for the configured policy.
    #[must_use]
    pub fn validator(&self) -> PasswordValidator {
        PasswordValidator::new(self.password_policy.clone())
    }

    /// Load settings from `{dir}/security-settings.json`.
    ///
    /// A missing file yields the defaults. A corrupt file also yields the
    /// defaults, with a warning.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "security settings unreadable, using defaults"
            );
            Self::default()
        })
    }

    /// Persist settings to `{dir}/security-settings.json`.
    ///
    /// Writes a temp file and renames it over the target, so a crash leaves
    /// either the old or the new settings.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the directory does not exist or the file
    /// system rejects the write/rename.
    pub fn save(&self, dir: &Path) -> std::io::Result<()> {
        let path = dir.join(SETTINGS_FILE);
        let tmp = dir.join(SETTINGS_TMP_FILE);

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&tmp, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &path)?;
        tracing::debug!(path = %path.display(), "security settings saved");
        Ok(())
    }
}
