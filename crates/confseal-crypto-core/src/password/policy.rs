//! Configurable password policy and validator.
//!
//! A [`PasswordPolicy`] is plain data (usually loaded from settings). A
//! [`PasswordValidator`] owns one and checks candidates against every rule,
//! collecting all violations instead of stopping at the first.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::common;

/// Characters counted as "special" by the default policy.
pub const DEFAULT_SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Password requirements.
///
/// Every field has a serde default, so a partial settings file only overrides
/// the keys it names.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordPolicy {
    /// Minimum length in characters.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Maximum length in characters.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Require at least one `A-Z`.
    #[serde(default = "default_true")]
    pub require_uppercase: bool,
    /// Require at least one `a-z`.
    #[serde(default = "default_true")]
    pub require_lowercase: bool,
    /// Require at least one `0-9`.
    #[serde(default = "default_true")]
    pub require_digit: bool,
    /// Require at least one character from [`Self::special_characters`].
    #[serde(default = "default_true")]
    pub require_special: bool,
    /// Literal set of characters that count as special. Matched by membership,
    /// so characters like `]` or `^` carry no pattern meaning.
    #[serde(default = "default_special_characters")]
    pub special_characters: String,
    /// Reject passwords found in [`Self::common_passwords`].
    #[serde(default = "default_true")]
    pub reject_common_passwords: bool,
    /// Blocklist, compared case-insensitively.
    #[serde(default = "common::default_blocklist")]
    pub common_passwords: Vec<String>,
    /// Reject passwords containing the username.
    #[serde(default = "default_true")]
    pub reject_username_in_password: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
            special_characters: default_special_characters(),
            reject_common_passwords: true,
            common_passwords: common::default_blocklist(),
            reject_username_in_password: true,
        }
    }
}

impl PasswordPolicy {
    /// A policy that accepts every string, including the empty one.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            min_length: 0,
            max_length: usize::MAX,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_special: false,
            special_characters: String::new(),
            reject_common_passwords: false,
            common_passwords: Vec::new(),
            reject_username_in_password: false,
        }
    }
}

const fn default_min_length() -> usize {
    12
}
const fn default_max_length() -> usize {
    128
}
const fn default_true() -> bool {
    true
}
fn default_special_characters() -> String {
    DEFAULT_SPECIAL_CHARACTERS.into()
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    TooShort { min_length: usize },
    TooLong { max_length: usize },
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial { allowed: String },
    CommonPassword,
    ContainsUsername,
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min_length } => {
                write!(f, "Password must be at least {min_length} characters long")
            }
            Self::TooLong { max_length } => {
                write!(f, "Password must be no more than {max_length} characters long")
            }
            Self::MissingUppercase => {
                f.write_str("Password must contain at least one uppercase letter")
            }
            Self::MissingLowercase => {
                f.write_str("Password must contain at least one lowercase letter")
            }
            Self::MissingDigit => f.write_str("Password must contain at least one digit"),
            Self::MissingSpecial { allowed } => write!(
                f,
                "Password must contain at least one special character ({allowed})"
            ),
            Self::CommonPassword => {
                f.write_str("Password is too common, please choose a less predictable one")
            }
            Self::ContainsUsername => f.write_str("Password must not contain your username"),
        }
    }
}

/// Outcome of [`PasswordValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use]
pub struct ValidationResult {
    violations: Vec<PolicyViolation>,
}

impl ValidationResult {
    /// `true` when no rule failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Failed rules, in rule order.
    #[must_use]
    pub fn violations(&self) -> &[PolicyViolation] {
        &self.violations
    }

    /// Human-readable messages, one per failed rule.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Checks passwords against a fixed [`PasswordPolicy`].
///
/// Holds no mutable state; share it freely across threads.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    policy: PasswordPolicy,
    blocklist: HashSet<String>,
}

impl PasswordValidator {
    #[must_use]
    pub fn new(policy: PasswordPolicy) -> Self {
        let blocklist = policy
            .common_passwords
            .iter()
            .map(|p| p.to_lowercase())
            .collect();
        Self { policy, blocklist }
    }

    #[must_use]
    pub const fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Check `password` against every rule. Pass `""` for `username` when
    /// there is none.
    pub fn validate(&self, password: &str, username: &str) -> ValidationResult {
        let policy = &self.policy;
        let mut violations = Vec::new();
        let length = password.chars().count();

        if length < policy.min_length {
            violations.push(PolicyViolation::TooShort {
                min_length: policy.min_length,
            });
        }
        if length > policy.max_length {
            violations.push(PolicyViolation::TooLong {
                max_length: policy.max_length,
            });
        }

        if policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            violations.push(PolicyViolation::MissingUppercase);
        }
        if policy.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            violations.push(PolicyViolation::MissingLowercase);
        }
        if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PolicyViolation::MissingDigit);
        }
        if policy.require_special
            && !password
                .chars()
                .any(|c| policy.special_characters.contains(c))
        {
            violations.push(PolicyViolation::MissingSpecial {
                allowed: policy.special_characters.clone(),
            });
        }

        let lowered = password.to_lowercase();
        if policy.reject_common_passwords && self.blocklist.contains(&lowered) {
            violations.push(PolicyViolation::CommonPassword);
        }

        if policy.reject_username_in_password
            && !username.is_empty()
            && lowered.contains(&username.to_lowercase())
        {
            violations.push(PolicyViolation::ContainsUsername);
        }

        ValidationResult { violations }
    }
}

impl Default for PasswordValidator {
    fn default() -> Self {
        Self::new(PasswordPolicy::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
