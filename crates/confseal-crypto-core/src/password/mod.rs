//! Password rules and strength scoring.
//!
//! - [`policy`]: configurable rules, reports every violation at once
//! - [`strength`]: 0–100 score and label for UI meters
//! - [`common`]: built-in common-password blocklist

pub mod common;
pub mod policy;
pub mod strength;

pub use policy::{PasswordPolicy, PasswordValidator, PolicyViolation, ValidationResult};
pub use strength::{score_password, StrengthLabel, StrengthReport};
