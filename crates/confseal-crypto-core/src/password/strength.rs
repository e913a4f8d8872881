//! Password strength meter for UI feedback.
//!
//! Score = length (≤ 30) + character variety (≤ 40) + distinct characters (≤ 30).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Cap on the length component.
const LENGTH_CAP: usize = 30;

/// Cap on the distinct-character component.
const UNIQUENESS_CAP: usize = 30;

/// Points per character class present.
const CLASS_POINTS: u8 = 10;

/// Maximum total score.
pub const MAX_SCORE: u8 = 100;

/// Qualitative strength tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrengthLabel {
    VeryWeak,
    Weak,
    Fair,
    Strong,
    VeryStrong,
}

impl StrengthLabel {
    /// Tier for a total score. Each threshold is the first score of the next tier.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=29 => Self::VeryWeak,
            30..=49 => Self::Weak,
            50..=69 => Self::Fair,
            70..=84 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }

    /// Display text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score and tier for one password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthReport {
    pub label: StrengthLabel,
    /// `0..=100`.
    pub score: u8,
}

/// Score `password`. Pure; the empty string scores 0.
#[must_use]
pub fn score_password(password: &str) -> StrengthReport {
    let length = password.chars().count();
    let distinct = password.chars().collect::<HashSet<_>>().len();

    let length_points = length.saturating_mul(2).min(LENGTH_CAP);
    let uniqueness_points = distinct.saturating_mul(2).min(UNIQUENESS_CAP);

    let classes = [
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let variety_points = classes
        .iter()
        .filter(|present| **present)
        .fold(0u8, |acc, _| acc.saturating_add(CLASS_POINTS));

    // Both capped components are ≤ 30, so the conversions cannot fail.
    let total = u8::try_from(length_points)
        .unwrap_or(u8::MAX)
        .saturating_add(variety_points)
        .saturating_add(u8::try_from(uniqueness_points).unwrap_or(u8::MAX))
        .min(MAX_SCORE);

    StrengthReport {
        label: StrengthLabel::from_score(total),
        score: total,
    }
}
