//! Filesystem-safe, timestamped container filenames.

use std::sync::OnceLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;

use crate::container::ContainerKind;

/// Longest slug kept from the friendly name.
pub const MAX_SLUG_LEN: usize = 50;

/// Slug used when nothing survives sanitizing.
pub const FALLBACK_SLUG: &str = "config";

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9 \-]").expect("static regex"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn hyphen_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").expect("static regex"))
}

/// Reduce a friendly name to `[a-z0-9-]`, at most [`MAX_SLUG_LEN`] characters.
///
/// Lowercases first, so `"Prod"` and `"prod"` share a slug. Non-ASCII letters
/// are dropped rather than transliterated.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let kept = disallowed().replace_all(&lower, "");
    let dashed = whitespace_runs().replace_all(&kept, "-");
    let collapsed = hyphen_runs().replace_all(&dashed, "-");
    let slug: String = collapsed
        .trim_matches('-')
        .chars()
        .take(MAX_SLUG_LEN)
        .collect();

    if slug.is_empty() {
        FALLBACK_SLUG.into()
    } else {
        slug
    }
}

/// `{slug}_{YYYYMMDD_HHMMSS}.{confseal|json}` using the local clock.
///
/// Two calls in the same second with the same name collide; callers that care
/// must check for an existing file.
#[must_use]
pub fn generate_filename(friendly_name: &str, encrypted: bool) -> String {
    generate_filename_at(friendly_name, encrypted, Local::now().naive_local())
}

/// [`generate_filename`] with an explicit timestamp.
#[must_use]
pub fn generate_filename_at(friendly_name: &str, encrypted: bool, at: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        sanitize_name(friendly_name),
        at.format("%Y%m%d_%H%M%S"),
        ContainerKind::from_encrypted(encrypted).extension()
    )
}
