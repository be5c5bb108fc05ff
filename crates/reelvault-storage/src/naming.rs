//! Filename sanitizing and object key generation.

use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

/// Fallback name for absent or empty input.
pub const DEFAULT_BASE_NAME: &str = "video";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid unsafe-char pattern"));
static UNDERSCORE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("valid underscore-run pattern"));

/// Map every character outside `[A-Za-z0-9._-]` to `_`, collapse runs of
/// underscores and trim. Absent or empty input yields `"video"`.
///
/// The result only contains `[A-Za-z0-9._-]`, so it can never hold a path
/// separator, and applying it twice gives the same string.
pub fn sanitize_file_name(name: Option<&str>) -> String {
    let Some(name) = name else {
        return DEFAULT_BASE_NAME.to_string();
    };

    let replaced = UNSAFE_CHARS.replace_all(name, "_");
    let collapsed = UNDERSCORE_RUNS.replace_all(&replaced, "_");
    let trimmed = collapsed.trim();

    if trimmed.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Substring from the last `.` (inclusive) to the end, or `""`.
pub fn get_file_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx..],
        None => "",
    }
}

/// Build a fresh object key for an upload named `original_name`:
/// `{base}_{epoch_millis}_{8 hex}{ext}`. The original extension keeps its
/// case; the base is sanitized and loses trailing underscores so the
/// separators stay single.
pub fn generate_object_key(original_name: &str) -> String {
    let extension = get_file_extension(original_name);
    let base = &original_name[..original_name.len() - extension.len()];

    let sanitized = sanitize_file_name(Some(base));
    let mut base = sanitized.trim_end_matches('_');
    if base.is_empty() {
        base = DEFAULT_BASE_NAME;
    }

    format!(
        "{}_{}_{}{}",
        base,
        Utc::now().timestamp_millis(),
        random_suffix(),
        extension
    )
}

fn random_suffix() -> String {
    let mut simple = Uuid::new_v4().simple().to_string();
    simple.truncate(8);
    simple
}
