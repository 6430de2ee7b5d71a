use std::path::{Path, MAIN_SEPARATOR};

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::entry::EntryKind;

// Path separators, the Windows reserved set, and full-width punctuation.
static FORBIDDEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|？！；：]"#).unwrap());

/// NFKC-normalizes `translated` and replaces characters that cannot appear in
/// a file name with `_`.
pub fn sanitize_name(translated: &str) -> String {
    let normalized: String = translated.nfkc().collect();
    FORBIDDEN.replace_all(&normalized, "_").into_owned()
}

/// Sanitizes a translated name for `original`. When a file's original name
/// carried a directory component, that component is kept in front of the
/// sanitized leaf.
pub fn sanitize_for(original: &str, translated: &str, kind: EntryKind) -> String {
    let leaf = sanitize_name(translated);

    let has_dir = original.contains('/') || original.contains(MAIN_SEPARATOR);
    if kind != EntryKind::File || !has_dir {
        return leaf;
    }

    match Path::new(original).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(&leaf).to_string_lossy().into_owned(),
        _ => leaf,
    }
}
