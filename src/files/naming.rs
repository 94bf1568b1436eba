//! Filename rules for canonical letters and for sequencing.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static EXPORT_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*) - Google (?:Docs|Sheets)(\.[^.]+)$").expect("valid suffix regex")
});

static SEQUENCE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,}\s+").expect("valid prefix regex"));

/// `"<org> — Letter to <recipient> [<date>]<extension>"`
///
/// `extension` includes the leading dot, or is empty.
pub fn canonical_filename(
    organization: &str,
    recipient: &str,
    formatted_date: &str,
    extension: &str,
) -> String {
    format!(
        "{} — Letter to {} [{}]{}",
        organization, recipient, formatted_date, extension
    )
}

/// Extension of `path` with its leading dot, or an empty string
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// Drop a `" - Google Docs"` / `" - Google Sheets"` marker sitting right before the extension
pub fn remove_export_suffix(filename: &str) -> String {
    EXPORT_SUFFIX.replace(filename, "$1$2").into_owned()
}

/// Drop a leading sequence number (two or more digits) and the whitespace after it.
///
/// Matches every prefix `sequenced_filename` can produce, including `100 `
/// and up, so renumbering a large folder never stacks prefixes.
pub fn remove_sequence_prefix(filename: &str) -> String {
    SEQUENCE_PREFIX.replace(filename, "").into_owned()
}

/// Both cleanups, in the order the sequencer applies them
pub fn clean_filename(filename: &str) -> String {
    remove_sequence_prefix(&remove_export_suffix(filename))
}

/// `"NN <name>"` with NN zero-padded to two digits
pub fn sequenced_filename(index: usize, name: &str) -> String {
    format!("{:02} {}", index, name)
}

/// First free path of the form `path`, `stem (1).ext`, `stem (2).ext`, ...
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = dotted_extension(path);
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let mut counter = 1;
    loop {
        let candidate = parent.join(format!("{} ({}){}", stem, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
