//! URL slugification and filename utilities.
//!
//! Converts metadata values and filenames to URL-safe formats and decomposes
//! source paths into the parts page derivation needs.

use std::path::Path;

// ============================================================================
// Slugification
// ============================================================================

/// Convert text to a URL-safe slug: lower-case, ASCII transliterated,
/// punctuation collapsed to hyphens.
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// Replace word separators (`-`, `_`) with spaces.
pub fn unslug(text: &str) -> String {
    text.chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect()
}

/// Convert a string to start case (e.g., "hello world" -> "Hello World").
///
/// Words are lower-cased first, so "HELLO world" also becomes "Hello World".
pub fn title_case(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Filename Decomposition
// ============================================================================

/// Parts of a source filename.
///
/// | Field | Example for `posts/2024-03-05-my-post.md` |
/// |-------|-------------------------------------------|
/// | `name` | `2024-03-05-my-post.md` |
/// | `stem` | `2024-03-05-my-post` |
/// | `ext`  | `.md` |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileParts {
    pub name: String,
    pub stem: String,
    pub ext: String,
}

/// Decompose a file path into name, stem and extension.
///
/// The extension keeps its leading dot; a file without one gets an empty
/// string for both missing parts it cannot supply.
pub fn split_filename(path: &Path) -> FileParts {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    FileParts { name, stem, ext }
}
