//! Page metadata derivation.
//!
//! `Page` is the derived entity for one content document: title, excerpt,
//! date, permalink-expanded URL, id, and filename decomposition, computed
//! from the document's merged configuration (site < collection < file front
//! matter) plus its source path. Derivation is pure; no I/O happens here.
//!
//! # Fields
//!
//! | Field | Example for `posts/2024-03-05-my-post.md` |
//! |-------|-------------------------------------------|
//! | `title` | `My Post` (from front matter, else the filename) |
//! | `url` | `/posts/my-post/` (permalink pattern expansion) |
//! | `id` | `/2024/03/05/my-post/` |
//! | `dir` | `/posts/` |
//! | `date` | `2024-03-05` (front matter, else the filename) |
//! | `next`/`previous` | positional links threaded after the collection sort |

use crate::merge::Tree;
use crate::utils::date::DateTimeUtc;
use crate::utils::slug::{split_filename, slugify, title_case, unslug};
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Excerpt length when neither a separator nor a length is configured.
const DEFAULT_EXCERPT_LEN: usize = 200;

/// Marker appended to truncated excerpts.
const ELLIPSIS: &str = "...";

/// `YYYY-MM-DD` pattern in filenames and date strings.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid date regex"));

/// `:placeholder` tokens in permalink patterns.
static PERMALINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-zA-Z_]+)").expect("valid permalink regex"));

// ============================================================================
// Page
// ============================================================================

/// Positional reference to a neighbouring page in a sorted collection.
///
/// A light summary rather than the full page, so collections serialize into
/// render contexts without reference cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRef {
    pub id: String,
    pub title: String,
    pub url: String,
    pub date: Option<DateTimeUtc>,
}

/// One content document with its derived metadata.
///
/// Created once per discovered file during collection indexing (or ad hoc for
/// standalone documents) and immutable afterwards, except `next`/`previous`
/// which are threaded exactly once after the collection sort.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Raw body text with front matter removed.
    pub content: String,
    pub title: String,
    pub excerpt: String,
    /// Permalink-expanded URL; empty when no pattern is configured.
    pub url: String,
    /// Alias for `url`.
    pub permalink: String,
    /// Publication date; `None` when absent or unparseable.
    pub date: Option<DateTimeUtc>,
    /// Hierarchical `/`-delimited identifier.
    pub id: String,
    pub categories: Vec<String>,
    /// Owning collection name; empty for standalone documents. Set at
    /// construction, so collection membership is never inferred later.
    pub collection: String,
    pub tags: Vec<String>,
    /// Source directory relative to the project root, `/`-wrapped.
    pub dir: String,
    /// Full filename, e.g. `2024-03-05-my-post.md`.
    pub name: String,
    /// Absolute source path.
    pub path: PathBuf,
    /// URL-safe transliteration of the file stem.
    pub slug: String,
    /// Extension with leading dot, e.g. `.md`.
    pub ext: String,
    /// Following page in the collection's sorted order; `None` at the tail.
    pub next: Option<PageRef>,
    /// Preceding page in the collection's sorted order; `None` at the head.
    pub previous: Option<PageRef>,
}

impl Page {
    /// Derive a page from its merged configuration and source location.
    ///
    /// `merged` is the union of site config, collection config and the file's
    /// own front matter (file over collection over site); all metadata keys
    /// (`title`, `excerpt`, `permalink`, `date`, `excerpt_separator`, ...)
    /// are read from it.
    pub fn derive(
        merged: &Tree,
        body: &str,
        file_path: &Path,
        project_root: &Path,
        collection: Option<&str>,
    ) -> Self {
        let parts = split_filename(file_path);

        let title = match merged.get("title").and_then(Value::as_str) {
            Some(title) => title.to_owned(),
            None => title_from_stem(&parts.stem),
        };

        let excerpt = match merged.get("excerpt").and_then(Value::as_str) {
            Some(excerpt) => excerpt.to_owned(),
            None => derive_excerpt(merged, body),
        };

        let url = derive_url(merged, &title);

        Self {
            content: body.to_owned(),
            title,
            excerpt,
            permalink: url.clone(),
            url,
            date: derive_date(merged, &parts.stem),
            id: derive_id(&parts.stem, collection),
            categories: string_list(merged.get("categories")),
            collection: collection.unwrap_or_default().to_owned(),
            tags: string_list(merged.get("tags")),
            dir: derive_dir(file_path, project_root),
            name: parts.name,
            path: file_path.to_path_buf(),
            slug: slugify(&parts.stem),
            ext: parts.ext,
            next: None,
            previous: None,
        }
    }

    /// The positional summary other pages link to.
    pub fn page_ref(&self) -> PageRef {
        PageRef {
            id: self.id.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            date: self.date,
        }
    }
}

// ============================================================================
// Derivation Rules
// ============================================================================

/// Title from the filename: date pattern stripped, separators to spaces,
/// words title-cased.
fn title_from_stem(stem: &str) -> String {
    let without_date = DATE_RE.replace(stem, "");
    title_case(&unslug(&without_date))
}

/// Excerpt: separator cut, else configured length, else the first 200
/// characters. Counts are `char` counts, never byte offsets.
fn derive_excerpt(merged: &Tree, body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }

    if let Some(separator) = merged.get("excerpt_separator").and_then(Value::as_str)
        && !separator.is_empty()
        && body.contains(separator)
    {
        return body.split(separator).next().unwrap_or_default().to_owned();
    }

    let length = merged
        .get("excerpt_length")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .map_or(DEFAULT_EXCERPT_LEN, |n| n as usize);

    let mut excerpt: String = body.chars().take(length).collect();
    excerpt.push_str(ELLIPSIS);
    excerpt
}

/// Date: front matter wins; a filename `YYYY-MM-DD` is the fallback. An
/// unparseable value leaves the date unset rather than erroring.
fn derive_date(merged: &Tree, stem: &str) -> Option<DateTimeUtc> {
    if let Some(value) = merged.get("date") {
        return value.as_str().and_then(DateTimeUtc::parse);
    }
    DATE_RE
        .find(stem)
        .and_then(|m| DateTimeUtc::parse(m.as_str()))
}

/// URL from the permalink pattern: each `:placeholder` becomes the slugified
/// metadata value (first element for sequences, the derived title for
/// `:title`); unresolved placeholders stay verbatim so missing data is easy
/// to spot in the output.
fn derive_url(merged: &Tree, title: &str) -> String {
    let Some(pattern) = merged.get("permalink").and_then(Value::as_str) else {
        return String::new();
    };

    PERMALINK_RE
        .replace_all(pattern, |caps: &Captures| {
            let key = &caps[1];
            let text = match merged.get(key) {
                Some(Value::Array(items)) => items.first().and_then(value_text),
                Some(value) => value_text(value),
                None => None,
            };
            let text = text
                .filter(|t| !t.is_empty())
                .or_else(|| (key == "title").then(|| title.to_owned()));

            match text {
                Some(text) => slugify(&text),
                None => caps[0].to_owned(),
            }
        })
        .into_owned()
}

/// Id: `/` + `YYYY/MM/DD/` (filename date) or `<collection>/`, then the
/// stem's slug with the date pattern and leading hyphens stripped, then `/`.
fn derive_id(stem: &str, collection: Option<&str>) -> String {
    let mut id = String::from("/");

    if let Some(date) = DATE_RE.find(stem) {
        id.push_str(&date.as_str().replace('-', "/"));
        id.push('/');
    } else if let Some(collection) = collection.filter(|c| !c.is_empty()) {
        id.push_str(collection);
        id.push('/');
    }

    let rest = DATE_RE.replace(stem, "");
    id.push_str(&slugify(rest.trim_start_matches('-')));
    id.push('/');
    id
}

/// Directory relative to the project root, `/`-wrapped.
fn derive_dir(file_path: &Path, project_root: &Path) -> String {
    let parent = file_path.parent().unwrap_or(Path::new(""));
    let relative = parent.strip_prefix(project_root).unwrap_or(parent);

    let mut dir = relative.to_string_lossy().replace('\\', "/");
    if !dir.starts_with('/') {
        dir.insert(0, '/');
    }
    if !dir.ends_with('/') {
        dir.push('/');
    }
    dir
}

/// A sequence of strings, tolerating a bare string as a one-element list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Scalar metadata rendered as permalink text.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
