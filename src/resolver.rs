//! Recursive front matter resolution over layout and partial references.
//!
//! A document body may name one wrapping layout (`{% layout "base" %}`, first
//! match only) and any number of partials (`{% render "nav" %}`). Each
//! reference is located among the configured search directories, loaded,
//! split, and resolved recursively; all discovered front matter accumulates
//! into one tree. A referenced file's own front matter wins over anything its
//! nested references contribute, and the caller applies the originating
//! document's front matter last, so the invoking document always has the
//! final say.
//!
//! Failure never aborts resolution: a missing reference logs a diagnostic and
//! contributes nothing, and a reference that re-enters a file already on the
//! active resolution path is truncated there (a visited-path set travels down
//! the recursion, so cycles are detected structurally rather than by stack
//! overflow).

use crate::config::{BuildConfig, PathList};
use crate::fs::SiteFs;
use crate::log;
use crate::matter;
use crate::merge::{Tree, merge_trees};
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// `{% layout "name" %}` reference; first match only.
static LAYOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{%-?\s*layout\s+['"]([^'"]+)['"]"#).expect("valid layout regex")
});

/// `{% render "name" %}` references; all matches.
static PARTIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{%-?\s*render\s+['"]([^'"]+)['"]"#).expect("valid render regex")
});

/// Resolve all front matter reachable from `body` through layout and partial
/// references.
pub fn resolve(body: &str, config: &BuildConfig, fs: &SiteFs) -> Tree {
    resolve_body(body, config, fs, &HashSet::new())
}

/// One recursion step: layout first, then every partial.
///
/// Sibling partials load concurrently and merge in reference order, so the
/// result does not depend on I/O completion order.
fn resolve_body(body: &str, config: &BuildConfig, fs: &SiteFs, active: &HashSet<PathBuf>) -> Tree {
    let mut data = Tree::new();

    if let Some(caps) = LAYOUT_RE.captures(body) {
        let name = &caps[1];
        match find_reference(name, &config.layouts, &config.extname, fs) {
            Some(path) => data = merge_trees(&data, &resolve_file(&path, config, fs, active)),
            None => log!("resolve"; "layout not found: {name}"),
        }
    }

    let partials: Vec<&str> = PARTIAL_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    let partial_data: Vec<Tree> = partials
        .par_iter()
        .map(|name| {
            match find_reference(name, &config.partials, &config.extname, fs) {
                Some(path) => resolve_file(&path, config, fs, active),
                None => {
                    log!("resolve"; "partial not found: {name}");
                    Tree::new()
                }
            }
        })
        .collect();

    for tree in &partial_data {
        data = merge_trees(&data, tree);
    }
    data
}

/// Load one referenced file and resolve its own references.
///
/// The file's front matter overrides whatever its nested references yield.
/// Re-entering a file on the active path contributes nothing further.
fn resolve_file(path: &Path, config: &BuildConfig, fs: &SiteFs, active: &HashSet<PathBuf>) -> Tree {
    if active.contains(path) {
        log!("resolve"; "reference cycle at `{}`, truncating", path.display());
        return Tree::new();
    }

    let content = match fs.read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log!("resolve"; "cannot read `{}`: {err:#}", path.display());
            return Tree::new();
        }
    };

    let doc = matter::split(&content, path);

    let mut active = active.clone();
    active.insert(path.to_path_buf());
    let nested = resolve_body(&doc.body, config, fs, &active);

    merge_trees(&nested, &doc.data)
}

/// Find the first existing path for a reference, trying each search
/// directory in order.
fn find_reference(name: &str, dirs: &PathList, extname: &str, fs: &SiteFs) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| SiteFs::resolve(dir, name, extname))
        .find(|path| fs.exists(path))
}

// ============================================================================
// Tests
// ============================================================================
