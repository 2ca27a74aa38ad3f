//! Collection discovery, indexing and ordering.
//!
//! A collection is a named directory of documents under the project root.
//! Indexing enumerates its files, splits front matter, filters by the output
//! predicate, derives one [`Page`] per member over the merged site <
//! collection < file union, sorts by date, and threads `next`/`previous`
//! links through the sorted sequence.
//!
//! File reads fan out on the rayon thread pool; enumeration is pre-sorted and
//! the date sort is a stable post-step over the joined results, so the index
//! is identical regardless of I/O completion order.

use crate::config::{CollectionConfig, SortOrder};
use crate::fs::SiteFs;
use crate::log;
use crate::matter;
use crate::merge::{Tree, merge_trees};
use crate::page::Page;
use rayon::prelude::*;
use serde_json::Value;
use std::path::Path;

/// Build the ordered page index for one collection.
///
/// `site_tree` is the site-level contribution to each member's derivation
/// context. A non-existent collection directory yields an empty index.
pub fn index_collection(
    name: &str,
    config: &CollectionConfig,
    site_tree: &Tree,
    root: &Path,
    fs: &SiteFs,
) -> Vec<Page> {
    let dir = root.join(name);
    let files = fs.list_files(&dir);

    // Site < collection layers are shared by every member; the file's own
    // front matter lands on top per file.
    let mut base = merge_trees(site_tree, &config.tree());
    base.insert("collection".into(), Value::String(name.to_owned()));

    let mut pages: Vec<Page> = files
        .par_iter()
        .filter_map(|path| index_file(path, name, config, &base, root, fs))
        .collect();

    sort_by_date(&mut pages, config.order);
    thread_links(&mut pages);
    pages
}

/// Read, split and derive one collection member.
///
/// Returns `None` for members excluded from output or files that cannot be
/// read (logged, never fatal to the rest of the collection).
fn index_file(
    path: &Path,
    name: &str,
    config: &CollectionConfig,
    base: &Tree,
    root: &Path,
    fs: &SiteFs,
) -> Option<Page> {
    let content = match fs.read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log!("collection"; "skipping `{}`: {err:#}", path.display());
            return None;
        }
    };

    let doc = matter::split(&content, path);

    let in_output = config.output
        || doc
            .data
            .get("output")
            .and_then(Value::as_bool)
            .unwrap_or(false);
    if !in_output {
        return None;
    }

    let merged = merge_trees(base, &doc.data);
    Some(Page::derive(&merged, &doc.body, path, root, Some(name)))
}

/// Stable date sort; a missing date is the minimum value, so ascending order
/// puts undated pages first and descending order puts them last.
pub fn sort_by_date(pages: &mut [Page], order: SortOrder) {
    match order {
        SortOrder::Asc => pages.sort_by(|a, b| a.date.cmp(&b.date)),
        SortOrder::Desc => pages.sort_by(|a, b| b.date.cmp(&a.date)),
    }
}

/// Thread `next`/`previous` through the sorted sequence.
///
/// Must be re-run whenever the order changes; links always reflect the
/// current positions.
pub fn thread_links(pages: &mut [Page]) {
    let refs: Vec<_> = pages.iter().map(Page::page_ref).collect();
    for (i, page) in pages.iter_mut().enumerate() {
        page.previous = i.checked_sub(1).map(|prev| refs[prev].clone());
        page.next = refs.get(i + 1).cloned();
    }
}

// ============================================================================
// Tests
// ============================================================================
