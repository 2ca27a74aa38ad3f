//! Front matter extraction.
//!
//! Splits a document into its YAML front matter block and the remaining body.
//! Malformed metadata never fails a document: the block is treated as absent
//! (with a diagnostic), the delimiters are still stripped, and the document
//! renders with an empty front matter tree.

use crate::log;
use crate::merge::Tree;
use gray_matter::{Matter, engine::YAML};
use serde_json::Value;
use std::path::Path;

/// A document split into front matter and body.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Parsed front matter; empty when absent or unparseable.
    pub data: Tree,
    /// Document content with the front matter block removed.
    pub body: String,
}

/// Split `content` into front matter and body.
///
/// `origin` is only used for diagnostics. Three degraded cases all yield an
/// empty tree rather than an error:
/// - no front matter block at all
/// - a block that is not valid YAML
/// - a block whose top level is not a mapping
pub fn split(content: &str, origin: &Path) -> Document {
    let matter = Matter::<YAML>::new();

    match matter.parse::<Value>(content) {
        Ok(parsed) => {
            let body = parsed.content;
            let data = match parsed.data {
                Some(Value::Object(map)) => map,
                Some(_) => {
                    log!(
                        "matter";
                        "front matter in `{}` is not a mapping, ignoring it",
                        origin.display()
                    );
                    Tree::new()
                }
                None => Tree::new(),
            };
            Document { data, body }
        }
        Err(err) => {
            log!(
                "matter";
                "unparseable front matter in `{}`, rendering without metadata: {err}",
                origin.display()
            );
            Document {
                data: Tree::new(),
                body: strip_raw_block(content).to_string(),
            }
        }
    }
}

/// Strip a `---` delimited head block without parsing it.
///
/// Fallback used when the YAML inside the block is malformed: the body must
/// still come out clean. Returns the input unchanged when no complete block
/// is found.
fn strip_raw_block(content: &str) -> &str {
    let Some(first_delim) = content.find("---") else {
        return content;
    };

    // The block must start at the beginning (possibly after whitespace).
    if !content[..first_delim].trim().is_empty() {
        return content;
    }

    let after_first = first_delim + 3;
    let Some(line_end) = content[after_first..].find('\n') else {
        return content;
    };
    let block_start = after_first + line_end + 1;

    let Some(closing) = content[block_start..].find("---") else {
        return content;
    };
    let after_closing = block_start + closing + 3;

    match content[after_closing..].find('\n') {
        Some(pos) => &content[after_closing + pos + 1..],
        None => "",
    }
}
