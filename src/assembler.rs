//! Render context assembly.
//!
//! `Site` is the top-level orchestrator: it loads the configuration, builds
//! every collection index up front, and assembles the final context for each
//! document by merging, in increasing precedence:
//!
//! ```text
//! site tree  <  collection config  <  resolved layout/partial data  <  own front matter
//! ```
//!
//! The document's own front matter is additionally nested under the `page`
//! key, and the full site tree (configuration plus indexed collections) under
//! `site`, so templates can address both the precedence-merged view and the
//! explicit ones.
//!
//! Rendering itself is delegated to an external [`TemplateRenderer`]; this
//! crate never interprets template expressions. A renderer failure is fatal
//! for that one document only and surfaces as a [`RenderError`] carrying the
//! source path and cause.

use crate::collection::index_collection;
use crate::config::{CollectionConfig, SiteConfig};
use crate::fs::SiteFs;
use crate::matter;
use crate::merge::{Tree, merge_trees};
use crate::resolver;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// External template engine consuming a document body and its context.
pub trait TemplateRenderer {
    fn render(&self, body: &str, context: &Tree) -> Result<String>;
}

/// A document that could not be rendered.
///
/// The one error category that propagates per document; everything else
/// (missing references, malformed front matter, cycles) degrades locally.
#[derive(Debug, Error)]
#[error("failed to render `{path}`")]
pub struct RenderError {
    pub path: PathBuf,
    #[source]
    pub source: anyhow::Error,
}

/// A loaded site: configuration plus fully built collection indices.
///
/// Indices are built once at load time and only read afterwards; per-document
/// assembly shares no mutable state, so documents can be processed from any
/// thread.
#[derive(Debug)]
pub struct Site {
    config: SiteConfig,
    site_tree: Tree,
    fs: SiteFs,
}

impl Site {
    /// Load configuration from `config_path` and index every collection.
    ///
    /// A missing config file falls back to the built-in defaults; a present
    /// but invalid one is a load error.
    pub fn load(config_path: &Path, fs: SiteFs) -> Result<Self> {
        let config = SiteConfig::load(config_path, &fs)?;

        // Collections derive against the configuration tree alone, then the
        // indexed pages are added under their names so every later document
        // sees the complete site.
        let base_tree = config.site_tree();
        let mut site_tree = base_tree.clone();
        for (name, collection_config) in &config.collections {
            let pages = index_collection(
                name,
                collection_config,
                &base_tree,
                &config.build.root,
                &fs,
            );
            site_tree.insert(name.clone(), serde_json::to_value(pages)?);
        }

        Ok(Self {
            config,
            site_tree,
            fs,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The site tree handed to contexts: configuration plus indexed pages.
    pub fn site_tree(&self) -> &Tree {
        &self.site_tree
    }

    /// The collection a document belongs to, by directory containment under
    /// the configured root.
    pub fn collection_for(&self, path: &Path) -> Option<(&str, &CollectionConfig)> {
        self.config.collections.iter().find_map(|(name, config)| {
            let dir = self.config.build.root.join(name);
            SiteFs::contains(&dir, path).then_some((name.as_str(), config))
        })
    }

    /// Read a document and assemble its render context.
    pub fn assemble(&self, path: &Path) -> Result<(String, Tree)> {
        let content = self.fs.read_to_string(path)?;
        Ok(self.assemble_source(path, &content))
    }

    /// Assemble the context for already-loaded document content.
    ///
    /// Returns the front-matter-free body together with the merged context.
    pub fn assemble_source(&self, path: &Path, content: &str) -> (String, Tree) {
        let doc = matter::split(content, path);

        let mut context = self.site_tree.clone();
        context.insert("site".into(), Value::Object(self.site_tree.clone()));

        if let Some((_, collection_config)) = self.collection_for(path) {
            context = merge_trees(&context, &collection_config.tree());
        }

        let dependency_data = resolver::resolve(&doc.body, &self.config.build, &self.fs);
        context = merge_trees(&context, &dependency_data);

        context = merge_trees(&context, &doc.data);
        context.insert("page".into(), Value::Object(doc.data));

        (doc.body, context)
    }

    /// Assemble and render one document through the external renderer.
    pub fn render_page(
        &self,
        path: &Path,
        renderer: &dyn TemplateRenderer,
    ) -> Result<String, RenderError> {
        let (body, context) = self.assemble(path).map_err(|source| RenderError {
            path: path.to_path_buf(),
            source,
        })?;

        renderer
            .render(&body, &context)
            .map_err(|source| RenderError {
                path: path.to_path_buf(),
                source,
            })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    /// Renderer stub echoing selected context keys.
    struct EchoRenderer;

    impl TemplateRenderer for EchoRenderer {
        fn render(&self, body: &str, context: &Tree) -> Result<String> {
            let title = context
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default();
            Ok(format!("{title}|{}", body.trim()))
        }
    }

    /// Renderer stub that always fails.
    struct FailingRenderer;

    impl TemplateRenderer for FailingRenderer {
        fn render(&self, _body: &str, _context: &Tree) -> Result<String> {
            Err(anyhow!("undefined variable `ghost`"))
        }
    }

    fn build_site(dir: &TempDir) -> Site {
        let config_path = dir.path().join("hyde.toml");
        fs::write(
            &config_path,
            r#"
            [collections.posts]
            output = true
            permalink = "/:collection/:title/"

            [extra]
            title = "Site Title"
            langs = ["en"]
        "#,
        )
        .unwrap();

        fs::create_dir_all(dir.path().join("posts")).unwrap();
        fs::write(
            dir.path().join("posts/2024-01-01-first.md"),
            "---\ntitle: First\n---\nfirst body",
        )
        .unwrap();
        fs::write(
            dir.path().join("posts/2024-02-01-second.md"),
            "---\ntitle: Second\n---\nsecond body",
        )
        .unwrap();

        fs::create_dir_all(dir.path().join("_layouts")).unwrap();
        fs::write(
            dir.path().join("_layouts/base.liquid"),
            "---\nlang: en\nlangs: [\"de\"]\n---\n<html>{{ content }}</html>",
        )
        .unwrap();

        Site::load(&config_path, SiteFs::new()).unwrap()
    }

    #[test]
    fn test_collections_indexed_at_load() {
        let dir = TempDir::new().unwrap();
        let site = build_site(&dir);

        let posts = site.site_tree()["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0]["title"], "First");
        assert_eq!(posts[1]["title"], "Second");
        assert_eq!(posts[0]["next"]["title"], "Second");
        assert_eq!(posts[1]["previous"]["title"], "First");
        assert_eq!(posts[0]["url"], "/posts/first/");
    }

    #[test]
    fn test_context_precedence_and_page_key() {
        let dir = TempDir::new().unwrap();
        let site = build_site(&dir);

        let doc = dir.path().join("page.liquid");
        fs::write(
            &doc,
            "---\ntitle: Own Title\n---\n{% layout \"base\" %}\nhello",
        )
        .unwrap();

        let (body, context) = site.assemble(&doc).unwrap();

        assert!(body.contains("hello"));
        assert!(!body.contains("Own Title"));

        // Own front matter wins at top level regardless of site/layout values
        assert_eq!(context["title"], "Own Title");
        // Layout data visible where the document is silent
        assert_eq!(context["lang"], "en");
        // Sequence-valued keys union instead of overriding
        assert_eq!(context["langs"], json!(["en", "de"]));
        // Own front matter also nested under `page`
        assert_eq!(context["page"], json!({"title": "Own Title"}));
        // Full site view nested under `site`
        assert_eq!(context["site"]["title"], "Site Title");
        assert_eq!(context["site"]["posts"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_collection_layer_applies_to_members() {
        let dir = TempDir::new().unwrap();
        let site = build_site(&dir);

        let member = dir
            .path()
            .canonicalize()
            .unwrap()
            .join("posts/2024-01-01-first.md");
        let (_, context) = site.assemble(&member).unwrap();

        // The collection's permalink reaches the member's context
        assert_eq!(context["permalink"], "/:collection/:title/");
        assert!(site.collection_for(&member).is_some());
    }

    #[test]
    fn test_standalone_document_has_no_collection_layer() {
        let dir = TempDir::new().unwrap();
        let site = build_site(&dir);

        let doc = dir.path().canonicalize().unwrap().join("about.liquid");
        fs::write(&doc, "body only").unwrap();

        assert!(site.collection_for(&doc).is_none());
        let (_, context) = site.assemble(&doc).unwrap();
        assert!(!context.contains_key("permalink"));
    }

    #[test]
    fn test_missing_layout_still_assembles() {
        let dir = TempDir::new().unwrap();
        let site = build_site(&dir);

        let doc = dir.path().join("broken.liquid");
        fs::write(&doc, "---\ntitle: Broken\n---\n{% layout \"ghost\" %}\nstill here").unwrap();

        let (body, context) = site.assemble(&doc).unwrap();
        assert!(body.contains("still here"));
        assert_eq!(context["title"], "Broken");
    }

    #[test]
    fn test_render_page() {
        let dir = TempDir::new().unwrap();
        let site = build_site(&dir);

        let doc = dir.path().join("page.liquid");
        fs::write(&doc, "---\ntitle: T\n---\nbody").unwrap();

        let rendered = site.render_page(&doc, &EchoRenderer).unwrap();
        assert_eq!(rendered, "T|body");
    }

    #[test]
    fn test_render_failure_carries_path_and_cause() {
        let dir = TempDir::new().unwrap();
        let site = build_site(&dir);

        let doc = dir.path().join("page.liquid");
        fs::write(&doc, "body").unwrap();

        let err = site.render_page(&doc, &FailingRenderer).unwrap_err();
        assert_eq!(err.path, doc);
        assert!(err.source.to_string().contains("ghost"));
    }

    #[test]
    fn test_load_without_config_file() {
        let dir = TempDir::new().unwrap();
        let site = Site::load(&dir.path().join("hyde.toml"), SiteFs::new()).unwrap();

        let doc = dir.path().join("plain.liquid");
        fs::write(&doc, "just a body").unwrap();

        let (body, context) = site.assemble(&doc).unwrap();
        assert_eq!(body, "just a body");
        assert_eq!(context["page"], json!({}));
    }

    #[test]
    fn test_document_reads_reported_to_hook() {
        use std::sync::{Arc, Mutex};

        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("hyde.toml");
        fs::write(&config_path, "").unwrap();

        fs::create_dir_all(dir.path().join("_layouts")).unwrap();
        fs::write(dir.path().join("_layouts/base.liquid"), "---\nx: 1\n---\ny").unwrap();

        let doc = dir.path().join("page.liquid");
        fs::write(&doc, "{% layout \"base\" %}").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let fs_adapter = SiteFs::with_read_hook(move |p: &Path| {
            seen_clone.lock().unwrap().push(p.to_path_buf());
        });

        let site = Site::load(&config_path, fs_adapter).unwrap();
        let _ = site.assemble(&doc).unwrap();

        let reported = seen.lock().unwrap().clone();
        assert!(reported.contains(&config_path));
        assert!(reported.contains(&doc));
        assert!(
            reported
                .iter()
                .any(|p| p.ends_with("_layouts/base.liquid"))
        );
    }
}
