//! Site configuration management for `hyde.toml`.
//!
//! # Sections
//!
//! | Section                | Purpose                                        |
//! |------------------------|------------------------------------------------|
//! | `[build]`              | Project root, layout/partial search dirs, extname |
//! | `[collections.<name>]` | Output flag, permalink, sort order, excerpts   |
//! | `[extra]`              | User-defined fields passed through to contexts |
//!
//! Every recognized option is enumerated here and unknown keys are rejected
//! at load time; free-form template data belongs in `[extra]` (site-wide) or
//! `[collections.<name>.extra]`, which pass through to the render context
//! unvalidated. Built-in defaults are deep-merged beneath the user's file
//! before deserialization, so a partial `hyde.toml` is always complete.
//!
//! # Example
//!
//! ```toml
//! [build]
//! root = "."
//! layouts = "_layouts"            # one path or a list
//! partials = ["_includes"]
//!
//! [collections.posts]
//! output = true
//! permalink = "/:collection/:title/"
//! order = "asc"
//!
//! [extra]
//! title = "My Site"
//! ```

pub mod defaults;
mod error;

pub use error::ConfigError;

use crate::fs::SiteFs;
use crate::merge::{self, Tree};
use anyhow::Result;
use educe::Educe;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Built-in configuration merged beneath the user's file.
const DEFAULT_CONFIG: &str = r#"
[build]
root = "."
layouts = ["_layouts"]
partials = ["_includes"]
extname = ".liquid"
"#;

// ============================================================================
// Field Types
// ============================================================================

/// One path or a list of paths.
///
/// Search directory options accept both `layouts = "_layouts"` and
/// `layouts = ["_layouts", "_shared"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PathList(pub Vec<PathBuf>);

impl PathList {
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for PathList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(PathBuf),
            Many(Vec<PathBuf>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(path) => Self(vec![path]),
            OneOrMany::Many(paths) => Self(paths),
        })
    }
}

/// Collection sort direction by date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first; pages without a date sort to the front.
    #[default]
    Asc,
    /// Newest first; pages without a date sort to the back.
    Desc,
}

// ============================================================================
// Sections
// ============================================================================

/// `[build]` section - where source files live and how references resolve.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root containing collection directories.
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: PathBuf,

    /// Layout search directories, tried in order.
    #[serde(default = "defaults::build::layouts")]
    #[educe(Default = defaults::build::layouts())]
    pub layouts: PathList,

    /// Partial search directories, tried in order.
    #[serde(default = "defaults::build::partials")]
    #[educe(Default = defaults::build::partials())]
    pub partials: PathList,

    /// Extension appended to layout/partial references that carry none.
    #[serde(default = "defaults::build::extname")]
    #[educe(Default = defaults::build::extname())]
    pub extname: String,
}

/// `[collections.<name>]` section - one named group of documents.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    /// Include member files in output unless their front matter opts in.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub output: bool,

    /// Permalink pattern with `:placeholder` tokens (e.g. `/:collection/:title/`).
    pub permalink: Option<String>,

    /// Date sort direction for the indexed collection.
    pub order: SortOrder,

    /// Excerpts end at the first occurrence of this separator.
    pub excerpt_separator: Option<String>,

    /// Excerpt character count when no separator applies.
    pub excerpt_length: Option<usize>,

    /// User-defined fields merged into every member's derivation context.
    pub extra: Tree,
}

impl CollectionConfig {
    /// The collection's contribution to the merge chain: `[extra]` plus the
    /// recognized per-page options, explicit options winning over extras.
    pub fn tree(&self) -> Tree {
        let mut tree = self.extra.clone();
        tree.insert("output".into(), Value::Bool(self.output));
        if let Some(permalink) = &self.permalink {
            tree.insert("permalink".into(), Value::String(permalink.clone()));
        }
        if let Some(separator) = &self.excerpt_separator {
            tree.insert("excerpt_separator".into(), Value::String(separator.clone()));
        }
        if let Some(length) = self.excerpt_length {
            tree.insert("excerpt_length".into(), Value::from(length));
        }
        tree
    }
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing hyde.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Named collections
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionConfig>,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: Tree,
}

impl SiteConfig {
    /// Parse configuration from a TOML string, deep-merged over the built-in
    /// defaults.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let defaults = toml_tree(DEFAULT_CONFIG)?;
        let user = toml_tree(content)?;
        let merged = merge::merge(&defaults, &user);
        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path.
    ///
    /// A missing file is not an error: the built-in defaults apply, with
    /// paths anchored at the file's directory. An existing file is read
    /// through `fs` so the host's read hook tracks it.
    pub fn load(path: &Path, fs: &SiteFs) -> Result<Self, ConfigError> {
        let mut config = if fs.exists(path) {
            let content = fs
                .read_to_string(path)
                .map_err(|err| match err.downcast::<std::io::Error>() {
                    Ok(io) => ConfigError::Io(path.to_path_buf(), io),
                    Err(_) => ConfigError::Validation(format!(
                        "config file `{}` is not valid UTF-8",
                        path.display()
                    )),
                })?;
            Self::from_str(&content)?
        } else {
            Self::default()
        };

        config.config_path = normalize_path(path);
        config.anchor_paths();
        Ok(config)
    }

    /// Validate recognized option values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.build.extname.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "[build.extname] must start with a dot, got `{}`",
                self.build.extname
            )));
        }

        for (name, collection) in &self.collections {
            if name.is_empty() || name.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "collection name `{name}` must be a single path segment"
                )));
            }
            if let Some(permalink) = &collection.permalink
                && !permalink.starts_with('/')
            {
                return Err(ConfigError::Validation(format!(
                    "[collections.{name}.permalink] must start with `/`"
                )));
            }
            if collection.excerpt_length == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "[collections.{name}.excerpt_length] must be positive"
                )));
            }
        }

        Ok(())
    }

    /// The site's contribution to the merge chain: `[extra]` plus the
    /// collection configuration under `collections`.
    pub fn site_tree(&self) -> Tree {
        let mut tree = self.extra.clone();
        let collections: Tree = self
            .collections
            .iter()
            .map(|(name, collection)| (name.clone(), Value::Object(collection.tree())))
            .collect();
        tree.insert("collections".into(), Value::Object(collections));
        tree
    }

    /// Anchor relative paths: the root at the config file's directory, the
    /// search directories at the root.
    fn anchor_paths(&mut self) {
        let base = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        if self.build.root.is_relative() {
            self.build.root = base.join(&self.build.root);
        }
        self.build.root = normalize_path(&self.build.root);

        let root = self.build.root.clone();
        for dirs in [&mut self.build.layouts, &mut self.build.partials] {
            for dir in &mut dirs.0 {
                if dir.is_relative() {
                    *dir = root.join(&*dir);
                }
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a TOML string into a JSON tree for merging.
fn toml_tree(content: &str) -> Result<Value, ConfigError> {
    let value: toml::Value = toml::from_str(content)?;
    Ok(serde_json::to_value(value)?)
}

/// Normalize a path to absolute, using canonicalize if the path exists
fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        // For non-existent paths, manually make them absolute
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
