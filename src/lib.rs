//! Render-context composition for liquid front-matter sites.
//!
//! This crate builds the data a template engine renders a content document
//! against: it deep-merges layered configuration, derives per-page metadata
//! (title, excerpt, date, URL, id), indexes dated collections with
//! next/previous links, and recursively collects front matter from referenced
//! layouts and partials. Template evaluation itself stays outside, behind the
//! [`TemplateRenderer`] trait.
//!
//! # Modules
//!
//! | Module       | Purpose                                            |
//! |--------------|----------------------------------------------------|
//! | `config`     | Typed `hyde.toml` configuration                    |
//! | `merge`      | Deep merge underlying every layered data source    |
//! | `matter`     | Front matter / body splitting                      |
//! | `page`       | Per-document metadata derivation                   |
//! | `collection` | Collection discovery, ordering, neighbour links    |
//! | `resolver`   | Recursive layout/partial front matter resolution   |
//! | `assembler`  | `Site`: load, assemble, hand off to the renderer   |
//! | `fs`         | Filesystem adapter with host invalidation hook     |
//!
//! # Example
//!
//! ```ignore
//! use hyde::{Site, SiteFs};
//!
//! let site = Site::load(Path::new("hyde.toml"), SiteFs::new())?;
//! let (body, context) = site.assemble(Path::new("posts/2024-03-05-hello.md"))?;
//! let html = engine.render(&body, &context)?;
//! ```

pub mod assembler;
pub mod collection;
pub mod config;
pub mod fs;
pub mod logger;
pub mod matter;
pub mod merge;
pub mod page;
pub mod resolver;
pub mod utils;

pub use assembler::{RenderError, Site, TemplateRenderer};
pub use config::{CollectionConfig, ConfigError, SiteConfig, SortOrder};
pub use fs::SiteFs;
pub use merge::{Tree, merge};
pub use page::{Page, PageRef};
pub use utils::date::DateTimeUtc;
