//! Filesystem adapter for template and collection file access.
//!
//! Narrow contract between context assembly and the host build tool:
//!
//! | Operation | Purpose |
//! |-----------|---------|
//! | `read_to_string` | read a tracked file, reporting it to the read hook |
//! | `exists` | probe candidate reference paths |
//! | `resolve` | join a reference name onto a search root, appending the default extension only when the name has none |
//! | `contains` | containment check for sandboxing template access to configured roots |
//! | `list_files` | recursive enumeration; a missing root yields an empty list |
//!
//! The read hook is how incremental hosts stay correct: every file this crate
//! reads (config, collection members, layouts, partials, documents) is
//! reported so the host can invalidate on change.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Callback invoked with every successfully read path.
pub type ReadHook = dyn Fn(&Path) + Send + Sync;

/// Filesystem access with optional read tracking.
#[derive(Default)]
pub struct SiteFs {
    read_hook: Option<Box<ReadHook>>,
}

impl fmt::Debug for SiteFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteFs")
            .field("read_hook", &self.read_hook.is_some())
            .finish()
    }
}

impl SiteFs {
    /// Create an adapter without read tracking.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an adapter that reports every successful read to `hook`.
    pub fn with_read_hook(hook: impl Fn(&Path) + Send + Sync + 'static) -> Self {
        Self {
            read_hook: Some(Box::new(hook)),
        }
    }

    /// Read a file as UTF-8, reporting the path to the read hook on success.
    pub fn read_to_string(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        if let Some(hook) = &self.read_hook {
            hook(path);
        }
        Ok(content)
    }

    /// Check whether a path exists.
    pub fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Join a reference name onto a search root.
    ///
    /// The default extension is appended only if the name has none:
    /// `resolve("_layouts", "base", ".liquid")` → `_layouts/base.liquid`,
    /// but `resolve("_layouts", "base.html", ".liquid")` → `_layouts/base.html`.
    pub fn resolve(root: &Path, name: &str, default_ext: &str) -> PathBuf {
        if Path::new(name).extension().is_none() {
            root.join(format!("{name}{default_ext}"))
        } else {
            root.join(name)
        }
    }

    /// Check whether `path` is inside `root` (component-wise).
    pub fn contains(root: &Path, path: &Path) -> bool {
        path.starts_with(root)
    }

    /// Recursively enumerate regular files under `dir`, sorted by path.
    ///
    /// A non-existent root yields an empty list rather than an error. Only
    /// files with an extension are returned (dotfiles and extensionless
    /// entries are not content). The sorted order is what makes downstream
    /// indexing reproducible regardless of I/O completion order.
    pub fn list_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let name = e.file_name().to_string_lossy();
                !name.starts_with('.') && Path::new(name.as_ref()).extension().is_some()
            })
            .map(walkdir::DirEntry::into_path)
            .collect();
        files.sort();
        files
    }
}
