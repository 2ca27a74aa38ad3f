//! Logging utilities with colored output.
//!
//! This module provides the `log!` macro for formatted diagnostics with
//! colored module prefixes. All recoverable conditions (missing layout or
//! partial references, malformed front matter, truncated reference cycles)
//! report through here and never abort context assembly.
//!
//! # Example
//!
//! ```ignore
//! log!("resolve"; "layout not found: {}", name);
//! log!("matter"; "unparseable front matter in `{}`", path.display());
//! ```

use colored::{ColoredString, Colorize};

/// Maximum diagnostic line width before truncation.
const MAX_LINE_WIDTH: usize = 120;

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;

/// Calculate total prefix length for a module name.
///
/// Returns: `module.len() + 3` (for `[`, `]`, and trailing space)
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix to stderr.
///
/// Automatically truncates long single-line messages; multiline messages
/// (e.g. parse errors with context) are printed in full.
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    if message.contains('\n') {
        eprintln!("{prefix} {message}");
        return;
    }

    let prefix_len = calc_prefix_len(module.len());
    let max_msg_len = MAX_LINE_WIDTH.saturating_sub(prefix_len);

    let message = if message.len() > max_msg_len {
        truncate_str(message, max_msg_len)
    } else {
        message
    };

    eprintln!("{prefix} {message}");
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "resolve" => prefix.bright_blue().bold(),
        "collection" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes.
///
/// Ensures the result is valid UTF-8 by finding the nearest character boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    // Find the last valid UTF-8 boundary within max_len
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Tests
// ============================================================================
