//! Slug derivation for posts.
//!
//! Two conventions meet here:
//!
//! - **Post slugs** come from the source filename, verbatim minus the
//!   extension: `2026-01-15-hello-world.md` → `2026-01-15-hello-world`.
//!   Filenames are assumed distinct, so slugs are unique within a build.
//! - **Title slugs** are derived when scaffolding a new post:
//!   `"My  Great   Post!"` → `"my-great-post"`.
//!
//! Both are deterministic; applying [`slugify`] to its own output is a no-op.

use std::path::Path;

/// Convert a free-form title into a URL-safe slug.
///
/// Lower-cases ASCII letters, collapses every run of characters outside
/// `[a-z0-9]` into a single hyphen, and trims leading/trailing hyphens.
/// Non-ASCII characters count as separators.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Derive a post slug from its source path: the filename minus its extension.
///
/// Returns `None` when the path has no file name (e.g. `/` or `..`).
pub fn slug_from_path(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
