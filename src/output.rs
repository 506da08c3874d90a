//! CLI output formatting.
//!
//! Output is information-first: each rendered post is listed by position and
//! title, with the file it produced as secondary context after `→`. Counts
//! for the asset stages follow, then a one-line total.
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 Fish & Chips → posts/2026-01-20-fish-and-chips/index.html
//! 002 Work in Progress (draft) → posts/2026-02-01-work-in-progress/index.html
//!
//! Static
//!     1 minified, 1 copied
//! Images
//!     2 resized, 1 re-encoded, 0 copied
//! SEO
//!     sitemap.xml, robots.txt, feed.xml
//!
//! Built 2 posts (1 draft) in 0.31s
//! Build complete: dist
//! ```
//!
//! ## New post
//!
//! ```text
//! Created: content/posts/2026-01-15-my-post.md
//! Preview: http://localhost:8080/posts/2026-01-15-my-post/
//! ```
//!
//! Each `format_*` function returns lines and does no I/O; the `print_*`
//! wrappers write them to stdout.

use crate::builder::BuildSummary;
use crate::process::ImageReport;
use crate::seo::{FEED_FILE, ROBOTS_FILE, SITEMAP_FILE};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn image_line(images: &ImageReport) -> String {
    if images.skipped {
        "    skipped (no images directory)".to_string()
    } else {
        format!(
            "    {} resized, {} re-encoded, {} copied",
            images.resized, images.reencoded, images.copied
        )
    }
}

/// Lines describing a finished build.
pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    let mut lines = vec!["Home \u{2192} index.html".to_string()];

    for (i, post) in summary.posts.iter().enumerate() {
        let marker = if post.draft { " (draft)" } else { "" };
        lines.push(format!(
            "{} {}{} \u{2192} posts/{}/index.html",
            format_index(i + 1),
            post.title,
            marker,
            post.slug
        ));
    }

    lines.push(String::new());
    lines.push("Static".to_string());
    lines.push(format!(
        "    {} minified, {} copied",
        summary.static_files.minified, summary.static_files.copied
    ));
    lines.push("Images".to_string());
    lines.push(image_line(&summary.images));
    lines.push("SEO".to_string());
    lines.push(format!("    {SITEMAP_FILE}, {ROBOTS_FILE}, {FEED_FILE}"));

    lines.push(String::new());
    let drafts = summary.drafts();
    let draft_note = if drafts > 0 {
        format!(" ({})", plural(drafts, "draft"))
    } else {
        String::new()
    };
    lines.push(format!(
        "Built {}{} in {:.2}s",
        plural(summary.posts.len(), "post"),
        draft_note,
        summary.elapsed.as_secs_f64()
    ));
    lines.push(format!("Build complete: {}", summary.dist_dir.display()));
    lines
}

pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{}", line);
    }
}

/// Browser origin for a listen address: `:8080` → `http://localhost:8080`.
pub fn preview_origin(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("http://localhost{addr}")
    } else {
        format!("http://{addr}")
    }
}

/// Lines announcing a newly scaffolded post and where to preview it.
pub fn format_new_post(path: &Path, addr: &str) -> Vec<String> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    vec![
        format!("Created: {}", path.display()),
        format!("Preview: {}/posts/{}/", preview_origin(addr), stem),
    ]
}

pub fn print_new_post(path: &Path, addr: &str) {
    for line in format_new_post(path, addr) {
        println!("{}", line);
    }
}

/// Startup banner for `serve`.
pub fn format_serve_banner(addr: &str, dist_dir: &Path) -> Vec<String> {
    vec![
        format!("Serving {} at {}", dist_dir.display(), preview_origin(addr)),
        "Watching for changes. Press Ctrl-C to stop.".to_string(),
    ]
}

pub fn print_serve_banner(addr: &str, dist_dir: &Path) {
    for line in format_serve_banner(addr, dist_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
