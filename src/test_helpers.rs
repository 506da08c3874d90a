//! Shared test utilities for the billiemuk test suite.
//!
//! Provides fixture setup, synthetic image writers, and lookup helpers that
//! work with parsed posts.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let paths = ProjectPaths::new(tmp.path());
//! let posts = parse_all_posts(&paths.posts_dir, false).unwrap();
//!
//! let post = find_post(&posts, "Hello World");
//! assert_eq!(post.slug, "2026-01-15-hello-world");
//! assert_eq!(post_titles(&posts), vec!["Fish & Chips <Reviewed>", "Hello World"]);
//! ```

use chrono::NaiveDate;
use image::{ImageEncoder, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::content::Post;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// The copy is a complete project root: `config.toml`, `content/posts/`,
/// `templates/` and `static/`. Tests get an isolated copy they can mutate
/// without affecting other tests or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// The site configuration matching `fixtures/site/config.toml`.
pub fn fixture_config() -> SiteConfig {
    let toml = fs::read_to_string(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site/config.toml"),
    )
    .unwrap();
    toml::from_str(&toml).unwrap()
}

// =========================================================================
// Content builders
// =========================================================================

/// Parse a `YYYY-MM-DD` literal.
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Write `<dir>/<stem>.md` with minimal front matter and a one-line body.
pub fn write_post(dir: &Path, stem: &str, title: &str, date: &str, draft: bool) {
    fs::create_dir_all(dir).unwrap();
    let src = format!(
        "---\ntitle: \"{title}\"\ndate: {date}\ndraft: {draft}\n---\n\nBody of {title}.\n"
    );
    fs::write(dir.join(format!("{stem}.md")), src).unwrap();
}

/// A post built in memory, for renderer and SEO tests.
pub fn sample_post(slug: &str, title: &str, date_str: &str) -> Post {
    Post {
        title: title.to_string(),
        date: date(date_str),
        summary: String::new(),
        draft: false,
        slug: slug.to_string(),
        html: format!("<p>{title}</p>\n"),
    }
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a gradient JPEG of the given size.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a gradient PNG of the given size.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([128, (x % 256) as u8, (y % 256) as u8])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Post lookups (panic with the available options on a miss)
// =========================================================================

/// Find a post by title. Panics if not found.
pub fn find_post<'a>(posts: &'a [Post], title: &str) -> &'a Post {
    posts.iter().find(|p| p.title == title).unwrap_or_else(|| {
        let titles = post_titles(posts);
        panic!("post '{title}' not found. Available: {titles:?}")
    })
}

/// Titles in list order.
pub fn post_titles(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}

/// Read a file under `root`. Panics with the directory listing on miss.
pub fn read_output(root: &Path, rel: &str) -> String {
    let path = root.join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| {
        let parent = path.parent().unwrap_or(root);
        let listing: Vec<String> = fs::read_dir(parent)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        panic!("cannot read {rel}: {e}. {} contains: {listing:?}", parent.display())
    })
}
