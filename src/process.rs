//! Static assets and images.
//!
//! Stage 3 of the build. Two tree copies from the source directories into
//! parallel locations under `dist/`:
//!
//! ```text
//! static/                      dist/static/
//! ├── css/theme.css      →     ├── css/theme.min.css     # minified
//! ├── css/vendor.min.css →     ├── css/vendor.min.css    # already minified, copied
//! └── favicon.ico        →     └── favicon.ico           # copied
//!
//! content/images/              dist/images/
//! ├── hero.jpg (2400w)   →     ├── hero.jpg  (1200w, q85)
//! ├── diagram.png (800w) →     ├── diagram.png (800w, re-encoded)
//! └── logo.svg           →     └── logo.svg              # copied
//! ```
//!
//! ## Stylesheets
//!
//! Minified with [lightningcss](https://docs.rs/lightningcss): comments and
//! whitespace removed, colours and units shortened, rules merged. Input it
//! cannot parse is a [`ProcessError::Minify`].
//!
//! ## Images
//!
//! JPEG and PNG are decoded, scaled down to [`MAX_IMAGE_WIDTH`] if wider, and
//! re-encoded (JPEG at [`JPEG_QUALITY`], PNG lossless). Everything else is
//! copied byte-for-byte. A missing images directory is skipped.
//!
//! Images are encoded in parallel using [rayon](https://docs.rs/rayon); the
//! first failure aborts the stage.

use crate::imaging::{BackendError, ImageBackend, OutputFormat, Quality, optimize_image};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Images wider than this are scaled down to it.
pub const MAX_IMAGE_WIDTH: u32 = 1200;

/// Encoding quality for JPEG output.
pub const JPEG_QUALITY: u32 = 85;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot minify {path}: {source}")]
    Minify {
        path: PathBuf,
        #[source]
        source: CssError,
    },
    #[error("cannot process image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Stylesheet rejected by the minifier.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct CssError(String);

/// What [`process_static`] wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StaticReport {
    pub minified: usize,
    pub copied: usize,
}

/// What [`process_images`] wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageReport {
    /// Wider than [`MAX_IMAGE_WIDTH`], scaled down.
    pub resized: usize,
    /// Re-encoded at the original size.
    pub reencoded: usize,
    /// Not JPEG or PNG, copied verbatim.
    pub copied: usize,
    /// The source directory did not exist.
    pub skipped: bool,
}

/// Minify a stylesheet.
pub fn minify_css(css: &str) -> Result<String, CssError> {
    let mut sheet =
        StyleSheet::parse(css, ParserOptions::default()).map_err(|e| CssError(e.to_string()))?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| CssError(e.to_string()))?;
    let out = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| CssError(e.to_string()))?;
    Ok(out.code)
}

/// Output name for a stylesheet: `theme.css` → `theme.min.css`.
///
/// Returns `None` for files that are not stylesheets or are already
/// minified (`*.min.css`).
fn minified_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let lower = name.to_ascii_lowercase();
    if !lower.ends_with(".css") || lower.ends_with(".min.css") {
        return None;
    }
    let stem = &name[..name.len() - ".css".len()];
    Some(format!("{stem}.min.css"))
}

/// Every regular file under `dir`, as (absolute, relative) pairs in walk order.
fn collect_files(dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>, ProcessError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ProcessError::Read {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path().to_path_buf();
        let rel = path.strip_prefix(dir).unwrap_or(&path).to_path_buf();
        files.push((path, rel));
    }
    Ok(files)
}

fn ensure_parent(path: &Path) -> Result<(), ProcessError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ProcessError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> Result<(), ProcessError> {
    ensure_parent(to)?;
    fs::copy(from, to).map_err(|source| ProcessError::Write {
        path: to.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Mirror `static_dir` into `out_dir`, minifying stylesheets.
pub fn process_static(static_dir: &Path, out_dir: &Path) -> Result<StaticReport, ProcessError> {
    if !static_dir.is_dir() {
        return Err(ProcessError::Read {
            path: static_dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
        });
    }

    let mut report = StaticReport::default();
    for (path, rel) in collect_files(static_dir)? {
        match minified_name(&path) {
            Some(name) => {
                let css = fs::read_to_string(&path).map_err(|source| ProcessError::Read {
                    path: path.clone(),
                    source,
                })?;
                let minified = minify_css(&css).map_err(|source| ProcessError::Minify {
                    path: path.clone(),
                    source,
                })?;
                let dest = out_dir.join(&rel).with_file_name(name);
                ensure_parent(&dest)?;
                fs::write(&dest, minified).map_err(|source| ProcessError::Write {
                    path: dest.clone(),
                    source,
                })?;
                tracing::debug!(file = %rel.display(), "Minified stylesheet");
                report.minified += 1;
            }
            None => {
                copy_file(&path, &out_dir.join(&rel))?;
                report.copied += 1;
            }
        }
    }

    Ok(report)
}

enum ImageOutcome {
    Resized,
    Reencoded,
    Copied,
}

fn process_one_image(
    backend: &impl ImageBackend,
    path: &Path,
    dest: &Path,
) -> Result<ImageOutcome, ProcessError> {
    ensure_parent(dest)?;

    if OutputFormat::from_path(path).is_none() {
        copy_file(path, dest)?;
        return Ok(ImageOutcome::Copied);
    }

    let result = optimize_image(
        backend,
        path,
        dest,
        MAX_IMAGE_WIDTH,
        Quality::new(JPEG_QUALITY),
    )
    .map_err(|source| ProcessError::Image {
        path: path.to_path_buf(),
        source,
    })?;

    if result.resized {
        tracing::debug!(
            file = %path.display(),
            from = ?result.source,
            to = ?result.output,
            "Resized image"
        );
        Ok(ImageOutcome::Resized)
    } else {
        Ok(ImageOutcome::Reencoded)
    }
}

/// Mirror `images_dir` into `out_dir`, resizing and re-encoding JPEG/PNG.
pub fn process_images(
    backend: &impl ImageBackend,
    images_dir: &Path,
    out_dir: &Path,
) -> Result<ImageReport, ProcessError> {
    if !images_dir.exists() {
        tracing::debug!(dir = %images_dir.display(), "No images directory, skipping");
        return Ok(ImageReport {
            skipped: true,
            ..ImageReport::default()
        });
    }

    let files = collect_files(images_dir)?;
    let outcomes: Vec<ImageOutcome> = files
        .par_iter()
        .map(|(path, rel)| process_one_image(backend, path, &out_dir.join(rel)))
        .collect::<Result<_, _>>()?;

    let mut report = ImageReport::default();
    for outcome in outcomes {
        match outcome {
            ImageOutcome::Resized => report.resized += 1,
            ImageOutcome::Reencoded => report.reencoded += 1,
            ImageOutcome::Copied => report.copied += 1,
        }
    }
    Ok(report)
}
