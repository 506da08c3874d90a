//! High-level image operations.
//!
//! These functions combine calculations with backend execution: identify the
//! source, work out the target size, then hand a [`ResizeParams`] to the
//! backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{fit_to_width, needs_resize};
use super::params::{OutputFormat, Quality, ResizeParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// What [`optimize_image`] did to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizedImage {
    pub source: (u32, u32),
    pub output: (u32, u32),
    pub resized: bool,
}

/// Re-encode `source` into `output`, scaling it down to `max_width` if wider.
///
/// The encoder is chosen from `output`'s extension.
pub fn optimize_image(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    max_width: u32,
    quality: Quality,
) -> Result<OptimizedImage> {
    let format = OutputFormat::from_path(output)
        .ok_or_else(|| BackendError::UnsupportedFormat(output.to_path_buf()))?;

    let original: (u32, u32) = backend.identify(source)?.into();
    let (width, height) = fit_to_width(original, max_width);

    backend.resize(&ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        format,
        quality,
    })?;

    Ok(OptimizedImage {
        source: original,
        output: (width, height),
        resized: needs_resize(original, max_width),
    })
}
