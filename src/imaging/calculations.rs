//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `source` down to at most `max_width` wide, keeping the aspect ratio.
///
/// Images already within the limit are returned unchanged; nothing is ever
/// upscaled. The new height is rounded to the nearest pixel and never drops
/// below 1.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `max_width` - Widest allowed output
///
/// # Returns
/// * `(width, height)` - Output dimensions
pub fn fit_to_width(source: (u32, u32), max_width: u32) -> (u32, u32) {
    let (w, h) = source;
    if w <= max_width {
        return source;
    }

    let height = (h as f64 * max_width as f64 / w as f64).round() as u32;
    (max_width, height.max(1))
}

/// True when the image has to be resampled to fit `max_width`.
pub fn needs_resize(source: (u32, u32), max_width: u32) -> bool {
    source.0 > max_width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_landscape_scaled_to_limit() {
        assert_eq!(fit_to_width((2400, 1600), 1200), (1200, 800));
    }

    #[test]
    fn wide_portrait_scaled_to_limit() {
        assert_eq!(fit_to_width((1600, 2400), 1200), (1200, 1800));
    }

    #[test]
    fn narrow_image_unchanged() {
        assert_eq!(fit_to_width((400, 300), 1200), (400, 300));
    }

    #[test]
    fn exact_limit_unchanged() {
        assert_eq!(fit_to_width((1200, 900), 1200), (1200, 900));
        assert!(!needs_resize((1200, 900), 1200));
    }

    #[test]
    fn one_over_limit_is_resized() {
        assert!(needs_resize((1201, 900), 1200));
        // 900 * 1200 / 1201 = 899.25
        assert_eq!(fit_to_width((1201, 900), 1200), (1200, 899));
    }

    #[test]
    fn height_rounds_to_nearest() {
        // 1999 * 1200 / 3000 = 799.6
        assert_eq!(fit_to_width((3000, 1999), 1200), (1200, 800));
    }

    #[test]
    fn extreme_panorama_keeps_one_pixel_height() {
        assert_eq!(fit_to_width((100_000, 10), 1200), (1200, 1));
    }

    #[test]
    fn aspect_ratio_preserved_within_a_pixel() {
        for (w, h) in [(4000, 3000), (3000, 4000), (1920, 1080), (5000, 1234)] {
            let (nw, nh) = fit_to_width((w, h), 1200);
            assert_eq!(nw, 1200);
            let exact = h as f64 * 1200.0 / w as f64;
            assert!((nh as f64 - exact).abs() <= 0.5, "{w}x{h} -> {nw}x{nh}");
        }
    }
}
