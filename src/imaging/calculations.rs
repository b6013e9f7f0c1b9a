//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale both edges by `percent`, keeping each edge at least one pixel.
///
/// ```text
/// (4000, 3000) at 25% → (1000, 750)
/// ```
pub fn scaled_dimensions(original: (u32, u32), percent: u32) -> (u32, u32) {
    let scale = |edge: u32| ((edge as f64 * percent as f64 / 100.0).round() as u32).max(1);
    (scale(original.0), scale(original.1))
}
