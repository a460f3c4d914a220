//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `known` by the source aspect ratio to get the missing side.
///
/// Computes `round(known * other_source / matching_source)` where
/// `matching_source` is the source side that `known` replaces and
/// `other_source` is the source side being derived.
///
/// Rounding is half-up (ties go away from zero), done in integer arithmetic
/// so the result is exact for any `u32` input. The result is never smaller
/// than 1 pixel.
///
/// # Examples
/// ```
/// # use image_resizer::imaging::calculations::proportional_dimension;
/// // 1600x1200 source, width fixed at 800 → height 600
/// assert_eq!(proportional_dimension(800, 1200, 1600), 600);
///
/// // 3x2 source, height fixed at 1 → width round(1.5) = 2
/// assert_eq!(proportional_dimension(1, 3, 2), 2);
/// ```
pub fn proportional_dimension(known: u32, other_source: u32, matching_source: u32) -> u32 {
    let numerator = 2 * u128::from(known) * u128::from(other_source) + u128::from(matching_source);
    let scaled = numerator
        .checked_div(2 * u128::from(matching_source))
        .unwrap_or(u128::from(known));
    scaled.clamp(1, u128::from(u32::MAX)) as u32
}

/// Whether a target box is larger than the source on either side.
pub fn exceeds_source(target: (u32, u32), source: (u32, u32)) -> bool {
    target.0 > source.0 || target.1 > source.1
}
