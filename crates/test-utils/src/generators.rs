//! Synthetic monthly pixel sums with a reservoir-like seasonal shape.
//!
//! The values mimic a monsoon-fed reservoir: lowest before the rains (May/June),
//! filling through July-August, and at capacity in September/October.

/// Water pixels for a 2 km x 2 km AOI at full capacity.
pub const FULL_RESERVOIR_PIXELS: f64 = 24_000.0;

/// Fraction of capacity per calendar month (index 0 = January).
const FILL_FRACTION: [f64; 12] = [
    0.82, 0.76, 0.68, 0.58, 0.47, 0.41, 0.63, 0.91, 1.0, 0.99, 0.95, 0.89,
];

/// Pixel sum for a calendar month (1-12). Out-of-range months return 0.
///
/// # Example
///
/// ```
/// use test_utils::reservoir_pixel_sum;
///
/// assert_eq!(reservoir_pixel_sum(9), 24_000.0);
/// assert!(reservoir_pixel_sum(6) < reservoir_pixel_sum(8));
/// assert_eq!(reservoir_pixel_sum(13), 0.0);
/// ```
pub fn reservoir_pixel_sum(month: u32) -> f64 {
    match month {
        1..=12 => FILL_FRACTION[(month - 1) as usize] * FULL_RESERVOIR_PIXELS,
        _ => 0.0,
    }
}
