//! Mathematical primitives for survey geometry.
//!
//! Order statistics for threshold calibration, compass-to-math angle
//! conversion for dead reckoning, and sequence smoothing for the mesher.

use std::f32::consts::PI;

/// Percentile of a sorted sample buffer with linear interpolation.
///
/// `index = (p / 100) * (n - 1)`, the value is a linear blend of the
/// floor/ceil ranked elements. `p` is clamped to [0, 100]; an empty
/// input returns 0.
///
/// # Example
/// ```
/// use cave_survey::core::math::percentile;
///
/// let sorted = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(percentile(&sorted, 0.0), 1.0);
/// assert_eq!(percentile(&sorted, 100.0), 4.0);
/// assert_eq!(percentile(&sorted, 50.0), 2.5);
/// ```
pub fn percentile(sorted: &[f32], p: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let p = p.clamp(0.0, 100.0);
    let idx = (p / 100.0) * (sorted.len() - 1) as f32;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let t = idx - lo as f32;
    (1.0 - t) * sorted[lo] + t * sorted[hi]
}

/// Convert a compass heading (degrees, 0 = north, clockwise) to a
/// mathematical angle in radians (0 = +x, counter-clockwise).
#[inline]
pub fn heading_to_math_rad(heading_deg: f32) -> f32 {
    (90.0 - heading_deg) * PI / 180.0
}

/// Centered moving average over a sequence.
///
/// Each output element is the mean of the input values inside a window of
/// `window` elements centered on it, truncated at the sequence ends. A
/// window of 0 or 1 returns the input unchanged.
pub fn moving_average(values: &[f32], window: usize) -> Vec<f32> {
    if window <= 1 || values.len() <= 2 {
        return values.to_vec();
    }
    let half = window / 2;
    let mut smoothed = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let a = i.saturating_sub(half);
        let b = (i + half).min(values.len() - 1);
        let sum: f32 = values[a..=b].iter().sum();
        smoothed.push(sum / (b - a + 1) as f32);
    }
    smoothed
}

/// Round to two decimal places, matching the display precision used for
/// distance and heading records.
#[inline]
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
