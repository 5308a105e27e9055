//! Numeric conversion helpers centralizing the crate's float/integer casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it to the u64 range, returning 0 for non-finite or
/// negative values.
#[must_use]
pub fn round_f64_to_u64(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    cast::<f64, u64>(value.min(max).round()).unwrap_or(u64::MAX)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(f64::MAX)
}

/// Simulation seconds covered by one step of `base` seconds at `scale`.
#[must_use]
pub fn scaled_seconds(base: u64, scale: f64) -> u64 {
    round_f64_to_u64(u64_to_f64(base) * scale)
}

/// `current / maximum` as a fraction in `0.0..=1.0`; 0 when `maximum` is not
/// positive.
#[must_use]
pub fn ratio_f32(current: i32, maximum: i32) -> f32 {
    if maximum <= 0 {
        return 0.0;
    }
    let ratio = f64::from(current.clamp(0, maximum)) / f64::from(maximum);
    cast::<f64, f32>(ratio).unwrap_or(0.0)
}
