//! # Angle Helpers
//!
//! Range reduction and sexagesimal conversion for angles held as `f64` degrees.
//!
//! ## Ranges
//!
//! Two reductions are used throughout the crate:
//! - [`normalize_0_360`] for right ascension, sidereal time and hour angles: `[0, 360)`
//! - [`normalize_pm180`] for longitudes: `(-180, 180]`, so both ±180 map to `+180`
//!
//! ## Examples
//!
//! ```rust
//! use sightfix::coordinates::angle::{hms_to_degrees, normalize_pm180};
//!
//! assert_eq!(normalize_pm180(-180.0), 180.0);
//! assert!((hms_to_degrees(13.0, 59.0, 26.16) - 209.859).abs() < 1e-9);
//! ```

use crate::constants::DEG_PER_HOUR;

/// Reduce an angle in degrees into `[0, 360)`
///
/// `rem_euclid` can return exactly 360.0 for tiny negative inputs; that case
/// folds back to 0.
pub fn normalize_0_360(degrees: f64) -> f64 {
    let reduced = degrees.rem_euclid(360.0);
    if reduced >= 360.0 {
        0.0
    } else {
        reduced
    }
}

/// Reduce an angle in degrees into `(-180, 180]`
pub fn normalize_pm180(degrees: f64) -> f64 {
    let reduced = normalize_0_360(degrees);
    if reduced > 180.0 {
        reduced - 360.0
    } else {
        reduced
    }
}

/// Hours, minutes and seconds of time to decimal hours
pub fn hms_to_decimal_hours(hours: f64, minutes: f64, seconds: f64) -> f64 {
    hours + minutes / 60.0 + seconds / 3600.0
}

/// Hours, minutes and seconds of right ascension to degrees of arc
pub fn hms_to_degrees(hours: f64, minutes: f64, seconds: f64) -> f64 {
    hms_to_decimal_hours(hours, minutes, seconds) * DEG_PER_HOUR
}

/// Signed degrees, arcminutes and arcseconds to decimal degrees
///
/// The sign is carried separately so that `-0° 30'` can be expressed.
/// Only the sign of `sign` matters.
pub fn dms_to_degrees(sign: f64, degrees: f64, minutes: f64, seconds: f64) -> f64 {
    let magnitude = degrees.abs() + minutes.abs() / 60.0 + seconds.abs() / 3600.0;
    if sign.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(360.0, 0.0)]
    #[case(-10.0, 350.0)]
    #[case(725.5, 5.5)]
    #[case(-1e-18, 0.0)]
    fn test_normalize_0_360(#[case] input: f64, #[case] expected: f64) {
        let out = normalize_0_360(input);
        assert!((0.0..360.0).contains(&out));
        assert_abs_diff_eq!(out, expected, epsilon = 1e-12);
    }

    #[rstest]
    #[case(180.0, 180.0)]
    #[case(-180.0, 180.0)]
    #[case(540.0, 180.0)]
    #[case(-540.0, 180.0)]
    #[case(190.0, -170.0)]
    #[case(-190.0, 170.0)]
    #[case(0.1, 0.1)]
    #[case(-0.1, -0.1)]
    fn test_normalize_pm180(#[case] input: f64, #[case] expected: f64) {
        assert_abs_diff_eq!(normalize_pm180(input), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_hms_conversions() {
        assert_abs_diff_eq!(hms_to_decimal_hours(1.0, 30.0, 36.0), 1.51, epsilon = 1e-12);
        assert_abs_diff_eq!(hms_to_degrees(13.0, 59.0, 26.16), 209.859, epsilon = 1e-9);
        assert_abs_diff_eq!(hms_to_degrees(24.0, 0.0, 0.0), 360.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dms_conversions() {
        assert_abs_diff_eq!(dms_to_degrees(1.0, 4.0, 58.0, 5.52), 4.968_2, epsilon = 1e-9);
        assert_abs_diff_eq!(dms_to_degrees(-1.0, 0.0, 30.0, 0.0), -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(dms_to_degrees(-0.0, 16.0, 42.0, 58.0), -16.716_111, epsilon = 1e-6);
    }
}
