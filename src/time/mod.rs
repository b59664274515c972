//! Time module for sight reduction
//!
//! This module turns a UTC observation instant into the angular time references
//! needed to reduce a sight: the Julian Day, Greenwich Mean Sidereal Time (GMST)
//! and Local Sidereal Time (LST).
//!
//! The Julian Day follows the Gregorian-calendar algorithm from Meeus,
//! *Astronomical Algorithms* ch. 7, with the time of day carried in the
//! fractional part. It is valid for any date from 1582-10-15 onward.

use crate::constants::{
    DAY_H, GMST_AT_J2000_DEG, GMST_RATE_DEG_PER_DAY, GMST_T2_DEG, GMST_T3_DIVISOR, J2000,
    JULIAN_CENTURY_DAYS,
};
use crate::coordinates::angle::normalize_0_360;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// Naive timestamp layouts accepted by [`Instant::parse`], all read as UTC.
/// `%.f` consumes an optional fractional second.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// A UTC observation instant with sub-second precision
///
/// Serialized as an RFC 3339 string; deserialized with the same rules as
/// [`Instant::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Instant(DateTime<Utc>);

impl Instant {
    /// Wrap a chrono UTC datetime
    pub fn new(utc: DateTime<Utc>) -> Self {
        Self(utc)
    }

    /// Build an instant from UTC calendar fields
    ///
    /// `second` may carry a fraction; it is rounded to the nearest nanosecond.
    pub fn from_utc(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: f64,
    ) -> Result<Self> {
        if !second.is_finite() || !(0.0..60.0).contains(&second) {
            return Err(TimeError::OutOfRange(format!("second {}", second)));
        }
        let whole = second.trunc();
        let nano = ((second - whole) * 1e9).round().min(999_999_999.0) as u32;

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_nano_opt(hour, minute, whole as u32, nano))
            .map(|naive| Self(naive.and_utc()))
            .ok_or_else(|| {
                TimeError::OutOfRange(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{}",
                    year, month, day, hour, minute, second
                ))
            })
    }

    /// Parse a timestamp string
    ///
    /// Accepts `YYYY-MM-DD HH:MM:SS[.fff]` (space or `T` separator, read as
    /// UTC) and RFC 3339 strings carrying an offset, which are converted to UTC.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|naive| Self(naive.and_utc()))
            .ok_or_else(|| TimeError::InvalidFormat(format!("'{}'", text)))
    }

    /// The wrapped UTC datetime
    pub fn utc(&self) -> DateTime<Utc> {
        self.0
    }

    /// Julian Day of this instant
    pub fn julian_day(&self) -> f64 {
        julian_day(self)
    }

    /// Greenwich Mean Sidereal Time of this instant, degrees in [0, 360)
    pub fn gmst_deg(&self) -> f64 {
        gmst_deg(self.julian_day())
    }
}

impl FromStr for Instant {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Instant {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Instant> for String {
    fn from(instant: Instant) -> Self {
        instant.to_string()
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::new(dt)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.fZ"))
    }
}

/// Julian Day of a UTC instant
pub fn julian_day(instant: &Instant) -> f64 {
    let dt = instant.utc();
    let ut_hours = dt.hour() as f64
        + dt.minute() as f64 / 60.0
        + (dt.second() as f64 + dt.nanosecond() as f64 / 1e9) / 3600.0;

    julian_day_from_calendar(dt.year(), dt.month(), dt.day(), ut_hours)
}

/// Julian Day from a Gregorian calendar date and the UT time of day in hours
///
/// January and February count as months 13 and 14 of the previous year.
pub fn julian_day_from_calendar(year: i32, month: u32, day: u32, ut_hours: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (year - 1, month as i32 + 12)
    } else {
        (year, month as i32)
    };

    let a = y.div_euclid(100);
    let b = 2 - a + a.div_euclid(4);

    (365.25 * (y + 4716) as f64).floor() + (30.6001 * (m + 1) as f64).floor()
        + day as f64
        + ut_hours / DAY_H
        + b as f64
        - 1524.5
}

/// Greenwich Mean Sidereal Time in degrees, reduced into [0, 360)
///
/// IAU 1982 polynomial in days and Julian centuries since J2000.0.
pub fn gmst_deg(jd: f64) -> f64 {
    let d = jd - J2000;
    let t = d / JULIAN_CENTURY_DAYS;

    normalize_0_360(
        GMST_AT_J2000_DEG + GMST_RATE_DEG_PER_DAY * d + GMST_T2_DEG * t * t
            - t * t * t / GMST_T3_DIVISOR,
    )
}

/// Local Sidereal Time in degrees, reduced into [0, 360)
///
/// `longitude_east_deg` must be east-positive. The rest of the crate keeps
/// longitude west-positive, so callers negate before calling.
pub fn local_sidereal_time_deg(gmst_deg: f64, longitude_east_deg: f64) -> f64 {
    normalize_0_360(gmst_deg + longitude_east_deg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn test_julian_day_at_j2000() {
        let instant = Instant::from_utc(2000, 1, 1, 12, 0, 0.0).unwrap();
        assert_abs_diff_eq!(instant.julian_day(), J2000, epsilon = 1e-9);
    }

    #[rstest]
    #[case(2024, 1, 1, 0.0, 2_460_310.5)]
    #[case(2024, 2, 29, 0.0, 2_460_369.5)]
    #[case(2020, 1, 1, 12.0, 2_458_850.0)]
    #[case(1969, 7, 20, 0.0, 2_440_422.5)]
    #[case(1582, 10, 15, 0.0, 2_299_160.5)]
    fn test_julian_day_known_dates(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] hours: f64,
        #[case] expected: f64,
    ) {
        assert_abs_diff_eq!(
            julian_day_from_calendar(year, month, day, hours),
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_julian_day_carries_sub_seconds() {
        let instant = Instant::parse("2025-05-17 21:59:31.250").unwrap();
        assert_abs_diff_eq!(instant.julian_day(), 2_460_813.416_333_912, epsilon = 1e-8);
    }

    #[test]
    fn test_gmst_at_j2000() {
        assert_abs_diff_eq!(gmst_deg(J2000), 280.460_618_37, epsilon = 1e-9);
    }

    #[test]
    fn test_gmst_new_year_2024() {
        let instant = Instant::from_utc(2024, 1, 1, 0, 0, 0.0).unwrap();
        // 6h 40m 36.6s
        assert_abs_diff_eq!(instant.gmst_deg(), 100.152_63, epsilon = 1e-3);
    }

    #[rstest]
    #[case(2_451_545.0)]
    #[case(2_460_310.5)]
    #[case(2_460_813.416_331)]
    #[case(2_299_160.5)]
    #[case(2_488_069.5)]
    fn test_gmst_range(#[case] jd: f64) {
        let gmst = gmst_deg(jd);
        assert!((0.0..360.0).contains(&gmst), "gmst {} out of range", gmst);
    }

    #[test]
    fn test_gmst_is_continuous_away_from_wrap() {
        // One minute of time advances GMST by ~0.2507 degrees
        let jd = 2_460_310.5;
        let step = 1.0 / 1440.0;
        let mut previous = gmst_deg(jd);
        for i in 1..=1440 {
            let current = gmst_deg(jd + i as f64 * step);
            let mut delta = current - previous;
            if delta < 0.0 {
                delta += 360.0;
            }
            assert_abs_diff_eq!(delta, GMST_RATE_DEG_PER_DAY * step, epsilon = 1e-6);
            previous = current;
        }
    }

    #[rstest]
    #[case(100.0, 10.0, 110.0)]
    #[case(10.0, -20.0, 350.0)]
    #[case(350.0, 20.0, 10.0)]
    #[case(0.0, -180.0, 180.0)]
    fn test_local_sidereal_time(#[case] gmst: f64, #[case] lon_east: f64, #[case] expected: f64) {
        assert_abs_diff_eq!(local_sidereal_time_deg(gmst, lon_east), expected, epsilon = 1e-12);
    }

    #[rstest]
    #[case("2025-05-17 21:59:31")]
    #[case("2025-05-17 21:59:31.000")]
    #[case("2025-05-17T21:59:31")]
    #[case("2025-05-17T21:59:31Z")]
    #[case("2025-05-17T23:59:31+02:00")]
    fn test_parse_accepted_layouts(#[case] text: &str) {
        let expected = Utc.with_ymd_and_hms(2025, 5, 17, 21, 59, 31).unwrap();
        assert_eq!(Instant::parse(text).unwrap().utc(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("17/05/2025 21:59:31")]
    #[case("2025-13-01 00:00:00")]
    #[case("not a time")]
    fn test_parse_rejects_garbage(#[case] text: &str) {
        assert!(matches!(
            Instant::parse(text),
            Err(TimeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_from_utc_rejects_impossible_dates() {
        assert!(matches!(
            Instant::from_utc(2023, 2, 29, 0, 0, 0.0),
            Err(TimeError::OutOfRange(_))
        ));
        assert!(Instant::from_utc(2023, 1, 1, 0, 0, 60.0).is_err());
        assert!(Instant::from_utc(2023, 1, 1, 0, 0, f64::NAN).is_err());
    }

    #[test]
    fn test_from_utc_fractional_second() {
        let instant = Instant::from_utc(2025, 5, 17, 21, 59, 31.25).unwrap();
        assert_eq!(instant.utc().nanosecond(), 250_000_000);
    }

    #[test]
    fn test_display_and_serde_round_trip() {
        let instant = Instant::from_utc(2025, 5, 17, 21, 59, 31.5).unwrap();
        assert_eq!(instant.to_string(), "2025-05-17T21:59:31.500Z");

        let json = serde_json::to_string(&instant).unwrap();
        assert_eq!(json, "\"2025-05-17T21:59:31.500Z\"");
        let back: Instant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, instant);
    }
}
