//! Horizon geometry: hour angles and the computed altitude/azimuth of a body
//!
//! Solves the navigational (PZX) triangle for an observer at a given
//! latitude, returning the altitude Hc and true azimuth Zn of a body with
//! declination `dec` and local hour angle `lha`.
//!
//! Near the zenith or the celestial poles both arguments of the azimuth
//! `atan2` approach zero and the azimuth becomes ill-defined. That zone is
//! accepted as is; the altitude stays well defined thanks to the clamp before
//! `asin`.

use crate::constants::{DEG2RAD, RAD2DEG};
use crate::coordinates::angle::normalize_0_360;
use serde::{Deserialize, Serialize};

/// Computed altitude and true azimuth of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonPosition {
    /// Computed altitude (Hc) in degrees, [-90, 90]
    pub altitude_deg: f64,
    /// True azimuth (Zn) in degrees from north through east, [0, 360)
    pub azimuth_deg: f64,
}

/// Local Hour Angle in degrees, measured westward, in [0, 360)
pub fn local_hour_angle_deg(lst_deg: f64, ra_deg: f64) -> f64 {
    normalize_0_360(lst_deg - ra_deg)
}

/// Meridian angle (pole angle P) in degrees, [0, 180]
///
/// Sight-reduction tables tabulate against this angle; the altitude/azimuth
/// solution below works from the LHA directly.
pub fn pole_angle_deg(lha_deg: f64) -> f64 {
    if lha_deg <= 180.0 {
        lha_deg
    } else {
        360.0 - lha_deg
    }
}

/// Altitude and azimuth of a body for an observer at `latitude_deg`
///
/// ```text
/// sin(Hc) = sin(lat)·sin(dec) + cos(lat)·cos(dec)·cos(LHA)
/// Zn      = atan2(−cos(dec)·sin(LHA), sin(dec)·cos(lat) − cos(dec)·sin(lat)·cos(LHA))
/// ```
pub fn altitude_azimuth_deg(latitude_deg: f64, declination_deg: f64, lha_deg: f64) -> HorizonPosition {
    let (sin_lat, cos_lat) = (latitude_deg * DEG2RAD).sin_cos();
    let (sin_dec, cos_dec) = (declination_deg * DEG2RAD).sin_cos();
    let (sin_lha, cos_lha) = (lha_deg * DEG2RAD).sin_cos();

    // Rounding can push the sum just past ±1 at the zenith or nadir
    let sin_alt = (sin_lat * sin_dec + cos_lat * cos_dec * cos_lha).clamp(-1.0, 1.0);

    let y = -cos_dec * sin_lha;
    let x = sin_dec * cos_lat - cos_dec * sin_lat * cos_lha;

    HorizonPosition {
        altitude_deg: sin_alt.asin() * RAD2DEG,
        azimuth_deg: normalize_0_360(y.atan2(x) * RAD2DEG),
    }
}
