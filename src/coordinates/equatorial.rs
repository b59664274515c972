//! Equatorial coordinates of a sighted body

use crate::coordinates::angle::{dms_to_degrees, hms_to_degrees, normalize_0_360};
use crate::{Result, SightFixError};
use serde::{Deserialize, Serialize};

/// Right ascension and declination of a body at the time of observation
///
/// Values are apparent coordinates as delivered by the caller (for instance
/// an astrometric image solve); no precession or refraction is applied here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TargetRecord", into = "TargetRecord")]
pub struct CelestialTarget {
    ra_deg: f64,
    dec_deg: f64,
}

/// Wire shape of a [`CelestialTarget`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetRecord {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

impl CelestialTarget {
    /// Create a target from RA/Dec in degrees
    ///
    /// Right ascension is reduced into [0, 360); declination must lie in [-90, 90].
    pub fn new(ra_deg: f64, dec_deg: f64) -> Result<Self> {
        if !ra_deg.is_finite() {
            return Err(SightFixError::NonFiniteInput {
                field: "ra_deg",
                value: ra_deg,
            });
        }
        if !dec_deg.is_finite() {
            return Err(SightFixError::NonFiniteInput {
                field: "dec_deg",
                value: dec_deg,
            });
        }
        if !(-90.0..=90.0).contains(&dec_deg) {
            return Err(SightFixError::InvalidDeclination(dec_deg));
        }

        Ok(Self {
            ra_deg: normalize_0_360(ra_deg),
            dec_deg,
        })
    }

    /// Create a target from RA in hours/minutes/seconds and signed Dec in degrees/arcminutes/arcseconds
    pub fn from_sexagesimal(ra_hms: (f64, f64, f64), dec_sign: f64, dec_dms: (f64, f64, f64)) -> Result<Self> {
        Self::new(
            hms_to_degrees(ra_hms.0, ra_hms.1, ra_hms.2),
            dms_to_degrees(dec_sign, dec_dms.0, dec_dms.1, dec_dms.2),
        )
    }

    /// Right ascension in degrees, [0, 360)
    pub fn ra_deg(&self) -> f64 {
        self.ra_deg
    }

    /// Declination in degrees, [-90, 90]
    pub fn dec_deg(&self) -> f64 {
        self.dec_deg
    }
}

impl TryFrom<TargetRecord> for CelestialTarget {
    type Error = SightFixError;

    fn try_from(record: TargetRecord) -> Result<Self> {
        Self::new(record.ra_deg, record.dec_deg)
    }
}

impl From<CelestialTarget> for TargetRecord {
    fn from(target: CelestialTarget) -> Self {
        Self {
            ra_deg: target.ra_deg,
            dec_deg: target.dec_deg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ra_is_normalized() {
        let target = CelestialTarget::new(-15.0, 10.0).unwrap();
        assert_abs_diff_eq!(target.ra_deg(), 345.0, epsilon = 1e-12);

        let target = CelestialTarget::new(360.0, 10.0).unwrap();
        assert_eq!(target.ra_deg(), 0.0);
    }

    #[test]
    fn test_declination_out_of_range() {
        assert!(matches!(
            CelestialTarget::new(10.0, 90.5),
            Err(SightFixError::InvalidDeclination(_))
        ));
        assert!(CelestialTarget::new(10.0, -90.0).is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            CelestialTarget::new(f64::NAN, 0.0),
            Err(SightFixError::NonFiniteInput { field: "ra_deg", .. })
        ));
    }

    #[test]
    fn test_from_sexagesimal() {
        // 13h 59m 26.16s, +4° 58' 5.52"
        let target =
            CelestialTarget::from_sexagesimal((13.0, 59.0, 26.16), 1.0, (4.0, 58.0, 5.52)).unwrap();
        assert_abs_diff_eq!(target.ra_deg(), 209.859, epsilon = 1e-9);
        assert_abs_diff_eq!(target.dec_deg(), 4.968_2, epsilon = 1e-9);
    }

    #[test]
    fn test_serde_validates() {
        let target: CelestialTarget =
            serde_json::from_str(r#"{"ra_deg": 208.488, "dec_deg": 4.968}"#).unwrap();
        assert_eq!(target.ra_deg(), 208.488);
        assert!(serde_json::from_str::<CelestialTarget>(r#"{"ra_deg": 1.0, "dec_deg": 91.0}"#).is_err());
    }
}
