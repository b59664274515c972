//! Sight reduction by the intercept method
//!
//! One [`Observation`] of a body, reduced from an assumed position, yields
//! one line of position ([`LopRecord`]): the intercept (how far the observed
//! altitude circle lies from the assumed position, in nautical miles) and the
//! true azimuth along which to lay it off.
//!
//! The chain is: assumed longitude → east-positive, Julian Day → GMST → LST →
//! LHA → (Hc, Zn) → intercept = (Ho − Hc) × 60.

pub mod synthetic;

use crate::constants::NM_PER_DEG;
use crate::coordinates::{CelestialTarget, GeodeticPosition};
use crate::horizon::{altitude_azimuth_deg, local_hour_angle_deg, pole_angle_deg};
use crate::time::{gmst_deg, local_sidereal_time_deg, Instant};
use crate::{Result, SightFixError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One altitude observation of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// UTC instant of the sight
    pub instant: Instant,
    /// Apparent RA/Dec of the body
    pub target: CelestialTarget,
    /// Observed altitude Ho in degrees, already corrected for dip,
    /// refraction and instrument error
    pub observed_altitude_deg: f64,
}

impl Observation {
    /// Create an observation, rejecting a non-finite observed altitude
    pub fn new(instant: Instant, target: CelestialTarget, observed_altitude_deg: f64) -> Result<Self> {
        check_observed_altitude(observed_altitude_deg)?;
        Ok(Self {
            instant,
            target,
            observed_altitude_deg,
        })
    }

    /// Reduce this sight from `assumed` into a line of position
    pub fn reduce(&self, assumed: &GeodeticPosition) -> Result<LopRecord> {
        build_lop(self, assumed)
    }
}

fn check_observed_altitude(observed_altitude_deg: f64) -> Result<()> {
    if observed_altitude_deg.is_finite() {
        Ok(())
    } else {
        Err(SightFixError::NonFiniteInput {
            field: "observed_altitude_deg",
            value: observed_altitude_deg,
        })
    }
}

/// Intermediate angles of a sight reduction, kept for display and debugging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SightReduction {
    /// Observed altitude Ho, degrees
    pub observed_altitude_deg: f64,
    /// Computed altitude Hc at the assumed position, degrees
    pub computed_altitude_deg: f64,
    /// Meridian angle P, degrees in [0, 180]
    pub pole_angle_deg: f64,
    /// Local hour angle, degrees in [0, 360)
    pub local_hour_angle_deg: f64,
    /// Julian Day of the sight
    pub julian_day: f64,
    /// Greenwich Mean Sidereal Time, degrees
    pub gmst_deg: f64,
    /// Local Sidereal Time at the assumed longitude, degrees
    pub lst_deg: f64,
}

/// Line of position relative to the assumed position it was reduced from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LopRecord {
    /// Signed intercept in nautical miles; positive lies toward the body
    pub intercept_nm: f64,
    /// True azimuth Zn of the body, degrees in [0, 360)
    pub azimuth_deg: f64,
    /// Reduction details; absent for lines of position supplied from outside
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduction: Option<SightReduction>,
}

impl LopRecord {
    /// A line of position known only by intercept and azimuth
    pub fn from_intercept(intercept_nm: f64, azimuth_deg: f64) -> Self {
        Self {
            intercept_nm,
            azimuth_deg,
            reduction: None,
        }
    }

    /// Computed altitude Hc, when this record came from a sight reduction
    pub fn computed_altitude_deg(&self) -> Option<f64> {
        self.reduction.map(|r| r.computed_altitude_deg)
    }

    /// Meridian angle P, when this record came from a sight reduction
    pub fn pole_angle_deg(&self) -> Option<f64> {
        self.reduction.map(|r| r.pole_angle_deg)
    }

    /// Local hour angle, when this record came from a sight reduction
    pub fn local_hour_angle_deg(&self) -> Option<f64> {
        self.reduction.map(|r| r.local_hour_angle_deg)
    }

    /// Whether the intercept is laid off toward or away from the body
    pub fn direction(&self) -> InterceptDirection {
        if self.intercept_nm >= 0.0 {
            InterceptDirection::Toward
        } else {
            InterceptDirection::Away
        }
    }
}

impl fmt::Display for LopRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} NM {} Zn {:.1}°",
            self.intercept_nm.abs(),
            self.direction(),
            self.azimuth_deg
        )
    }
}

/// Side of the assumed position the line of position lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptDirection {
    /// Ho ≥ Hc: move toward the body
    Toward,
    /// Ho < Hc: move away from the body
    Away,
}

impl fmt::Display for InterceptDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterceptDirection::Toward => write!(f, "T"),
            InterceptDirection::Away => write!(f, "A"),
        }
    }
}

/// Reduce one observation from an assumed position
///
/// Fails only on a non-finite observed altitude; everything else is
/// validated when the inputs are constructed. Never retries.
pub fn build_lop(observation: &Observation, assumed: &GeodeticPosition) -> Result<LopRecord> {
    check_observed_altitude(observation.observed_altitude_deg)?;

    let julian_day = observation.instant.julian_day();
    let gmst = gmst_deg(julian_day);
    let lst = local_sidereal_time_deg(gmst, assumed.longitude_east_deg());
    let lha = local_hour_angle_deg(lst, observation.target.ra_deg());
    let pole_angle = pole_angle_deg(lha);

    let horizon = altitude_azimuth_deg(assumed.latitude_deg(), observation.target.dec_deg(), lha);
    let intercept_nm = (observation.observed_altitude_deg - horizon.altitude_deg) * NM_PER_DEG;

    let lop = LopRecord {
        intercept_nm,
        azimuth_deg: horizon.azimuth_deg,
        reduction: Some(SightReduction {
            observed_altitude_deg: observation.observed_altitude_deg,
            computed_altitude_deg: horizon.altitude_deg,
            pole_angle_deg: pole_angle,
            local_hour_angle_deg: lha,
            julian_day,
            gmst_deg: gmst,
            lst_deg: lst,
        }),
    };

    debug!(
        "Sight at {} from {}: Hc={:.4}° LHA={:.4}° -> {}",
        observation.instant, assumed, horizon.altitude_deg, lha, lop
    );

    Ok(lop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn reference_observation() -> Observation {
        Observation::new(
            Instant::parse("2025-05-17 21:59:31").unwrap(),
            CelestialTarget::new(208.488, 4.968).unwrap(),
            35.22,
        )
        .unwrap()
    }

    #[test]
    fn test_reference_sight_reduction() {
        let assumed = GeodeticPosition::west_positive(49.5, 0.1).unwrap();
        let lop = build_lop(&reference_observation(), &assumed).unwrap();
        let reduction = lop.reduction.unwrap();

        assert_abs_diff_eq!(reduction.julian_day, 2_460_813.416_331_018_3, epsilon = 1e-8);
        assert_abs_diff_eq!(reduction.gmst_deg, 205.729_956_292_547_3, epsilon = 1e-6);
        assert_abs_diff_eq!(reduction.lst_deg, 205.629_956_292_547_26, epsilon = 1e-6);
        assert_abs_diff_eq!(reduction.local_hour_angle_deg, 357.141_956_292_547_26, epsilon = 1e-6);
        assert_abs_diff_eq!(reduction.pole_angle_deg, 2.858_043_707_452_737, epsilon = 1e-6);
        assert_abs_diff_eq!(reduction.computed_altitude_deg, 45.402_288_197_707_854, epsilon = 1e-6);
        assert_abs_diff_eq!(lop.intercept_nm, -610.937_291_862_471_3, epsilon = 1e-3);
        assert_abs_diff_eq!(lop.azimuth_deg, 175.943_019_769_790_7, epsilon = 1e-4);
        assert_eq!(lop.direction(), InterceptDirection::Away);
    }

    #[test]
    fn test_convention_does_not_change_reduction() {
        let west = GeodeticPosition::west_positive(49.5, 0.1).unwrap();
        let east = GeodeticPosition::east_positive(49.5, -0.1).unwrap();
        let observation = reference_observation();

        let a = build_lop(&observation, &west).unwrap();
        let b = build_lop(&observation, &east).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_intercept_is_sixty_miles_per_degree() {
        let assumed = GeodeticPosition::west_positive(49.5, 0.1).unwrap();
        let mut observation = reference_observation();
        let base = build_lop(&observation, &assumed).unwrap();

        observation.observed_altitude_deg += 0.5;
        let raised = build_lop(&observation, &assumed).unwrap();

        assert_abs_diff_eq!(raised.intercept_nm - base.intercept_nm, 30.0, epsilon = 1e-9);
        assert_eq!(raised.azimuth_deg, base.azimuth_deg);
    }

    #[test]
    fn test_non_finite_observed_altitude() {
        let assumed = GeodeticPosition::west_positive(49.5, 0.1).unwrap();
        let mut observation = reference_observation();
        observation.observed_altitude_deg = f64::NAN;

        assert!(matches!(
            build_lop(&observation, &assumed),
            Err(SightFixError::NonFiniteInput { field: "observed_altitude_deg", .. })
        ));
        assert!(Observation::new(observation.instant, observation.target, f64::INFINITY).is_err());
    }

    #[test]
    fn test_external_lop_has_no_reduction() {
        let lop = LopRecord::from_intercept(10.0, 45.0);
        assert_eq!(lop.computed_altitude_deg(), None);
        assert_eq!(lop.pole_angle_deg(), None);
        assert_eq!(lop.local_hour_angle_deg(), None);
        assert_eq!(lop.to_string(), "10.00 NM T Zn 45.0°");
    }

    #[test]
    fn test_lop_serde_optional_reduction() {
        let lop: LopRecord = serde_json::from_str(r#"{"intercept_nm": -5.0, "azimuth_deg": 150.0}"#).unwrap();
        assert_eq!(lop, LopRecord::from_intercept(-5.0, 150.0));
        assert_eq!(serde_json::to_string(&lop).unwrap(), r#"{"intercept_nm":-5.0,"azimuth_deg":150.0}"#);
    }
}
