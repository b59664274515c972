//! Position fixing from several lines of position
//!
//! Every solver works on the same local linear model: near the assumed
//! position each LOP is a straight line, and moving the candidate by
//! (Δnorth, Δeast) nautical miles changes that LOP's intercept by
//! `Δnorth·cos(Zn) + Δeast·sin(Zn)`. The residual of a LOP at a candidate is
//! its intercept at the anchor minus that predicted change.
//!
//! Two strategies are provided behind [`FixSolver`]:
//! - [`RelaxationSolver`]: damped first-order iteration with a fixed budget
//! - [`LeastSquaresSolver`]: closed-form least squares via SVD

pub mod least_squares;
pub mod relaxation;

pub use least_squares::LeastSquaresSolver;
pub use relaxation::{RelaxationConfig, RelaxationSolver};

use crate::constants::{DEG2RAD, FIX_UNKNOWNS, NM_PER_DEG};
use crate::coordinates::{normalize_pm180, GeodeticPosition};
use crate::sight::LopRecord;
use crate::{Result, SightFixError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A strategy that turns lines of position into a fix
pub trait FixSolver {
    /// Solve for the most probable position given LOPs reduced from `assumed`
    fn solve(&self, lops: &[LopRecord], assumed: &GeodeticPosition) -> Result<FixResult>;
}

/// Fix strategy selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FixStrategy {
    /// Damped iterative relaxation
    Relaxation(RelaxationConfig),
    /// Closed-form linear least squares
    LeastSquares,
}

impl Default for FixStrategy {
    fn default() -> Self {
        FixStrategy::Relaxation(RelaxationConfig::default())
    }
}

impl FixStrategy {
    /// The method this strategy reports in its results
    pub fn method(&self) -> FixMethod {
        match self {
            FixStrategy::Relaxation(_) => FixMethod::Relaxation,
            FixStrategy::LeastSquares => FixMethod::LeastSquares,
        }
    }
}

impl FixSolver for FixStrategy {
    fn solve(&self, lops: &[LopRecord], assumed: &GeodeticPosition) -> Result<FixResult> {
        match self {
            FixStrategy::Relaxation(config) => RelaxationSolver::new(*config).solve(lops, assumed),
            FixStrategy::LeastSquares => LeastSquaresSolver.solve(lops, assumed),
        }
    }
}

/// Which algorithm produced a [`FixResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixMethod {
    Relaxation,
    LeastSquares,
}

impl fmt::Display for FixMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixMethod::Relaxation => write!(f, "relaxation"),
            FixMethod::LeastSquares => write!(f, "least squares"),
        }
    }
}

/// One step of the relaxation iteration, kept for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationStep {
    /// Iteration number, starting at 1
    pub iteration: usize,
    /// Candidate latitude after this step, degrees
    pub latitude_deg: f64,
    /// Candidate longitude after this step, degrees west positive
    pub longitude_west_deg: f64,
    /// Latitude move applied in this step, degrees
    pub move_lat_deg: f64,
    /// Longitude move applied in this step, degrees west positive
    pub move_lon_deg: f64,
    /// Sum of absolute residuals before the move, NM
    pub total_abs_residual_nm: f64,
}

/// The fix and its residual diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixResult {
    /// Fixed position, reported in the assumed position's convention
    pub position: GeodeticPosition,
    /// Largest absolute residual among the LOPs at the fix, NM
    pub spread_nm: f64,
    /// RMS residual with n−2 degrees of freedom, NM (0 when n = 2)
    pub error_estimate_nm: f64,
    /// Algorithm that produced the fix
    pub method: FixMethod,
    /// Per-iteration trace; empty for closed-form solutions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iterations: Vec<IterationStep>,
    /// Whether the solver met its stopping criterion
    pub converged: bool,
}

impl FixResult {
    /// Latitude of the fix in degrees
    pub fn latitude_deg(&self) -> f64 {
        self.position.latitude_deg()
    }

    /// Longitude of the fix in the assumed position's convention
    pub fn longitude_deg(&self) -> f64 {
        self.position.longitude_deg()
    }
}

/// Residual statistics of a candidate position
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResidualStats {
    pub spread_nm: f64,
    pub error_estimate_nm: f64,
}

/// LOPs linearized around the position they were reduced from
pub(crate) struct LinearLopModel<'a> {
    lops: &'a [LopRecord],
    latitude_deg: f64,
    longitude_west_deg: f64,
    cos_latitude: f64,
}

impl<'a> LinearLopModel<'a> {
    /// Validate the LOPs and anchor the model at `assumed`
    pub fn new(lops: &'a [LopRecord], assumed: &GeodeticPosition) -> Result<Self> {
        if lops.len() < FIX_UNKNOWNS {
            return Err(SightFixError::InsufficientLops {
                required: FIX_UNKNOWNS,
                provided: lops.len(),
            });
        }

        for (index, lop) in lops.iter().enumerate() {
            if !lop.intercept_nm.is_finite() {
                return Err(SightFixError::InvalidLop {
                    index,
                    reason: format!("intercept is {}", lop.intercept_nm),
                });
            }
            if !lop.azimuth_deg.is_finite() {
                return Err(SightFixError::InvalidLop {
                    index,
                    reason: format!("azimuth is {}", lop.azimuth_deg),
                });
            }
        }

        Ok(Self {
            lops,
            latitude_deg: assumed.latitude_deg(),
            longitude_west_deg: assumed.longitude_west_deg(),
            cos_latitude: (assumed.latitude_deg() * DEG2RAD).cos(),
        })
    }

    pub fn lops(&self) -> &'a [LopRecord] {
        self.lops
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn longitude_west_deg(&self) -> f64 {
        self.longitude_west_deg
    }

    pub fn cos_latitude(&self) -> f64 {
        self.cos_latitude
    }

    /// North and east offsets of a candidate from the anchor, NM
    ///
    /// The east offset uses the anchor latitude's cosine for every candidate.
    pub fn offset_nm(&self, latitude_deg: f64, longitude_west_deg: f64) -> (f64, f64) {
        let north = (latitude_deg - self.latitude_deg) * NM_PER_DEG;
        let east = -normalize_pm180(longitude_west_deg - self.longitude_west_deg)
            * NM_PER_DEG
            * self.cos_latitude;
        (north, east)
    }

    /// Residual intercept of every LOP at a candidate, NM
    pub fn residuals(&self, latitude_deg: f64, longitude_west_deg: f64) -> Vec<f64> {
        let (north, east) = self.offset_nm(latitude_deg, longitude_west_deg);
        self.lops
            .iter()
            .map(|lop| {
                let (sin_az, cos_az) = (lop.azimuth_deg * DEG2RAD).sin_cos();
                lop.intercept_nm - (north * cos_az + east * sin_az)
            })
            .collect()
    }

    /// Spread and RMS error of the residuals at a candidate
    pub fn statistics(&self, latitude_deg: f64, longitude_west_deg: f64) -> ResidualStats {
        let residuals = self.residuals(latitude_deg, longitude_west_deg);
        let spread_nm = residuals.iter().fold(0.0_f64, |acc, r| acc.max(r.abs()));

        let dof = residuals.len().saturating_sub(FIX_UNKNOWNS);
        let error_estimate_nm = if dof > 0 {
            let ssr: f64 = residuals.iter().map(|r| r * r).sum();
            (ssr / dof as f64).sqrt()
        } else {
            0.0
        };

        ResidualStats {
            spread_nm,
            error_estimate_nm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mock_lops() -> Vec<LopRecord> {
        vec![
            LopRecord::from_intercept(10.0, 45.0),
            LopRecord::from_intercept(-5.0, 150.0),
            LopRecord::from_intercept(0.0, 270.0),
        ]
    }

    #[test]
    fn test_residuals_at_anchor_are_intercepts() {
        let lops = mock_lops();
        let assumed = GeodeticPosition::west_positive(50.0, 5.0).unwrap();
        let model = LinearLopModel::new(&lops, &assumed).unwrap();

        assert_eq!(model.residuals(50.0, 5.0), vec![10.0, -5.0, 0.0]);
    }

    #[test]
    fn test_offset_signs() {
        let lops = mock_lops();
        let assumed = GeodeticPosition::west_positive(0.0, 5.0).unwrap();
        let model = LinearLopModel::new(&lops, &assumed).unwrap();

        // Moving west is a negative east offset
        let (north, east) = model.offset_nm(1.0, 6.0);
        assert_abs_diff_eq!(north, 60.0, epsilon = 1e-12);
        assert_abs_diff_eq!(east, -60.0, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_across_antimeridian() {
        let lops = mock_lops();
        let assumed = GeodeticPosition::west_positive(0.0, 179.5).unwrap();
        let model = LinearLopModel::new(&lops, &assumed).unwrap();

        let (_, east) = model.offset_nm(0.0, -179.5);
        assert_abs_diff_eq!(east, -60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_statistics_at_anchor() {
        let lops = mock_lops();
        let assumed = GeodeticPosition::west_positive(50.0, 5.0).unwrap();
        let model = LinearLopModel::new(&lops, &assumed).unwrap();

        let stats = model.statistics(50.0, 5.0);
        assert_eq!(stats.spread_nm, 10.0);
        assert_abs_diff_eq!(stats.error_estimate_nm, 125.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_two_lops_have_no_error_estimate() {
        let lops = [LopRecord::from_intercept(3.0, 0.0), LopRecord::from_intercept(4.0, 90.0)];
        let assumed = GeodeticPosition::west_positive(10.0, 20.0).unwrap();
        let model = LinearLopModel::new(&lops, &assumed).unwrap();

        assert_eq!(model.statistics(10.0, 20.0).error_estimate_nm, 0.0);
    }

    #[test]
    fn test_rejects_too_few_lops() {
        let lops = [LopRecord::from_intercept(3.0, 0.0)];
        let assumed = GeodeticPosition::west_positive(10.0, 20.0).unwrap();

        assert!(matches!(
            LinearLopModel::new(&lops, &assumed),
            Err(SightFixError::InsufficientLops { required: 2, provided: 1 })
        ));
    }

    #[test]
    fn test_rejects_non_finite_lop() {
        let lops = [
            LopRecord::from_intercept(3.0, 0.0),
            LopRecord::from_intercept(4.0, f64::NAN),
        ];
        let assumed = GeodeticPosition::west_positive(10.0, 20.0).unwrap();

        assert!(matches!(
            LinearLopModel::new(&lops, &assumed),
            Err(SightFixError::InvalidLop { index: 1, .. })
        ));
    }

    #[test]
    fn test_strategy_serde() {
        let strategy: FixStrategy = serde_json::from_str(r#"{"method": "least_squares"}"#).unwrap();
        assert_eq!(strategy, FixStrategy::LeastSquares);

        let strategy: FixStrategy =
            serde_json::from_str(r#"{"method": "relaxation", "max_iterations": 500}"#).unwrap();
        assert_eq!(
            strategy,
            FixStrategy::Relaxation(RelaxationConfig::default().with_max_iterations(500))
        );

        let strategy: FixStrategy = serde_json::from_str(r#"{"method": "relaxation"}"#).unwrap();
        assert_eq!(strategy, FixStrategy::default());

        assert!(serde_json::from_str::<FixStrategy>(r#"{"method": "newton"}"#).is_err());
    }

    #[test]
    fn test_strategies_dispatch() {
        let lops = mock_lops();
        let assumed = GeodeticPosition::west_positive(50.0, 5.0).unwrap();

        let relaxed = FixStrategy::default().solve(&lops, &assumed).unwrap();
        assert_eq!(relaxed.method, FixMethod::Relaxation);
        assert!(!relaxed.iterations.is_empty());

        let closed = FixStrategy::LeastSquares.solve(&lops, &assumed).unwrap();
        assert_eq!(closed.method, FixMethod::LeastSquares);
        assert!(closed.iterations.is_empty());
    }
}
