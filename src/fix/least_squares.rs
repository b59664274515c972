//! Closed-form least-squares fix
//!
//! Solves the overdetermined system `b_i = e·sin(Zn_i) + n·cos(Zn_i)` for the
//! east/north offset (e, n) in nautical miles, unweighted, via SVD. Sets whose
//! azimuths are all parallel or anti-parallel leave one direction unobserved
//! and are rejected.

use log::debug;
use nalgebra::{DMatrix, DVector};

use super::{FixMethod, FixResult, FixSolver, LinearLopModel};
use crate::constants::{DEG2RAD, MIN_SINGULAR_RATIO, NM_PER_DEG, POLE_COS_GUARD};
use crate::coordinates::GeodeticPosition;
use crate::sight::LopRecord;
use crate::{Result, SightFixError};

/// Linear least-squares fix solver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeastSquaresSolver;

impl LeastSquaresSolver {
    /// East and north offsets in NM minimizing the squared residuals
    fn solve_offsets(lops: &[LopRecord]) -> Result<(f64, f64)> {
        let design = DMatrix::from_fn(lops.len(), 2, |row, col| {
            let azimuth = lops[row].azimuth_deg * DEG2RAD;
            if col == 0 {
                azimuth.sin()
            } else {
                azimuth.cos()
            }
        });
        let intercepts = DVector::from_iterator(lops.len(), lops.iter().map(|lop| lop.intercept_nm));

        let svd = design.svd(true, true);
        let largest = svd.singular_values.max();
        let smallest = svd.singular_values.min();
        if largest <= 0.0 || smallest / largest < MIN_SINGULAR_RATIO {
            return Err(SightFixError::DegenerateGeometry {
                condition_number: largest / smallest,
            });
        }

        let solution = svd
            .solve(&intercepts, smallest * 0.5)
            .map_err(|_| SightFixError::DegenerateGeometry {
                condition_number: largest / smallest,
            })?;

        Ok((solution[0], solution[1]))
    }
}

impl FixSolver for LeastSquaresSolver {
    fn solve(&self, lops: &[LopRecord], assumed: &GeodeticPosition) -> Result<FixResult> {
        let model = LinearLopModel::new(lops, assumed)?;
        let (east_nm, north_nm) = Self::solve_offsets(lops)?;

        let latitude = model.latitude_deg() + north_nm / NM_PER_DEG;
        let mut longitude_west = model.longitude_west_deg();
        if model.cos_latitude().abs() > POLE_COS_GUARD {
            longitude_west -= east_nm / (NM_PER_DEG * model.cos_latitude());
        }

        let position = GeodeticPosition::from_west_clamped(latitude, longitude_west, assumed.convention());
        let stats = model.statistics(position.latitude_deg(), position.longitude_west_deg());

        debug!(
            "Least-squares fix {} (e={:.3} NM, n={:.3} NM), RMSE {:.3} NM",
            position, east_nm, north_nm, stats.error_estimate_nm
        );

        Ok(FixResult {
            position,
            spread_nm: stats.spread_nm,
            error_estimate_nm: stats.error_estimate_nm,
            method: FixMethod::LeastSquares,
            iterations: Vec::new(),
            converged: true,
        })
    }
}
