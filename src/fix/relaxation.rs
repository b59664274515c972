//! Damped iterative relaxation
//!
//! Each iteration evaluates every LOP's residual intercept at the current
//! candidate, turns each residual into a move along its azimuth, averages the
//! moves, scales them by the learning rate and applies them. The loop stops
//! once both averaged moves fall below `min_step_deg`, or when the iteration
//! budget runs out; in that case the best candidate reached is returned with
//! `converged == false`.
//!
//! This is a first-order method meant for corrections of a few tens of miles.
//! Its fixed point is the least-squares solution of the linear LOP model, but
//! with the default budget it only moves part of the way there.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use super::{FixMethod, FixResult, FixSolver, IterationStep, LinearLopModel};
use crate::constants::{
    DEG2RAD, NM_PER_DEG, POLE_COS_GUARD, RELAXATION_LEARNING_RATE, RELAXATION_MAX_ITERATIONS,
    RELAXATION_MIN_STEP_DEG,
};
use crate::coordinates::{normalize_pm180, GeodeticPosition};
use crate::sight::LopRecord;
use crate::{Result, SightFixError};

/// Parameters of the relaxation loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationConfig {
    /// Iteration budget
    pub max_iterations: usize,
    /// Fraction of the averaged move applied per iteration
    pub learning_rate: f64,
    /// Stop once both averaged moves are below this, degrees
    pub min_step_deg: f64,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            max_iterations: RELAXATION_MAX_ITERATIONS,
            learning_rate: RELAXATION_LEARNING_RATE,
            min_step_deg: RELAXATION_MIN_STEP_DEG,
        }
    }
}

impl RelaxationConfig {
    /// Create a configuration with the default constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the learning rate
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the stopping threshold in degrees
    pub fn with_min_step_deg(mut self, min_step_deg: f64) -> Self {
        self.min_step_deg = min_step_deg;
        self
    }

    /// Check the parameters describe a loop that can run
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(SightFixError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(SightFixError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !self.min_step_deg.is_finite() || self.min_step_deg < 0.0 {
            return Err(SightFixError::Config(format!(
                "min_step_deg must be non-negative, got {}",
                self.min_step_deg
            )));
        }
        Ok(())
    }
}

/// Iterative relaxation fix solver
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RelaxationSolver {
    config: RelaxationConfig,
}

impl RelaxationSolver {
    pub fn new(config: RelaxationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelaxationConfig {
        &self.config
    }
}

impl FixSolver for RelaxationSolver {
    fn solve(&self, lops: &[LopRecord], assumed: &GeodeticPosition) -> Result<FixResult> {
        self.config.validate()?;
        let model = LinearLopModel::new(lops, assumed)?;
        let count = lops.len() as f64;

        let mut latitude = model.latitude_deg();
        let mut longitude_west = model.longitude_west_deg();
        let mut steps = Vec::with_capacity(self.config.max_iterations);
        let mut converged = false;

        for iteration in 1..=self.config.max_iterations {
            let cos_latitude = (latitude * DEG2RAD).cos();
            let mut sum_lat = 0.0;
            let mut sum_lon = 0.0;
            let mut total_abs_residual = 0.0;

            for (lop, residual) in model.lops().iter().zip(model.residuals(latitude, longitude_west)) {
                let (sin_az, cos_az) = (lop.azimuth_deg * DEG2RAD).sin_cos();
                sum_lat += residual / NM_PER_DEG * cos_az;
                // Longitude move is east-positive; skip it at the pole
                if cos_latitude.abs() > POLE_COS_GUARD {
                    sum_lon -= residual / NM_PER_DEG * sin_az / cos_latitude;
                }
                total_abs_residual += residual.abs();
            }

            let move_lat = sum_lat / count * self.config.learning_rate;
            let move_lon = sum_lon / count * self.config.learning_rate;

            latitude = (latitude + move_lat).clamp(-90.0, 90.0);
            longitude_west = normalize_pm180(longitude_west + move_lon);

            trace!(
                "Relaxation {}: lat={:.7} lonW={:.7} dlat={:.3e} dlon={:.3e} |r|={:.4}",
                iteration,
                latitude,
                longitude_west,
                move_lat,
                move_lon,
                total_abs_residual
            );

            steps.push(IterationStep {
                iteration,
                latitude_deg: latitude,
                longitude_west_deg: longitude_west,
                move_lat_deg: move_lat,
                move_lon_deg: move_lon,
                total_abs_residual_nm: total_abs_residual,
            });

            if move_lat.abs() < self.config.min_step_deg && move_lon.abs() < self.config.min_step_deg {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                "Relaxation stopped after {} iterations without reaching a {:.3e}° step",
                self.config.max_iterations, self.config.min_step_deg
            );
        }

        let position = GeodeticPosition::from_west_clamped(latitude, longitude_west, assumed.convention());
        let stats = model.statistics(position.latitude_deg(), position.longitude_west_deg());

        debug!(
            "Relaxation fix {} after {} iterations, spread {:.3} NM",
            position,
            steps.len(),
            stats.spread_nm
        );

        Ok(FixResult {
            position,
            spread_nm: stats.spread_nm,
            error_estimate_nm: stats.error_estimate_nm,
            method: FixMethod::Relaxation,
            iterations: steps,
            converged,
        })
    }
}
