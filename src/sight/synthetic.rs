//! Synthetic sights for testing and benchmarking
//!
//! Observations are generated from a known "true" position: the observed
//! altitude of each body is its computed altitude at that position, plus
//! optional uniform noise. Reducing such sights from any assumed position and
//! solving the fix should recover the true position.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::Observation;
use crate::coordinates::{CelestialTarget, GeodeticPosition};
use crate::horizon::{altitude_azimuth_deg, local_hour_angle_deg};
use crate::time::{local_sidereal_time_deg, Instant};
use crate::{Result, SightFixError};

/// Configuration for synthetic sight generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticSightConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Half-width of the uniform altitude noise, arcminutes
    pub altitude_noise_arcmin: f64,
}

impl Default for SyntheticSightConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            altitude_noise_arcmin: 0.0,
        }
    }
}

impl SyntheticSightConfig {
    /// Create a configuration producing noiseless sights
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the altitude noise half-width in arcminutes (1' = 1 NM of intercept)
    pub fn with_altitude_noise_arcmin(mut self, noise: f64) -> Self {
        self.altitude_noise_arcmin = noise;
        self
    }

    /// Observe every target at `instant` from `truth`
    pub fn generate(
        &self,
        truth: &GeodeticPosition,
        instant: Instant,
        targets: &[CelestialTarget],
    ) -> Result<Vec<Observation>> {
        if !self.altitude_noise_arcmin.is_finite() || self.altitude_noise_arcmin < 0.0 {
            return Err(SightFixError::Config(format!(
                "altitude noise must be finite and non-negative, got {}",
                self.altitude_noise_arcmin
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let noise = (self.altitude_noise_arcmin > 0.0)
            .then(|| Uniform::from(-self.altitude_noise_arcmin..=self.altitude_noise_arcmin));

        targets
            .iter()
            .map(|target| {
                let mut observation = ideal_observation(truth, instant, *target);
                if let Some(dist) = &noise {
                    observation.observed_altitude_deg += dist.sample(&mut rng) / 60.0;
                }
                Ok(observation)
            })
            .collect()
    }
}

/// The observation a perfect sextant would give at `truth`
pub fn ideal_observation(truth: &GeodeticPosition, instant: Instant, target: CelestialTarget) -> Observation {
    let lst = local_sidereal_time_deg(instant.gmst_deg(), truth.longitude_east_deg());
    let lha = local_hour_angle_deg(lst, target.ra_deg());
    let horizon = altitude_azimuth_deg(truth.latitude_deg(), target.dec_deg(), lha);

    Observation {
        instant,
        target,
        observed_altitude_deg: horizon.altitude_deg,
    }
}
