//! Entry point for reducing a set of sights
//!
//! The navigator accepts exactly one observation (returning its line of
//! position) or exactly three (returning a fix). Raw inputs are validated in
//! full before any trigonometry runs; a failure at any stage aborts the whole
//! request and is returned together with the per-observation diagnostics
//! gathered so far.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::constants::{FIX_SIGHTS, SINGLE_SIGHT};
use crate::coordinates::{CelestialTarget, GeodeticPosition};
use crate::fix::{FixResult, FixSolver, FixStrategy};
use crate::sight::{build_lop, LopRecord, Observation};
use crate::time::Instant;
use crate::{Result, SightFixError};

/// Navigator configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Strategy used when three observations are supplied
    #[serde(default)]
    pub strategy: FixStrategy,
}

impl NavigatorConfig {
    pub fn new(strategy: FixStrategy) -> Self {
        Self { strategy }
    }

    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: NavigatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content).map_err(|e| match e {
            SightFixError::Json(inner) => SightFixError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                inner
            )),
            other => other,
        })
    }

    /// Check the selected strategy's parameters
    pub fn validate(&self) -> Result<()> {
        match &self.strategy {
            FixStrategy::Relaxation(config) => config.validate(),
            FixStrategy::LeastSquares => Ok(()),
        }
    }
}

/// One observation as delivered by a host, every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationInput {
    /// UTC timestamp, `YYYY-MM-DD HH:MM:SS[.ffffff]` or RFC 3339
    #[serde(default)]
    pub utc: Option<String>,
    #[serde(default)]
    pub ra_deg: Option<f64>,
    #[serde(default)]
    pub dec_deg: Option<f64>,
    #[serde(default)]
    pub observed_altitude_deg: Option<f64>,
}

impl ObservationInput {
    /// Validate the fields and build an [`Observation`]
    pub fn to_observation(&self) -> Result<Observation> {
        let utc = self.utc.as_deref().ok_or(SightFixError::MissingField("utc"))?;
        let ra_deg = self.ra_deg.ok_or(SightFixError::MissingField("ra_deg"))?;
        let dec_deg = self.dec_deg.ok_or(SightFixError::MissingField("dec_deg"))?;
        let observed_altitude_deg = self
            .observed_altitude_deg
            .ok_or(SightFixError::MissingField("observed_altitude_deg"))?;

        let instant = Instant::parse(utc)?;
        let target = CelestialTarget::new(ra_deg, dec_deg)?;
        Observation::new(instant, target, observed_altitude_deg)
    }
}

impl From<&Observation> for ObservationInput {
    fn from(observation: &Observation) -> Self {
        Self {
            utc: Some(observation.instant.to_string()),
            ra_deg: Some(observation.target.ra_deg()),
            dec_deg: Some(observation.target.dec_deg()),
            observed_altitude_deg: Some(observation.observed_altitude_deg),
        }
    }
}

/// What happened to one observation of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedObservation {
    /// Position of the observation in the request
    pub index: usize,
    /// The validated observation, if validation got that far
    pub observation: Option<Observation>,
    /// Its line of position, if it was reduced
    pub lop: Option<LopRecord>,
    /// Why processing stopped at this observation
    pub error: Option<String>,
}

/// Result of a successful request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// A single sight reduced to its line of position
    Lop(LopRecord),
    /// Three sights combined into a fix
    Fix(FixResult),
}

/// A successful request with its per-observation diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationReport {
    pub outcome: NavigationOutcome,
    pub observations: Vec<ProcessedObservation>,
}

/// A failed request; the diagnostics are context only, never a partial fix
#[derive(Debug, Error)]
#[error("{error}")]
pub struct NavigationFailure {
    pub error: SightFixError,
    pub observations: Vec<ProcessedObservation>,
}

impl NavigationFailure {
    fn new(error: SightFixError, observations: Vec<ProcessedObservation>) -> Self {
        Self { error, observations }
    }
}

/// Reduces sights and computes fixes according to a [`NavigatorConfig`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Navigator {
    config: NavigatorConfig,
}

impl Navigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Reduce one or three raw observations from `assumed`
    pub fn reduce_inputs(
        &self,
        inputs: &[ObservationInput],
        assumed: &GeodeticPosition,
    ) -> std::result::Result<NavigationReport, NavigationFailure> {
        check_count(inputs.len()).map_err(|e| NavigationFailure::new(e, Vec::new()))?;

        let mut processed = Vec::with_capacity(inputs.len());
        let mut observations = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            match input.to_observation() {
                Ok(observation) => {
                    processed.push(ProcessedObservation {
                        index,
                        observation: Some(observation),
                        lop: None,
                        error: None,
                    });
                    observations.push(observation);
                }
                Err(e) => {
                    let error = e.at_observation(index);
                    processed.push(ProcessedObservation {
                        index,
                        observation: None,
                        lop: None,
                        error: Some(error.to_string()),
                    });
                    return Err(NavigationFailure::new(error, processed));
                }
            }
        }

        self.reduce_validated(&observations, assumed, processed)
    }

    /// Reduce one or three observations from `assumed`
    pub fn reduce(
        &self,
        observations: &[Observation],
        assumed: &GeodeticPosition,
    ) -> std::result::Result<NavigationReport, NavigationFailure> {
        check_count(observations.len()).map_err(|e| NavigationFailure::new(e, Vec::new()))?;

        let processed = observations
            .iter()
            .enumerate()
            .map(|(index, observation)| ProcessedObservation {
                index,
                observation: Some(*observation),
                lop: None,
                error: None,
            })
            .collect();

        self.reduce_validated(observations, assumed, processed)
    }

    fn reduce_validated(
        &self,
        observations: &[Observation],
        assumed: &GeodeticPosition,
        mut processed: Vec<ProcessedObservation>,
    ) -> std::result::Result<NavigationReport, NavigationFailure> {
        debug!(
            "Reducing {} observation(s) from {} ({:?})",
            observations.len(),
            assumed,
            assumed.convention()
        );

        let mut lops = Vec::with_capacity(observations.len());
        for (index, observation) in observations.iter().enumerate() {
            match build_lop(observation, assumed) {
                Ok(lop) => {
                    processed[index].lop = Some(lop);
                    lops.push(lop);
                }
                Err(e) => {
                    let error = e.at_observation(index);
                    processed[index].error = Some(error.to_string());
                    processed.truncate(index + 1);
                    return Err(NavigationFailure::new(error, processed));
                }
            }
        }

        let outcome = if lops.len() == SINGLE_SIGHT {
            info!("Line of position: {}", lops[0]);
            NavigationOutcome::Lop(lops[0])
        } else {
            match self.config.strategy.solve(&lops, assumed) {
                Ok(fix) => {
                    info!(
                        "Fix by {}: {} (spread {:.2} NM, error estimate {:.2} NM)",
                        fix.method, fix.position, fix.spread_nm, fix.error_estimate_nm
                    );
                    NavigationOutcome::Fix(fix)
                }
                Err(e) => return Err(NavigationFailure::new(e, processed)),
            }
        };

        Ok(NavigationReport {
            outcome,
            observations: processed,
        })
    }
}

/// Only single sights and three-sight fixes are accepted
fn check_count(count: usize) -> Result<()> {
    if count == SINGLE_SIGHT || count == FIX_SIGHTS {
        Ok(())
    } else {
        Err(SightFixError::ObservationCount(count))
    }
}
