//! Sightfix: celestial navigation sight reduction and position fixing
//!
//! This crate turns sextant observations of celestial bodies into lines of
//! position by the intercept method, and combines three lines of position into
//! a fix, either by damped iterative relaxation or by linear least squares.
//!
//! ```
//! use sightfix::coordinates::{CelestialTarget, GeodeticPosition};
//! use sightfix::sight::{build_lop, Observation};
//! use sightfix::time::Instant;
//!
//! let assumed = GeodeticPosition::west_positive(49.5, 0.1).unwrap();
//! let observation = Observation::new(
//!     Instant::parse("2025-05-17 21:59:31").unwrap(),
//!     CelestialTarget::new(208.488, 4.968).unwrap(),
//!     35.22,
//! )
//! .unwrap();
//!
//! let lop = build_lop(&observation, &assumed).unwrap();
//! assert!((lop.intercept_nm + 610.937).abs() < 0.01);
//! ```

use thiserror::Error;

pub mod constants;
pub mod coordinates;
pub mod fix;
pub mod horizon;
pub mod navigator;
pub mod sight;
pub mod time;

// Re-export commonly used types
pub use coordinates::{CelestialTarget, GeodeticPosition, LongitudeConvention};
pub use fix::{FixResult, FixSolver, FixStrategy};
pub use navigator::{NavigationOutcome, Navigator, NavigatorConfig};
pub use sight::{build_lop, LopRecord, Observation};
pub use time::{Instant, TimeError};

/// Main error type for the sightfix library
#[derive(Debug, Error)]
pub enum SightFixError {
    #[error("Latitude {0}° is outside [-90, 90]")]
    InvalidLatitude(f64),

    #[error("Declination {0}° is outside [-90, 90]")]
    InvalidDeclination(f64),

    #[error("Non-finite value for {field}: {value}")]
    NonFiniteInput { field: &'static str, value: f64 },

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Observation {index}: {source}")]
    InvalidObservation {
        index: usize,
        #[source]
        source: Box<SightFixError>,
    },

    #[error("Time error: {0}")]
    Time(#[from] TimeError),

    #[error("Expected 1 or 3 observations, got {0}")]
    ObservationCount(usize),

    #[error("A fix needs at least {required} lines of position, got {provided}")]
    InsufficientLops { required: usize, provided: usize },

    #[error("Line of position {index} is unusable: {reason}")]
    InvalidLop { index: usize, reason: String },

    #[error("Lines of position are degenerate (condition number {condition_number:e})")]
    DegenerateGeometry { condition_number: f64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SightFixError {
    /// Attach the index of the observation that produced this error
    pub fn at_observation(self, index: usize) -> Self {
        SightFixError::InvalidObservation {
            index,
            source: Box::new(self),
        }
    }
}

/// Result type for sightfix operations
pub type Result<T> = std::result::Result<T, SightFixError>;
