//! Geodetic positions on the navigator's chart
//!
//! Longitude sign conventions differ between callers, so a position always
//! carries the [`LongitudeConvention`] its caller speaks. Internally the value
//! is held west-positive; the convention only matters on the way in and out.

use crate::coordinates::angle::normalize_pm180;
use crate::{Result, SightFixError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign convention of a longitude value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongitudeConvention {
    /// East longitudes positive, west negative (ISO 6709, GPS)
    EastPositive,
    /// West longitudes positive, east negative (traditional almanac usage)
    WestPositive,
}

impl LongitudeConvention {
    /// Convert a longitude expressed in this convention to west-positive
    pub fn to_west_positive(self, longitude_deg: f64) -> f64 {
        match self {
            LongitudeConvention::EastPositive => normalize_pm180(-longitude_deg),
            LongitudeConvention::WestPositive => normalize_pm180(longitude_deg),
        }
    }

    /// Express a west-positive longitude in this convention
    pub fn from_west_positive(self, longitude_west_deg: f64) -> f64 {
        match self {
            LongitudeConvention::EastPositive => normalize_pm180(-longitude_west_deg),
            LongitudeConvention::WestPositive => normalize_pm180(longitude_west_deg),
        }
    }
}

/// A latitude/longitude pair with an explicit longitude convention
///
/// Invariants: latitude is finite and within [-90, 90]; the stored
/// west-positive longitude is finite and within (-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeodeticRecord", into = "GeodeticRecord")]
pub struct GeodeticPosition {
    latitude_deg: f64,
    longitude_west_deg: f64,
    convention: LongitudeConvention,
}

/// Wire shape of a [`GeodeticPosition`]: the longitude is in `convention`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeodeticRecord {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub convention: LongitudeConvention,
}

impl GeodeticPosition {
    /// Create a position from a longitude expressed in `convention`
    ///
    /// Rejects non-finite values and latitudes outside [-90, 90].
    pub fn new(latitude_deg: f64, longitude_deg: f64, convention: LongitudeConvention) -> Result<Self> {
        if !latitude_deg.is_finite() {
            return Err(SightFixError::NonFiniteInput {
                field: "latitude_deg",
                value: latitude_deg,
            });
        }
        if !longitude_deg.is_finite() {
            return Err(SightFixError::NonFiniteInput {
                field: "longitude_deg",
                value: longitude_deg,
            });
        }
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(SightFixError::InvalidLatitude(latitude_deg));
        }

        Ok(Self {
            latitude_deg,
            longitude_west_deg: convention.to_west_positive(longitude_deg),
            convention,
        })
    }

    /// Create a position from an east-positive longitude
    pub fn east_positive(latitude_deg: f64, longitude_east_deg: f64) -> Result<Self> {
        Self::new(latitude_deg, longitude_east_deg, LongitudeConvention::EastPositive)
    }

    /// Create a position from a west-positive longitude
    pub fn west_positive(latitude_deg: f64, longitude_west_deg: f64) -> Result<Self> {
        Self::new(latitude_deg, longitude_west_deg, LongitudeConvention::WestPositive)
    }

    /// Build a position from solver output, clamping latitude into [-90, 90]
    pub(crate) fn from_west_clamped(
        latitude_deg: f64,
        longitude_west_deg: f64,
        convention: LongitudeConvention,
    ) -> Self {
        Self {
            latitude_deg: latitude_deg.clamp(-90.0, 90.0),
            longitude_west_deg: normalize_pm180(longitude_west_deg),
            convention,
        }
    }

    /// Latitude in degrees, north positive
    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    /// Longitude in degrees, in this position's own convention
    pub fn longitude_deg(&self) -> f64 {
        self.convention.from_west_positive(self.longitude_west_deg)
    }

    /// Longitude in degrees, west positive
    pub fn longitude_west_deg(&self) -> f64 {
        self.longitude_west_deg
    }

    /// Longitude in degrees, east positive
    pub fn longitude_east_deg(&self) -> f64 {
        LongitudeConvention::EastPositive.from_west_positive(self.longitude_west_deg)
    }

    /// The convention this position reports its longitude in
    pub fn convention(&self) -> LongitudeConvention {
        self.convention
    }

    /// The same point reported in another convention
    pub fn with_convention(self, convention: LongitudeConvention) -> Self {
        Self { convention, ..self }
    }
}

impl TryFrom<GeodeticRecord> for GeodeticPosition {
    type Error = SightFixError;

    fn try_from(record: GeodeticRecord) -> Result<Self> {
        Self::new(record.latitude_deg, record.longitude_deg, record.convention)
    }
}

impl From<GeodeticPosition> for GeodeticRecord {
    fn from(position: GeodeticPosition) -> Self {
        Self {
            latitude_deg: position.latitude_deg,
            longitude_deg: position.longitude_deg(),
            convention: position.convention,
        }
    }
}

impl fmt::Display for GeodeticPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat = self.latitude_deg;
        let lon_east = self.longitude_east_deg();
        write!(
            f,
            "{:.5}°{} {:.5}°{}",
            lat.abs(),
            if lat < 0.0 { 'S' } else { 'N' },
            lon_east.abs(),
            if lon_east < 0.0 { 'W' } else { 'E' }
        )
    }
}
