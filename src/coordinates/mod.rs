//! Coordinates used by sight reduction: observer positions, body positions, angle helpers

pub mod angle;
pub mod equatorial;
pub mod geodetic;

pub use angle::{normalize_0_360, normalize_pm180};
pub use equatorial::CelestialTarget;
pub use geodetic::{GeodeticPosition, LongitudeConvention};
