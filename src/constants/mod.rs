//! Constants module for sight reduction and fixing

use std::f64::consts::PI;

// Time constants
/// Hours in a day
pub const DAY_H: f64 = 24.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Days in a Julian century
pub const JULIAN_CENTURY_DAYS: f64 = 36_525.0;

// GMST polynomial (IAU 1982, degrees) in days/centuries from J2000.0
/// GMST at J2000.0 in degrees
pub const GMST_AT_J2000_DEG: f64 = 280.460_618_37;
/// GMST rate in degrees per day
pub const GMST_RATE_DEG_PER_DAY: f64 = 360.985_647_366_29;
/// Coefficient of T² in degrees
pub const GMST_T2_DEG: f64 = 0.000_387_933;
/// Divisor of T³ in degrees
pub const GMST_T3_DIVISOR: f64 = 38_710_000.0;

// Angles
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Degrees of arc per hour of right ascension
pub const DEG_PER_HOUR: f64 = 15.0;

// Navigation
/// Nautical miles per degree of great-circle arc (one arcminute = one NM)
pub const NM_PER_DEG: f64 = 60.0;
/// Below this |cos(latitude)| a longitude step is skipped (pole guard)
pub const POLE_COS_GUARD: f64 = 1e-9;
/// Number of observations that yields a single line of position
pub const SINGLE_SIGHT: usize = 1;
/// Number of observations that yields a fix
pub const FIX_SIGHTS: usize = 3;
/// Number of unknowns in the fix (north and east offsets)
pub const FIX_UNKNOWNS: usize = 2;

// Relaxation solver defaults
/// Fixed iteration budget
pub const RELAXATION_MAX_ITERATIONS: usize = 20;
/// Damping applied to the averaged per-iteration move
pub const RELAXATION_LEARNING_RATE: f64 = 0.1;
/// Early-stop threshold on both averaged moves, degrees (~0.006 arcsec)
pub const RELAXATION_MIN_STEP_DEG: f64 = 1e-7 / 60.0;

// Least-squares solver
/// Smallest accepted ratio of singular values of the LOP design matrix
pub const MIN_SINGULAR_RATIO: f64 = 1e-9;
