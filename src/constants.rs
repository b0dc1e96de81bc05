//! # Constants and type aliases for orbitfit
//!
//! This module centralizes the **physical constants**, **conversion factors** and
//! **unit aliases** shared by the prior builder, the orbit model and the likelihood.
//!
//! ## Units used across the crate
//!
//! - Semi-major axis: **AU**
//! - Total mass: **solar masses**
//! - Parallax, RA/Dec offsets and separations: **milliarcseconds**
//! - Orbital angles (inclination, argument of periastron, position angle of nodes): **radians**
//! - Position angles of measurements: **degrees**, North through East
//! - Epochs: **MJD** (days)

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Gaussian gravitational constant k (rad/day for 1 AU and 1 solar mass)
pub const GAUSS_GRAV: f64 = 0.01720209895;

/// Number of days in a Julian year
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Number of orbital elements allocated per secondary body
pub const ELEMENTS_PER_BODY: usize = 6;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Angle in milliarcseconds
pub type MilliArcSec = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Mass in solar masses
pub type SolarMass = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
