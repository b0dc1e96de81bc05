//! # Sky-plane coordinate conversions
//!
//! Conversions between the two representations of a companion's offset from its
//! host star:
//!
//! - **RA/Dec offsets** `(Δα*, Δδ)`: Cartesian, East and North, in milliarcseconds.
//! - **Separation / position angle** `(ρ, θ)`: polar, with `θ` measured from North
//!   through East in degrees, normalized into `[0°, 360°)`.
//!
//! The astrometric convention puts East first in the arctangent:
//! `θ = atan2(Δα*, Δδ)`.

use ndarray::{Array1, ArrayView1, Zip};

use crate::{
    constants::{Degree, MilliArcSec, RADEG},
    orbitfit_errors::OrbitFitError,
};

/// Convert a single RA/Dec offset pair into separation and position angle.
///
/// Return
/// ------
/// * `(sep, pa)` with `sep` in the unit of the inputs and `pa` in degrees in `[0, 360)`.
pub fn radec_to_seppa(ra: MilliArcSec, dec: MilliArcSec) -> (MilliArcSec, Degree) {
    let sep = (ra * ra + dec * dec).sqrt();
    let pa = (ra.atan2(dec) / RADEG).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    let pa = if pa >= 360.0 { 0.0 } else { pa };
    (sep, pa)
}

/// Convert a single separation / position angle pair into RA/Dec offsets.
pub fn seppa_to_radec(sep: MilliArcSec, pa: Degree) -> (MilliArcSec, MilliArcSec) {
    let pa = pa * RADEG;
    (sep * pa.sin(), sep * pa.cos())
}

/// Convert arrays of RA/Dec offsets into separations and position angles.
///
/// Arguments
/// ---------
/// * `ra`: RA offsets (East positive).
/// * `dec`: Dec offsets (North positive), same length as `ra`.
///
/// Return
/// ------
/// * `(separations, position_angles)`, position angles in degrees in `[0, 360)`,
///   or [`OrbitFitError::Shape`] if the inputs differ in length.
pub fn radec2seppa(
    ra: ArrayView1<f64>,
    dec: ArrayView1<f64>,
) -> Result<(Array1<f64>, Array1<f64>), OrbitFitError> {
    if ra.len() != dec.len() {
        return Err(OrbitFitError::Shape(format!(
            "radec2seppa: ra has {} elements but dec has {}",
            ra.len(),
            dec.len()
        )));
    }

    let mut sep = Array1::zeros(ra.len());
    let mut pa = Array1::zeros(ra.len());
    Zip::from(&mut sep)
        .and(&mut pa)
        .and(&ra)
        .and(&dec)
        .for_each(|s, p, &r, &d| (*s, *p) = radec_to_seppa(r, d));

    Ok((sep, pa))
}

/// Convert arrays of separations and position angles (degrees) into RA/Dec offsets.
pub fn seppa2radec(
    sep: ArrayView1<f64>,
    pa: ArrayView1<f64>,
) -> Result<(Array1<f64>, Array1<f64>), OrbitFitError> {
    if sep.len() != pa.len() {
        return Err(OrbitFitError::Shape(format!(
            "seppa2radec: sep has {} elements but pa has {}",
            sep.len(),
            pa.len()
        )));
    }

    let mut ra = Array1::zeros(sep.len());
    let mut dec = Array1::zeros(sep.len());
    Zip::from(&mut ra)
        .and(&mut dec)
        .and(&sep)
        .and(&pa)
        .for_each(|r, d, &s, &p| (*r, *d) = seppa_to_radec(s, p));

    Ok((ra, dec))
}
