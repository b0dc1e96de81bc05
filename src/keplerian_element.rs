//! # Keplerian orbital elements of one companion
//!
//! The six elements sampled per body, in parameter-vector order:
//!
//! 1. **a** – Semi-major axis (AU)
//! 2. **e** – Eccentricity (unitless, `[0, 1)`)
//! 3. **i** – Inclination (radians)
//! 4. **ω** – Argument of periastron (radians)
//! 5. **Ω** – Position angle of nodes (radians)
//! 6. **τ** – Epoch of periastron passage (MJD)
//!
//! Together with the total mass and parallax they map any epoch to a relative
//! sky-plane offset through [`OrbitState::solve`].
//!
//! ## Sky projection
//!
//! The orbital-plane position `(r cos ν, r sin ν, 0)` is rotated by
//! `R = R_z(Ω) · R_x(i) · R_z(ω)`. The first rotated component points North (Δδ), the
//! second East (Δα*), which reproduces the Thiele–Innes form
//!
//! ```text
//! Δα* = ϖ r [cos²(i/2) sin(ν+ω+Ω) − sin²(i/2) sin(ν+ω−Ω)]
//! Δδ  = ϖ r [cos²(i/2) cos(ν+ω+Ω) + sin²(i/2) cos(ν+ω−Ω)]
//! ```

use nalgebra::{Matrix3, Rotation3, Vector3};
use ndarray::ArrayView1;

use crate::{
    constants::{AstronomicalUnit, MilliArcSec, Radian, SolarMass, GAUSS_GRAV, MJD},
    kepler::{principal_angle, solve_kepler_equation, true_anomaly, KeplerSolverConfig},
    orbitfit_errors::OrbitFitError,
    system::layout::ParameterLayout,
};

#[derive(Debug, PartialEq, Clone)]
pub struct KeplerianElements {
    pub semi_major_axis: AstronomicalUnit,
    pub eccentricity: f64,
    pub inclination: Radian,
    pub periapsis_argument: Radian,
    pub ascending_node_longitude: Radian,
    pub periapsis_epoch: MJD,
}

impl KeplerianElements {
    /// Read the elements of `body` (1-based) from a parameter vector.
    ///
    /// Fails with [`OrbitFitError::Shape`] when the vector does not match the layout and
    /// with [`OrbitFitError::InvalidElements`] for a non-positive semi-major axis or an
    /// eccentricity outside `[0, 1)`.
    pub fn from_params(
        layout: &ParameterLayout,
        params: ArrayView1<f64>,
        body: usize,
    ) -> Result<Self, OrbitFitError> {
        layout.check_len(params.len())?;
        let offset = layout.body_offset(body).ok_or_else(|| {
            OrbitFitError::Shape(format!(
                "body {body} is outside 1..={}",
                layout.num_bodies()
            ))
        })?;

        let elements = KeplerianElements {
            semi_major_axis: params[offset],
            eccentricity: params[offset + 1],
            inclination: params[offset + 2],
            periapsis_argument: params[offset + 3],
            ascending_node_longitude: params[offset + 4],
            periapsis_epoch: params[offset + 5],
        };
        elements.validate()?;
        Ok(elements)
    }

    fn validate(&self) -> Result<(), OrbitFitError> {
        if !(self.semi_major_axis > 0.0) {
            return Err(OrbitFitError::InvalidElements(format!(
                "semi-major axis must be positive, got {}",
                self.semi_major_axis
            )));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(OrbitFitError::InvalidElements(format!(
                "eccentricity must lie in [0, 1), got {}",
                self.eccentricity
            )));
        }
        Ok(())
    }

    /// Mean motion (rad/day) from Kepler's third law.
    pub fn mean_motion(&self, total_mass: SolarMass) -> Result<f64, OrbitFitError> {
        if !(total_mass > 0.0) {
            return Err(OrbitFitError::InvalidElements(format!(
                "total mass must be positive, got {total_mass}"
            )));
        }
        Ok(GAUSS_GRAV * (total_mass / self.semi_major_axis.powi(3)).sqrt())
    }

    /// Mean anomaly at `epoch`, reduced to [0, 2π).
    pub fn mean_anomaly(&self, mean_motion: f64, epoch: MJD) -> Radian {
        principal_angle(mean_motion * (epoch - self.periapsis_epoch))
    }

    /// Rotation from the orbital plane (x towards periastron) to the sky frame (North, East, -LOS).
    pub fn sky_rotation(&self) -> Matrix3<f64> {
        let node = Rotation3::from_axis_angle(&Vector3::z_axis(), self.ascending_node_longitude);
        let incl = Rotation3::from_axis_angle(&Vector3::x_axis(), self.inclination);
        let peri = Rotation3::from_axis_angle(&Vector3::z_axis(), self.periapsis_argument);
        (node * incl * peri).into_inner()
    }
}

/// Solved position of one body at one epoch for one parameter sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub mean_anomaly: Radian,
    pub eccentric_anomaly: Radian,
    pub true_anomaly: Radian,
    pub radius: AstronomicalUnit,
    pub ra: MilliArcSec,
    pub dec: MilliArcSec,
}

impl OrbitState {
    /// Propagate `elements` to `epoch` and project onto the sky.
    ///
    /// Arguments
    /// ---------
    /// * `elements`: the body's Keplerian elements.
    /// * `rotation`: [`KeplerianElements::sky_rotation`] of the same elements.
    /// * `mean_motion`: [`KeplerianElements::mean_motion`] of the same elements.
    /// * `parallax`: system parallax (mas), scales AU to mas.
    /// * `epoch`: evaluation epoch (MJD).
    /// * `solver`: Kepler solver settings.
    pub fn solve(
        elements: &KeplerianElements,
        rotation: &Matrix3<f64>,
        mean_motion: f64,
        parallax: MilliArcSec,
        epoch: MJD,
        solver: &KeplerSolverConfig,
    ) -> Result<Self, OrbitFitError> {
        let ecc = elements.eccentricity;
        let mean_anomaly = elements.mean_anomaly(mean_motion, epoch);
        let eccentric_anomaly = solve_kepler_equation(mean_anomaly, ecc, solver)?;
        let nu = true_anomaly(eccentric_anomaly, ecc);
        let radius = elements.semi_major_axis * (1.0 - ecc * eccentric_anomaly.cos());

        let sky = rotation * Vector3::new(radius * nu.cos(), radius * nu.sin(), 0.0);

        Ok(OrbitState {
            mean_anomaly,
            eccentric_anomaly,
            true_anomaly: nu,
            radius,
            ra: parallax * sky.y,
            dec: parallax * sky.x,
        })
    }
}
