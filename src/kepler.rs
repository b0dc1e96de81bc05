use std::f64::consts::PI;

use roots::{find_root_newton_raphson, SimpleConvergency};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, Radian, DPI},
    orbitfit_errors::OrbitFitError,
};

/// Iteration budget and tolerance of the Newton solver used on Kepler's equation.
///
/// The iteration cap is a hard bound: a solve that has not converged after
/// `max_iter` Newton steps is reported as an error, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeplerSolverConfig {
    /// Absolute tolerance on the eccentric anomaly step (radians).
    pub tolerance: f64,
    /// Maximum number of Newton iterations.
    pub max_iter: usize,
}

impl Default for KeplerSolverConfig {
    fn default() -> Self {
        KeplerSolverConfig {
            tolerance: 1e-12,
            max_iter: 100,
        }
    }
}

/// Return the principal value of an angle in radians, in [0, 2π).
pub fn principal_angle(a: Radian) -> Radian {
    a.rem_euclid(DPI)
}

/// Return the principal difference between two angles, in [-π, π].
pub fn angle_diff(a: Radian, b: Radian) -> Radian {
    let a = principal_angle(a);
    let b = principal_angle(b);

    let mut diff = a - b;

    if diff > PI {
        diff -= DPI;
    } else if diff < -PI {
        diff += DPI;
    }

    diff
}

/// Wrap an angular difference in degrees into [-180°, 180°).
pub fn wrap_angle_deg(diff: Degree) -> Degree {
    (diff + 180.0).rem_euclid(360.0) - 180.0
}

/// Solve Kepler's equation `E - e·sin(E) = M` for the eccentric anomaly.
///
/// Newton-Raphson is started from `E₀ = π`, a starting point for which the
/// iteration converges monotonically for every `M ∈ [0, 2π)` and `0 ≤ e < 1`.
/// The mean anomaly is first reduced to its principal value.
///
/// Arguments
/// ---------
/// * `mean_anomaly`: mean anomaly `M` (radians, any value).
/// * `eccentricity`: orbital eccentricity, expected in `[0, 1)`.
/// * `config`: tolerance and hard iteration cap.
///
/// Return
/// ------
/// * The eccentric anomaly `E` in radians, or [`OrbitFitError::RootFinding`] if the
///   solver hit the iteration cap or met a zero derivative.
pub fn solve_kepler_equation(
    mean_anomaly: Radian,
    eccentricity: f64,
    config: &KeplerSolverConfig,
) -> Result<Radian, OrbitFitError> {
    let mean_anomaly = principal_angle(mean_anomaly);

    let f = |ecc_anom: f64| -> f64 { ecc_anom - eccentricity * ecc_anom.sin() - mean_anomaly };
    let df = |ecc_anom: f64| -> f64 { 1.0 - eccentricity * ecc_anom.cos() };

    let mut convergency = SimpleConvergency {
        eps: config.tolerance,
        max_iter: config.max_iter,
    };

    Ok(find_root_newton_raphson(PI, &f, &df, &mut convergency)?)
}

/// True anomaly from the eccentric anomaly, in (-π, π].
pub fn true_anomaly(eccentric_anomaly: Radian, eccentricity: f64) -> Radian {
    let half = 0.5 * eccentric_anomaly;
    2.0 * ((1.0 + eccentricity).sqrt() * half.sin()).atan2((1.0 - eccentricity).sqrt() * half.cos())
}
