//! # Scalar priors for orbit fitting
//!
//! A [`Prior`] is a closed set of one-dimensional distributions, one per slot of the
//! parameter vector. Each variant exposes the same two operations:
//!
//! - [`Prior::log_density`] – normalized log-probability density, `-∞` outside the support.
//! - [`Prior::sample`] – one independent draw from a caller-provided RNG.
//!
//! Supports
//! --------
//! | Variant      | Support        | Density                          |
//! |--------------|----------------|----------------------------------|
//! | `Fixed`      | `{value}`      | point mass (log-density 0)       |
//! | `Uniform`    | `[lo, hi)`     | `1 / (hi - lo)`                  |
//! | `LogUniform` | `[lo, hi]`     | `1 / (x · ln(hi / lo))`          |
//! | `Sine`       | `[0, π]`       | `sin(x) / 2`                     |
//! | `Gaussian`   | `ℝ`            | `N(mean, std)`                   |
//!
//! The sine prior is the inclination prior of an isotropically oriented orbital plane.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::orbitfit_errors::OrbitFitError;

/// `ln(sqrt(2π))`
const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Prior {
    Fixed { value: f64 },
    Uniform { lo: f64, hi: f64 },
    LogUniform { lo: f64, hi: f64 },
    Sine,
    Gaussian { mean: f64, std: f64 },
}

impl Prior {
    pub fn fixed(value: f64) -> Result<Self, OrbitFitError> {
        if !value.is_finite() {
            return Err(OrbitFitError::InvalidPrior(format!(
                "fixed value must be finite, got {value}"
            )));
        }
        Ok(Prior::Fixed { value })
    }

    pub fn uniform(lo: f64, hi: f64) -> Result<Self, OrbitFitError> {
        if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
            return Err(OrbitFitError::InvalidPrior(format!(
                "uniform bounds must be finite with lo < hi, got [{lo}, {hi})"
            )));
        }
        Ok(Prior::Uniform { lo, hi })
    }

    pub fn log_uniform(lo: f64, hi: f64) -> Result<Self, OrbitFitError> {
        if !(lo.is_finite() && hi.is_finite()) || lo <= 0.0 || lo >= hi {
            return Err(OrbitFitError::InvalidPrior(format!(
                "log-uniform bounds must be finite with 0 < lo < hi, got [{lo}, {hi}]"
            )));
        }
        Ok(Prior::LogUniform { lo, hi })
    }

    pub fn gaussian(mean: f64, std: f64) -> Result<Self, OrbitFitError> {
        if !mean.is_finite() || !std.is_finite() || std <= 0.0 {
            return Err(OrbitFitError::InvalidPrior(format!(
                "gaussian needs a finite mean and std > 0, got N({mean}, {std})"
            )));
        }
        Ok(Prior::Gaussian { mean, std })
    }

    /// Check the variant parameters, for priors built directly from the enum.
    pub fn validate(&self) -> Result<(), OrbitFitError> {
        match *self {
            Prior::Fixed { value } => Prior::fixed(value).map(|_| ()),
            Prior::Uniform { lo, hi } => Prior::uniform(lo, hi).map(|_| ()),
            Prior::LogUniform { lo, hi } => Prior::log_uniform(lo, hi).map(|_| ()),
            Prior::Sine => Ok(()),
            Prior::Gaussian { mean, std } => Prior::gaussian(mean, std).map(|_| ()),
        }
    }

    /// Log of the prior density at `x`, `-∞` outside the support.
    pub fn log_density(&self, x: f64) -> f64 {
        match *self {
            Prior::Fixed { value } => {
                if x == value {
                    0.0
                } else {
                    f64::NEG_INFINITY
                }
            }
            Prior::Uniform { lo, hi } => {
                if (lo..hi).contains(&x) {
                    -(hi - lo).ln()
                } else {
                    f64::NEG_INFINITY
                }
            }
            Prior::LogUniform { lo, hi } => {
                if (lo..=hi).contains(&x) {
                    -x.ln() - (hi / lo).ln().ln()
                } else {
                    f64::NEG_INFINITY
                }
            }
            Prior::Sine => {
                if (0.0..=PI).contains(&x) {
                    (0.5 * x.sin()).ln()
                } else {
                    f64::NEG_INFINITY
                }
            }
            Prior::Gaussian { mean, std } => {
                let z = (x - mean) / std;
                -0.5 * z * z - std.ln() - LN_SQRT_2PI
            }
        }
    }

    /// Draw one value from the prior.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, OrbitFitError> {
        let u: f64 = rng.random();
        let value = match *self {
            Prior::Fixed { value } => value,
            Prior::Uniform { lo, hi } => lo + (hi - lo) * u,
            Prior::LogUniform { lo, hi } => (lo.ln() + (hi / lo).ln() * u).exp().clamp(lo, hi),
            Prior::Sine => (1.0 - 2.0 * u).acos(),
            Prior::Gaussian { mean, std } => Normal::new(mean, std)?.sample(rng),
        };
        Ok(value)
    }

    /// Draw `n` independent values from the prior.
    pub fn sample_n<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
    ) -> Result<Vec<f64>, OrbitFitError> {
        (0..n).map(|_| self.sample(rng)).collect()
    }

    /// `true` when the prior pins the parameter to a single value.
    pub fn is_fixed(&self) -> bool {
        matches!(self, Prior::Fixed { .. })
    }
}

impl std::fmt::Display for Prior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prior::Fixed { value } => write!(f, "Fixed({value})"),
            Prior::Uniform { lo, hi } => write!(f, "Uniform({lo}, {hi})"),
            Prior::LogUniform { lo, hi } => write!(f, "LogUniform({lo}, {hi})"),
            Prior::Sine => write!(f, "Sine"),
            Prior::Gaussian { mean, std } => write!(f, "Gaussian({mean}, {std})"),
        }
    }
}

#[cfg(test)]
mod priors_test {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_constructors_reject_bad_parameters() {
        assert!(Prior::uniform(1.0, 1.0).is_err());
        assert!(Prior::uniform(2.0, 1.0).is_err());
        assert!(Prior::log_uniform(0.0, 1.0).is_err());
        assert!(Prior::log_uniform(-1.0, 1.0).is_err());
        assert!(Prior::gaussian(1.0, 0.0).is_err());
        assert!(Prior::gaussian(f64::NAN, 1.0).is_err());
        assert!(Prior::fixed(f64::INFINITY).is_err());
        assert!(Prior::Uniform { lo: 3.0, hi: 1.0 }.validate().is_err());
        assert!(Prior::Sine.validate().is_ok());
    }

    #[test]
    fn test_uniform_log_density() {
        let prior = Prior::uniform(0.0, 2.0).unwrap();
        assert_relative_eq!(prior.log_density(1.0), -(2f64.ln()), epsilon = 1e-15);
        assert_eq!(prior.log_density(2.0), f64::NEG_INFINITY);
        assert_eq!(prior.log_density(-0.1), f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_uniform_log_density() {
        let prior = Prior::log_uniform(1.0, 100.0).unwrap();
        let expected = -(10f64.ln()) - (100f64.ln()).ln();
        assert_relative_eq!(prior.log_density(10.0), expected, epsilon = 1e-14);
        assert_eq!(prior.log_density(0.5), f64::NEG_INFINITY);
    }

    #[test]
    fn test_sine_log_density() {
        let prior = Prior::Sine;
        assert_relative_eq!(prior.log_density(PI / 2.), 0.5f64.ln(), epsilon = 1e-15);
        assert_eq!(prior.log_density(-0.1), f64::NEG_INFINITY);
        assert_eq!(prior.log_density(PI + 0.1), f64::NEG_INFINITY);
    }

    #[test]
    fn test_gaussian_log_density() {
        let prior = Prior::gaussian(10.0, 2.0).unwrap();
        assert_relative_eq!(
            prior.log_density(10.0),
            -(2f64.ln()) - LN_SQRT_2PI,
            epsilon = 1e-14
        );
        assert_relative_eq!(prior.log_density(8.0), prior.log_density(12.0), epsilon = 1e-14);
    }

    #[test]
    fn test_fixed_prior() {
        let prior = Prior::fixed(3.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(prior.sample(&mut rng).unwrap(), 3.0);
        assert_eq!(prior.log_density(3.0), 0.0);
        assert_eq!(prior.log_density(3.1), f64::NEG_INFINITY);
        assert!(prior.is_fixed());
    }

    #[test]
    fn test_samples_lie_in_support() {
        let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
        let priors = [
            Prior::uniform(0.0, 1.0).unwrap(),
            Prior::log_uniform(0.001, 1e4).unwrap(),
            Prior::Sine,
            Prior::gaussian(10.0, 0.5).unwrap(),
        ];

        for prior in priors {
            for x in prior.sample_n(&mut rng, 2000).unwrap() {
                assert!(prior.log_density(x).is_finite(), "{prior} drew {x}");
            }
        }
    }

    #[test]
    fn test_sine_sample_mean() {
        // E[x] = π/2 for the sine prior on [0, π]
        let mut rng = StdRng::seed_from_u64(7);
        let draws = Prior::Sine.sample_n(&mut rng, 20_000).unwrap();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - PI / 2.).abs() < 0.05, "mean = {mean}");
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let prior = Prior::gaussian(0.0, 1.0).unwrap();
        let a = prior.sample_n(&mut StdRng::seed_from_u64(1), 10).unwrap();
        let b = prior.sample_n(&mut StdRng::seed_from_u64(1), 10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_tagged_representation() {
        let prior: Prior = serde_json::from_str(r#"{"kind":"log_uniform","lo":0.1,"hi":10.0}"#)
            .unwrap();
        assert_eq!(prior, Prior::LogUniform { lo: 0.1, hi: 10.0 });

        let sine: Prior = serde_json::from_str(r#"{"kind":"sine"}"#).unwrap();
        assert_eq!(sine, Prior::Sine);
    }
}
