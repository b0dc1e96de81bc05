//! # System: parameter space, priors and data partition
//!
//! [`System`] is the immutable configuration object shared by every model and
//! likelihood evaluation of one fit. It is built once from
//!
//! 1. the number of secondary bodies,
//! 2. the [`MeasurementTable`] of relative astrometry,
//! 3. the system-level knowns (total mass, parallax) and their uncertainties,
//! 4. optional overrides of the orbital-element priors ([`PriorConfig`]) and of the
//!    Kepler solver settings ([`KeplerSolverConfig`]).
//!
//! and exposes
//!
//! - the ordered list of [`Prior`]s and the matching labels,
//! - the [`ParameterLayout`] that the sampler's vectors must follow,
//! - the per-body [`MeasurementPartition`] into `seppa` and `radec` rows,
//! - model evaluation at the table epochs and the aggregated log-likelihood.
//!
//! ## Parameter vector
//!
//! ```text
//! sma1 ecc1 inc1 aop1 pan1 epp1 … smaN eccN incN aopN panN eppN [plx] [mtot]
//! ```
//!
//! `plx` is present iff `plx_err > 0`, `mtot` iff `mass_err > 0`; both get a Gaussian
//! prior centred on the known value. A zero error fixes the quantity to its value.
//!
//! ## Example
//!
//! ```rust
//! use orbitfit::measurements::{Measurement, MeasurementTable};
//! use orbitfit::system::System;
//!
//! let table = MeasurementTable::from(vec![
//!     Measurement::radec(1, 55645.95, 2479.0, 16.0, 2114.0, 16.0),
//!     Measurement::seppa(1, 55702.89, 3259.0, 20.0, 49.0, 0.5),
//! ]);
//!
//! let system = System::new(1, table, 1.22, 56.95, 0.08, 0.0).unwrap();
//! assert_eq!(system.labels(), ["sma1", "ecc1", "inc1", "aop1", "pan1", "epp1", "mtot"]);
//! assert_eq!(system.seppa(1), &[1]);
//! ```
//!
//! ## Concurrency
//!
//! A `System` has no interior mutability: it is `Send + Sync` and every method takes
//! `&self`, so any number of threads may evaluate models against the same instance.

pub mod layout;

use ndarray::{Array1, Array2, Array3, ArrayD, ArrayView1, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    constants::{MilliArcSec, SolarMass, DAYS_PER_YEAR, DPI, MJD},
    conversion::radec_to_seppa,
    kepler::KeplerSolverConfig,
    lnlike::chi2_lnlike,
    measurements::{BodyRows, MeasurementPartition, MeasurementTable},
    orbit_model::{compute_model, compute_model_full, ParamVectors},
    orbitfit_errors::OrbitFitError,
    priors::Prior,
};

use self::layout::ParameterLayout;

/// Width of the default window for the epoch of periastron passage (days).
pub const DEFAULT_EPP_WINDOW: f64 = 1000.0 * DAYS_PER_YEAR;

/// Priors applied to the orbital elements of every body.
///
/// Any field left to `None` falls back to the default listed on the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorConfig {
    /// Semi-major axis (AU). Default: `LogUniform(0.001, 1e4)`.
    pub sma: Option<Prior>,
    /// Eccentricity. Default: `Uniform(0, 1)`.
    pub ecc: Option<Prior>,
    /// Inclination (rad). Default: `Sine`.
    pub inc: Option<Prior>,
    /// Argument of periastron (rad). Default: `Uniform(0, 2π)`.
    pub aop: Option<Prior>,
    /// Position angle of nodes (rad). Default: `Uniform(0, 2π)`.
    pub pan: Option<Prior>,
    /// Epoch of periastron passage (MJD). Default: `Uniform(t0 − 1000 yr, t0)`, `t0` the
    /// earliest measurement epoch.
    pub epp: Option<Prior>,
}

impl PriorConfig {
    /// Resolve the six element priors, in slot order.
    fn element_priors(&self, reference_epoch: MJD) -> Result<[Prior; 6], OrbitFitError> {
        let resolve = |prior: Option<Prior>, default: Prior| -> Result<Prior, OrbitFitError> {
            let prior = prior.unwrap_or(default);
            prior.validate()?;
            Ok(prior)
        };

        Ok([
            resolve(self.sma, Prior::LogUniform { lo: 0.001, hi: 1e4 })?,
            resolve(self.ecc, Prior::Uniform { lo: 0.0, hi: 1.0 })?,
            resolve(self.inc, Prior::Sine)?,
            resolve(self.aop, Prior::Uniform { lo: 0.0, hi: DPI })?,
            resolve(self.pan, Prior::Uniform { lo: 0.0, hi: DPI })?,
            resolve(
                self.epp,
                Prior::Uniform {
                    lo: reference_epoch - DEFAULT_EPP_WINDOW,
                    hi: reference_epoch,
                },
            )?,
        ])
    }
}

/// Everything needed to build a [`System`] apart from the measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub num_bodies: usize,
    /// Total system mass (solar masses).
    pub total_mass: SolarMass,
    /// Parallax (milliarcseconds).
    pub parallax: MilliArcSec,
    /// 1σ uncertainty on the total mass, `0` to keep it fixed.
    #[serde(default)]
    pub mass_err: f64,
    /// 1σ uncertainty on the parallax, `0` to keep it fixed.
    #[serde(default)]
    pub plx_err: f64,
    #[serde(default)]
    pub priors: PriorConfig,
    #[serde(default)]
    pub solver: KeplerSolverConfig,
}

impl SystemConfig {
    pub fn new(num_bodies: usize, total_mass: SolarMass, parallax: MilliArcSec) -> Self {
        SystemConfig {
            num_bodies,
            total_mass,
            parallax,
            mass_err: 0.0,
            plx_err: 0.0,
            priors: PriorConfig::default(),
            solver: KeplerSolverConfig::default(),
        }
    }

    fn validate(&self) -> Result<(), OrbitFitError> {
        if self.num_bodies == 0 {
            return Err(OrbitFitError::Configuration(
                "the number of secondary bodies must be at least 1".into(),
            ));
        }
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(OrbitFitError::Configuration(format!(
                    "{name} must be finite and positive, got {value}"
                )))
            }
        };
        let non_negative = |name: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(OrbitFitError::Configuration(format!(
                    "{name} must be finite and non-negative, got {value}"
                )))
            }
        };
        positive("total_mass", self.total_mass)?;
        positive("parallax", self.parallax)?;
        non_negative("mass_err", self.mass_err)?;
        non_negative("plx_err", self.plx_err)?;
        if self.solver.max_iter == 0 || self.solver.tolerance.is_nan() || self.solver.tolerance <= 0.0 {
            return Err(OrbitFitError::Configuration(format!(
                "Kepler solver needs max_iter > 0 and tolerance > 0, got {:?}",
                self.solver
            )));
        }
        Ok(())
    }
}

/// Immutable parameter-space and data configuration of one orbit fit.
#[derive(Debug, Clone)]
pub struct System {
    layout: ParameterLayout,
    priors: Vec<Prior>,
    labels: Vec<String>,
    table: MeasurementTable,
    partition: MeasurementPartition,
    epochs: Vec<MJD>,
    solver: KeplerSolverConfig,
}

impl System {
    /// Build a system with the default element priors and solver settings.
    ///
    /// Arguments
    /// ---------
    /// * `num_bodies`: number of secondary bodies (≥ 1).
    /// * `table`: measurements, each row tagged with a body in `1..=num_bodies`.
    /// * `total_mass`: total system mass (solar masses).
    /// * `parallax`: system parallax (mas).
    /// * `mass_err`, `plx_err`: 1σ uncertainties, `0` keeps the quantity fixed.
    ///
    /// Return
    /// ------
    /// * The system, or [`OrbitFitError::Configuration`] on an invalid body count, a row
    ///   tagged with an unknown body, or a negative / non-finite uncertainty.
    pub fn new(
        num_bodies: usize,
        table: MeasurementTable,
        total_mass: SolarMass,
        parallax: MilliArcSec,
        mass_err: f64,
        plx_err: f64,
    ) -> Result<Self, OrbitFitError> {
        let config = SystemConfig {
            mass_err,
            plx_err,
            ..SystemConfig::new(num_bodies, total_mass, parallax)
        };
        System::from_config(config, table)
    }

    /// Build a system from a full [`SystemConfig`].
    pub fn from_config(
        config: SystemConfig,
        table: MeasurementTable,
    ) -> Result<Self, OrbitFitError> {
        config.validate()?;

        let plx_free = config.plx_err > 0.0;
        let mtot_free = config.mass_err > 0.0;
        let layout = ParameterLayout::new(
            config.num_bodies,
            config.parallax,
            plx_free,
            config.total_mass,
            mtot_free,
        )?;

        let partition = MeasurementPartition::from_table(&table, config.num_bodies)?;

        let element_priors = config
            .priors
            .element_priors(table.min_epoch().unwrap_or(0.0))?;
        let mut priors: Vec<Prior> = (0..config.num_bodies)
            .flat_map(|_| element_priors)
            .collect();
        if plx_free {
            priors.push(Prior::gaussian(config.parallax, config.plx_err)?);
        }
        if mtot_free {
            priors.push(Prior::gaussian(config.total_mass, config.mass_err)?);
        }

        let labels = layout.labels();
        debug_assert_eq!(priors.len(), layout.len());
        debug_assert_eq!(labels.len(), layout.len());

        debug!(
            bodies = config.num_bodies,
            params = priors.len(),
            rows = table.len(),
            seppa_rows = partition.iter().map(|(_, rows)| rows.seppa.len()).sum::<usize>(),
            radec_rows = partition.iter().map(|(_, rows)| rows.radec.len()).sum::<usize>(),
            plx_free,
            mtot_free,
            "system configured"
        );

        Ok(System {
            layout,
            priors,
            labels,
            epochs: table.epochs(),
            table,
            partition,
            solver: config.solver,
        })
    }

    pub fn num_bodies(&self) -> usize {
        self.layout.num_bodies()
    }

    /// Number of slots in a parameter vector, equal to the number of priors.
    pub fn num_params(&self) -> usize {
        self.priors.len()
    }

    pub fn priors(&self) -> &[Prior] {
        &self.priors
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    pub fn partition(&self) -> &MeasurementPartition {
        &self.partition
    }

    pub fn table(&self) -> &MeasurementTable {
        &self.table
    }

    pub fn solver(&self) -> &KeplerSolverConfig {
        &self.solver
    }

    /// `seppa` rows of `body`; empty for `0` (the host star) or an unknown body.
    pub fn seppa(&self, body: usize) -> &[usize] {
        self.partition.seppa(body)
    }

    /// `radec` rows of `body`; empty for `0` (the host star) or an unknown body.
    pub fn radec(&self, body: usize) -> &[usize] {
        self.partition.radec(body)
    }

    /// Measurement epochs in table order.
    pub fn epochs(&self) -> &[MJD] {
        &self.epochs
    }

    /// Observed values, `(E, 2)`.
    pub fn data(&self) -> Array2<f64> {
        self.table.data()
    }

    /// Observed uncertainties, `(E, 2)`.
    pub fn errors(&self) -> Array2<f64> {
        self.table.errors()
    }

    /// Draw `num_samples` parameter vectors from the priors, as a `(num_params, M)` batch.
    pub fn sample_priors<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        num_samples: usize,
    ) -> Result<Array2<f64>, OrbitFitError> {
        let mut batch = Array2::zeros((self.num_params(), num_samples));
        for (prior, mut row) in self.priors.iter().zip(batch.axis_iter_mut(Axis(0))) {
            for value in row.iter_mut() {
                *value = prior.sample(rng)?;
            }
        }
        Ok(batch)
    }

    /// Sum of the prior log-densities of one vector, `-∞` outside the support.
    pub fn log_prior(&self, params: ArrayView1<f64>) -> Result<f64, OrbitFitError> {
        self.layout.check_len(params.len())?;
        Ok(self
            .priors
            .iter()
            .zip(params.iter())
            .map(|(prior, &x)| prior.log_density(x))
            .sum())
    }

    /// Predicted RA/Dec offsets at the table epochs.
    ///
    /// Shape follows [`crate::orbit_model`]: `(E, [N,] 2[, M])`.
    pub fn compute_model<'a>(
        &self,
        params: impl Into<ParamVectors<'a>>,
    ) -> Result<ArrayD<f64>, OrbitFitError> {
        compute_model(&self.layout, params, &self.epochs, &self.solver)
    }

    /// Total log-likelihood of one parameter vector.
    pub fn lnlike(&self, params: ArrayView1<f64>) -> Result<f64, OrbitFitError> {
        let lnlike = self.lnlike_batch_view(ParamVectors::Single(params))?;
        Ok(lnlike[0])
    }

    /// Total log-likelihood of every column of a `(num_params, M)` batch.
    pub fn lnlike_batch<'a>(
        &self,
        params: impl Into<ParamVectors<'a>>,
    ) -> Result<Array1<f64>, OrbitFitError> {
        self.lnlike_batch_view(params.into())
    }

    fn lnlike_batch_view(&self, params: ParamVectors) -> Result<Array1<f64>, OrbitFitError> {
        let batch = params.as_batch();
        let model = compute_model_full(&self.layout, batch, &self.epochs, &self.solver)?;
        let data = self.data();
        let errors = self.errors();

        let mut total = Array1::zeros(batch.ncols());
        for (body, rows) in self.partition.iter() {
            if rows.is_empty() {
                continue;
            }
            let body_model = model.index_axis(Axis(1), body - 1);
            let (row_model, seppa_local) = self.body_model(rows, body_model.view());
            let row_index = rows.all();

            let body_lnlike = chi2_lnlike(
                data.select(Axis(0), &row_index).view(),
                errors.select(Axis(0), &row_index).view(),
                row_model.view().into_dyn(),
                &seppa_local,
            )?;
            total += &body_lnlike.sum_axis(Axis(0)).sum_axis(Axis(0));
        }
        Ok(total)
    }

    /// Model rows of one body, with `seppa` rows converted from RA/Dec to sep/PA.
    ///
    /// Returns the `(R, 2, M)` model restricted to the body's rows and the positions of
    /// its `seppa` rows within that restriction.
    fn body_model(
        &self,
        rows: &BodyRows,
        body_model: ndarray::ArrayView3<f64>,
    ) -> (Array3<f64>, Vec<usize>) {
        let row_index = rows.all();
        let mut row_model = body_model.select(Axis(0), &row_index);

        let seppa_local: Vec<usize> = row_index
            .iter()
            .enumerate()
            .filter(|(_, row)| rows.seppa.binary_search(row).is_ok())
            .map(|(local, _)| local)
            .collect();

        for &local in &seppa_local {
            let mut pair = row_model.index_axis_mut(Axis(0), local);
            for mut sample in pair.axis_iter_mut(Axis(1)) {
                let (sep, pa) = radec_to_seppa(sample[0], sample[1]);
                sample[0] = sep;
                sample[1] = pa;
            }
        }

        (row_model, seppa_local)
    }

    /// Log-posterior of one vector; `-∞` without evaluating the model outside the prior support.
    pub fn log_posterior(&self, params: ArrayView1<f64>) -> Result<f64, OrbitFitError> {
        let log_prior = self.log_prior(params)?;
        if log_prior == f64::NEG_INFINITY {
            return Ok(log_prior);
        }
        Ok(log_prior + self.lnlike(params)?)
    }
}
