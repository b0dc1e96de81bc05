//! # Batched Keplerian orbit model
//!
//! Maps one parameter vector, or a batch of `M` vectors stored column-wise, to the
//! predicted RA/Dec offsets of every companion at every requested epoch.
//!
//! ## Output shape
//!
//! The model is always evaluated into a dense `(E, N, 2, M)` array, then a single
//! normalization step drops
//!
//! * the body axis when `N == 1`,
//! * the sample axis when a single vector (not a batch) was supplied.
//!
//! | bodies | input   | shape          |
//! |--------|---------|----------------|
//! | 1      | vector  | `(E, 2)`       |
//! | 1      | batch   | `(E, 2, M)`    |
//! | N > 1  | vector  | `(E, N, 2)`    |
//! | N > 1  | batch   | `(E, N, 2, M)` |
//!
//! Component `0` of the coordinate axis is Δα*, component `1` is Δδ.
//!
//! Every call is a pure function of its inputs, so batches can be split across
//! threads by the caller without synchronization.

use ndarray::{Array1, Array2, Array4, ArrayD, ArrayView1, ArrayView2, Axis};
use tracing::{debug, trace};

use crate::{
    constants::MJD,
    kepler::KeplerSolverConfig,
    keplerian_element::{KeplerianElements, OrbitState},
    orbitfit_errors::OrbitFitError,
    system::layout::ParameterLayout,
};

/// Parameter vectors handed to the orbit model.
#[derive(Debug, Clone, Copy)]
pub enum ParamVectors<'a> {
    /// One vector of layout length.
    Single(ArrayView1<'a, f64>),
    /// `M` vectors as the columns of a `(layout length, M)` array.
    Batch(ArrayView2<'a, f64>),
}

impl<'a> ParamVectors<'a> {
    pub fn is_batch(&self) -> bool {
        matches!(self, ParamVectors::Batch(_))
    }

    /// Number of slots per vector.
    pub fn param_len(&self) -> usize {
        match self {
            ParamVectors::Single(v) => v.len(),
            ParamVectors::Batch(b) => b.nrows(),
        }
    }

    pub fn num_samples(&self) -> usize {
        match self {
            ParamVectors::Single(_) => 1,
            ParamVectors::Batch(b) => b.ncols(),
        }
    }

    /// View as a `(layout length, M)` batch, `M = 1` for a single vector.
    pub fn as_batch(&self) -> ArrayView2<'a, f64> {
        match *self {
            ParamVectors::Single(v) => v.insert_axis(Axis(1)),
            ParamVectors::Batch(b) => b,
        }
    }
}

impl<'a> From<ArrayView1<'a, f64>> for ParamVectors<'a> {
    fn from(v: ArrayView1<'a, f64>) -> Self {
        ParamVectors::Single(v)
    }
}

impl<'a> From<ArrayView2<'a, f64>> for ParamVectors<'a> {
    fn from(b: ArrayView2<'a, f64>) -> Self {
        ParamVectors::Batch(b)
    }
}

impl<'a> From<&'a Array1<f64>> for ParamVectors<'a> {
    fn from(v: &'a Array1<f64>) -> Self {
        ParamVectors::Single(v.view())
    }
}

impl<'a> From<&'a Array2<f64>> for ParamVectors<'a> {
    fn from(b: &'a Array2<f64>) -> Self {
        ParamVectors::Batch(b.view())
    }
}

impl<'a> From<&'a [f64]> for ParamVectors<'a> {
    fn from(v: &'a [f64]) -> Self {
        ParamVectors::Single(ArrayView1::from(v))
    }
}

/// Predicted RA/Dec offsets for one or many parameter vectors.
///
/// Arguments
/// ---------
/// * `layout`: the parameter layout the vectors follow.
/// * `params`: a single vector or a column batch, see [`ParamVectors`].
/// * `epochs`: evaluation epochs (MJD).
/// * `solver`: Kepler solver settings.
///
/// Return
/// ------
/// * The predicted offsets with the shape given in the module documentation.
///
/// Errors
/// ------
/// * [`OrbitFitError::Shape`] if the vector length differs from `layout.len()`.
/// * [`OrbitFitError::InvalidElements`] for an unbound or degenerate orbit.
/// * [`OrbitFitError::Convergence`] if Kepler's equation is not solved within the
///   iteration cap for some (body, epoch, sample).
pub fn compute_model<'a>(
    layout: &ParameterLayout,
    params: impl Into<ParamVectors<'a>>,
    epochs: &[MJD],
    solver: &KeplerSolverConfig,
) -> Result<ArrayD<f64>, OrbitFitError> {
    let params = params.into();
    let full = compute_model_full(layout, params.as_batch(), epochs, solver)?;
    Ok(squeeze_model_axes(full, params.is_batch()))
}

/// Evaluate the model into the unsqueezed `(E, N, 2, M)` array.
pub(crate) fn compute_model_full(
    layout: &ParameterLayout,
    batch: ArrayView2<f64>,
    epochs: &[MJD],
    solver: &KeplerSolverConfig,
) -> Result<Array4<f64>, OrbitFitError> {
    layout.check_len(batch.nrows())?;

    let num_bodies = layout.num_bodies();
    let num_samples = batch.ncols();
    trace!(
        epochs = epochs.len(),
        bodies = num_bodies,
        samples = num_samples,
        "evaluating orbit model"
    );

    let mut model = Array4::zeros((epochs.len(), num_bodies, 2, num_samples));

    for (sample, params) in batch.axis_iter(Axis(1)).enumerate() {
        let parallax = layout.parallax(params);
        let total_mass = layout.total_mass(params);

        for body in 1..=num_bodies {
            let elements = KeplerianElements::from_params(layout, params, body)?;
            let mean_motion = elements.mean_motion(total_mass)?;
            let rotation = elements.sky_rotation();

            for (epoch_index, &epoch) in epochs.iter().enumerate() {
                let state =
                    OrbitState::solve(&elements, &rotation, mean_motion, parallax, epoch, solver)
                        .map_err(|err| {
                            let mean_anomaly = elements.mean_anomaly(mean_motion, epoch);
                            debug!(
                                body,
                                epoch_index,
                                sample,
                                eccentricity = elements.eccentricity,
                                mean_anomaly,
                                %err,
                                "Kepler solver failed"
                            );
                            OrbitFitError::Convergence {
                                body,
                                epoch_index,
                                sample,
                                eccentricity: elements.eccentricity,
                                mean_anomaly,
                            }
                        })?;

                model[[epoch_index, body - 1, 0, sample]] = state.ra;
                model[[epoch_index, body - 1, 1, sample]] = state.dec;
            }
        }
    }

    Ok(model)
}

/// Drop the sample axis for single-vector input and the body axis for one body.
pub(crate) fn squeeze_model_axes(model: Array4<f64>, batched: bool) -> ArrayD<f64> {
    let single_body = model.len_of(Axis(1)) == 1;
    let mut model = model.into_dyn();
    if !batched {
        model = model.index_axis_move(Axis(3), 0);
    }
    if single_body {
        model = model.index_axis_move(Axis(1), 0);
    }
    model
}
