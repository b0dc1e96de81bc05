//! # Chi-square log-likelihood
//!
//! Element-wise Gaussian log-likelihood between observed and predicted astrometry:
//!
//! ```text
//! lnL[e, c, m] = -0.5 · ((data[e, c] − model[e, c, m]) / errors[e, c])²
//! ```
//!
//! For rows given as separation / position angle, the position-angle residual
//! (component `1`) is a phase and is wrapped into `[-180°, 180°)` before use.
//!
//! No reduction is done here; summing over epochs, coordinates or bodies is left to
//! the caller (see [`crate::system::System::lnlike`] for the aggregated form).

use ndarray::{ArrayD, ArrayView2, ArrayViewD, Axis, Zip};

use crate::{kepler::wrap_angle_deg, orbitfit_errors::OrbitFitError};

/// Element-wise chi-square log-likelihood.
///
/// Arguments
/// ---------
/// * `data`: observed coordinate pairs, shape `(E, 2)`.
/// * `errors`: 1σ uncertainties of `data`, shape `(E, 2)`.
/// * `model`: predicted pairs, shape `(E, 2)` or `(E, 2, M)`.
/// * `seppa_rows`: rows of `data` holding separation / position angle.
///
/// Return
/// ------
/// * An array with the shape of `model`.
///
/// Errors
/// ------
/// * [`OrbitFitError::Shape`] if the leading axes of `data`, `errors` and `model`
///   disagree, if `model` is neither 2-D nor 3-D, or if a `seppa` row is out of range.
pub fn chi2_lnlike(
    data: ArrayView2<f64>,
    errors: ArrayView2<f64>,
    model: ArrayViewD<f64>,
    seppa_rows: &[usize],
) -> Result<ArrayD<f64>, OrbitFitError> {
    let num_rows = data.nrows();

    if data.ncols() != 2 || errors.dim() != data.dim() {
        return Err(OrbitFitError::Shape(format!(
            "data {:?} and errors {:?} must both be (E, 2)",
            data.shape(),
            errors.shape()
        )));
    }
    if !(2..=3).contains(&model.ndim()) || model.shape()[..2] != [num_rows, 2] {
        return Err(OrbitFitError::Shape(format!(
            "model {:?} must be (E, 2) or (E, 2, M) with E = {num_rows}",
            model.shape()
        )));
    }
    if let Some(&row) = seppa_rows.iter().find(|&&row| row >= num_rows) {
        return Err(OrbitFitError::Shape(format!(
            "seppa row {row} is out of range for {num_rows} rows"
        )));
    }

    let (data, errors) = if model.ndim() == 3 {
        (
            data.insert_axis(Axis(2)).into_dyn(),
            errors.insert_axis(Axis(2)).into_dyn(),
        )
    } else {
        (data.into_dyn(), errors.into_dyn())
    };
    let shape_err = || OrbitFitError::Shape("cannot broadcast data onto model".into());
    let data = data.broadcast(model.raw_dim()).ok_or_else(shape_err)?;
    let errors = errors.broadcast(model.raw_dim()).ok_or_else(shape_err)?;

    let mut residual = &data - &model;

    for &row in seppa_rows {
        let mut row_view = residual.index_axis_mut(Axis(0), row);
        row_view
            .index_axis_mut(Axis(0), 1)
            .mapv_inplace(wrap_angle_deg);
    }

    Zip::from(&mut residual)
        .and(&errors)
        .for_each(|r, &err| *r = -0.5 * (*r / err).powi(2));

    Ok(residual)
}

#[cfg(test)]
mod lnlike_test {
    use super::*;
    use ndarray::{array, Array2, Array3};

    #[test]
    fn test_single_model() {
        let model = Array2::<f64>::zeros((3, 2));
        let data = Array2::<f64>::ones((3, 2));
        let errors = Array2::<f64>::ones((3, 2));

        let chi2 = chi2_lnlike(data.view(), errors.view(), model.view().into_dyn(), &[1]).unwrap();
        assert_eq!(chi2.shape(), &[3, 2]);
        assert!(chi2.iter().all(|&x| x == -0.5));
    }

    #[test]
    fn test_multiple_models() {
        let model = Array3::<f64>::zeros((3, 2, 5));
        let data = Array2::<f64>::ones((3, 2));
        let errors = Array2::<f64>::ones((3, 2));

        let chi2 = chi2_lnlike(data.view(), errors.view(), model.view().into_dyn(), &[1]).unwrap();
        assert_eq!(chi2.shape(), &[3, 2, 5]);
        assert!(chi2.iter().all(|&x| x == -0.5));
    }

    #[test]
    fn test_position_angle_wraps() {
        // 359° observed vs 1° predicted is a 2° residual, not 358°
        let data = array![[100.0, 359.0], [100.0, 359.0]];
        let errors = array![[1.0, 1.0], [1.0, 1.0]];
        let model = array![[100.0, 1.0], [100.0, 1.0]];

        let chi2 = chi2_lnlike(data.view(), errors.view(), model.view().into_dyn(), &[0]).unwrap();
        assert_eq!(chi2[[0, 1]], -0.5 * 4.0);
        assert_eq!(chi2[[1, 1]], -0.5 * 358.0 * 358.0);
        assert_eq!(chi2[[0, 0]], 0.0);
    }

    #[test]
    fn test_errors_scale_residuals() {
        let data = array![[3.0, -4.0]];
        let errors = array![[2.0, 0.5]];
        // (coordinate, epoch, sample) permuted into (epoch, coordinate, sample)
        let model = array![[[1.0, 3.0]], [[0.0, -4.0]]].permuted_axes([1, 0, 2]);

        let chi2 = chi2_lnlike(data.view(), errors.view(), model.view().into_dyn(), &[]).unwrap();
        assert_eq!(chi2.shape(), &[1, 2, 2]);
        assert_eq!(chi2[[0, 0, 0]], -0.5);
        assert_eq!(chi2[[0, 0, 1]], 0.0);
        assert_eq!(chi2[[0, 1, 0]], -0.5 * 64.0);
        assert_eq!(chi2[[0, 1, 1]], 0.0);
    }

    #[test]
    fn test_shape_errors() {
        let data = Array2::<f64>::ones((3, 2));
        let errors = Array2::<f64>::ones((3, 2));

        let bad_model = Array2::<f64>::zeros((4, 2));
        assert!(matches!(
            chi2_lnlike(data.view(), errors.view(), bad_model.view().into_dyn(), &[]),
            Err(OrbitFitError::Shape(_))
        ));

        let bad_errors = Array2::<f64>::ones((2, 2));
        let model = Array2::<f64>::zeros((3, 2));
        assert!(matches!(
            chi2_lnlike(data.view(), bad_errors.view(), model.view().into_dyn(), &[]),
            Err(OrbitFitError::Shape(_))
        ));

        assert!(matches!(
            chi2_lnlike(data.view(), errors.view(), model.view().into_dyn(), &[3]),
            Err(OrbitFitError::Shape(_))
        ));

        let rank4 = ndarray::Array4::<f64>::zeros((3, 2, 1, 1));
        assert!(matches!(
            chi2_lnlike(data.view(), errors.view(), rank4.view().into_dyn(), &[]),
            Err(OrbitFitError::Shape(_))
        ));
    }
}
