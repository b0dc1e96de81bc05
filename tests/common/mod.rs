#![allow(dead_code)]

use approx::assert_relative_eq;
use ndarray::{Array1, ArrayView1};
use orbitfit::conversion::radec_to_seppa;
use orbitfit::measurements::{Measurement, MeasurementTable, QuantType};
use orbitfit::system::System;

/// Four measurements of one companion: two RA/Dec rows then two sep/PA rows.
pub fn four_row_table() -> MeasurementTable {
    MeasurementTable::from(vec![
        Measurement::radec(1, 55645.95, 2479.0, 16.0, 2114.0, 16.0),
        Measurement::radec(1, 55702.89, 2458.0, 11.0, 2145.0, 11.0),
        Measurement::seppa(1, 56053.91, 3258.0, 9.0, 48.5, 0.3),
        Measurement::seppa(1, 56430.77, 3246.0, 6.0, 47.9, 0.2),
    ])
}

/// Same table as [`four_row_table`] with row 2 reassigned to body 2.
pub fn two_body_table() -> MeasurementTable {
    let mut table = four_row_table();
    if let Some(row) = table.get_mut(2) {
        row.body = 2;
    }
    table
}

/// Replace every observation of `table` by the model of `params`, so that `params`
/// is an exact fit.
pub fn synthetic_table(system: &System, params: ArrayView1<f64>) -> MeasurementTable {
    let model = system.compute_model(params).expect("model of the truth");
    let num_bodies = system.num_bodies();

    system
        .table()
        .iter()
        .enumerate()
        .map(|(row, meas)| {
            let (ra, dec) = if num_bodies == 1 {
                (model[[row, 0]], model[[row, 1]])
            } else {
                (model[[row, meas.body - 1, 0]], model[[row, meas.body - 1, 1]])
            };
            let (quant1, quant2) = match meas.quant_type {
                QuantType::RaDec => (ra, dec),
                QuantType::SepPa => radec_to_seppa(ra, dec),
            };
            Measurement {
                quant1,
                quant2,
                ..meas.clone()
            }
        })
        .collect()
}

pub fn assert_arrays_close(actual: &Array1<f64>, expected: &Array1<f64>, epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert_relative_eq!(*a, *e, epsilon = epsilon);
    }
}
