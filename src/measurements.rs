//! # Astrometric measurement table
//!
//! In-memory form of the relative astrometry handed over by the parsing layer, and the
//! per-body partition of its rows by coordinate type.
//!
//! Each [`Measurement`] row carries the companion it belongs to (`body`, 1-based), an
//! epoch, and two coordinates with their uncertainties. Depending on [`QuantType`] the
//! pair is either
//!
//! * `RaDec` – `(Δα*, Δδ)` offsets in milliarcseconds, or
//! * `SepPa` – separation in milliarcseconds and position angle in degrees.
//!
//! [`MeasurementPartition`] splits the row indices of every body into its `seppa` and
//! `radec` sets. It is built once per system and never mutated afterwards.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{MilliArcSec, MJD},
    orbitfit_errors::OrbitFitError,
};

/// Coordinate system of a measurement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantType {
    RaDec,
    SepPa,
}

/// One astrometric measurement of one companion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub body: usize,
    pub epoch: MJD,
    pub quant_type: QuantType,
    pub quant1: f64,
    pub quant1_err: f64,
    pub quant2: f64,
    pub quant2_err: f64,
}

impl Measurement {
    /// RA/Dec offsets and their uncertainties, all in milliarcseconds.
    pub fn radec(
        body: usize,
        epoch: MJD,
        ra: MilliArcSec,
        ra_err: MilliArcSec,
        dec: MilliArcSec,
        dec_err: MilliArcSec,
    ) -> Self {
        Measurement {
            body,
            epoch,
            quant_type: QuantType::RaDec,
            quant1: ra,
            quant1_err: ra_err,
            quant2: dec,
            quant2_err: dec_err,
        }
    }

    /// Separation (milliarcseconds) and position angle (degrees) with uncertainties.
    pub fn seppa(
        body: usize,
        epoch: MJD,
        sep: MilliArcSec,
        sep_err: MilliArcSec,
        pa: f64,
        pa_err: f64,
    ) -> Self {
        Measurement {
            body,
            epoch,
            quant_type: QuantType::SepPa,
            quant1: sep,
            quant1_err: sep_err,
            quant2: pa,
            quant2_err: pa_err,
        }
    }
}

/// Ordered collection of measurement rows. Row order defines the epoch axis of the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementTable {
    rows: Vec<Measurement>,
}

impl MeasurementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: Measurement) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Measurement> {
        self.rows.get(index)
    }

    /// Mutable access to a row, mainly to re-tag its body before building a system.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Measurement> {
        self.rows.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.rows.iter()
    }

    /// Set the body identifier of every row.
    pub fn set_body(&mut self, body: usize) {
        self.rows.iter_mut().for_each(|row| row.body = body);
    }

    /// Epoch of every row, in table order.
    pub fn epochs(&self) -> Vec<MJD> {
        self.rows.iter().map(|row| row.epoch).collect()
    }

    /// Earliest epoch of the table, `None` when empty.
    pub fn min_epoch(&self) -> Option<MJD> {
        self.rows.iter().map(|row| row.epoch).reduce(f64::min)
    }

    /// Observed coordinate pairs as an `(E, 2)` array.
    pub fn data(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), 2), |(i, j)| match j {
            0 => self.rows[i].quant1,
            _ => self.rows[i].quant2,
        })
    }

    /// Coordinate uncertainties as an `(E, 2)` array.
    pub fn errors(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), 2), |(i, j)| match j {
            0 => self.rows[i].quant1_err,
            _ => self.rows[i].quant2_err,
        })
    }
}

impl From<Vec<Measurement>> for MeasurementTable {
    fn from(rows: Vec<Measurement>) -> Self {
        MeasurementTable { rows }
    }
}

impl FromIterator<Measurement> for MeasurementTable {
    fn from_iter<I: IntoIterator<Item = Measurement>>(iter: I) -> Self {
        MeasurementTable {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MeasurementTable {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Row indices of one body, split by coordinate type. Both lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyRows {
    pub seppa: Vec<usize>,
    pub radec: Vec<usize>,
}

impl BodyRows {
    /// All rows of the body in table order.
    pub fn all(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.seppa.iter().chain(&self.radec).copied().collect();
        rows.sort_unstable();
        rows
    }

    pub fn len(&self) -> usize {
        self.seppa.len() + self.radec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seppa.is_empty() && self.radec.is_empty()
    }
}

/// Per-body partition of the measurement rows into `seppa` and `radec` index sets.
///
/// Bodies are addressed with their 1-based identifiers. Identifier `0` (the host star)
/// and identifiers beyond the configured count have no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementPartition {
    bodies: Vec<BodyRows>,
}

impl MeasurementPartition {
    /// Scan the table once and sort every row into its body's `seppa` or `radec` set.
    ///
    /// Return
    /// ------
    /// * The partition, or [`OrbitFitError::Configuration`] if a row references a body
    ///   outside `1..=num_bodies`.
    pub fn from_table(
        table: &MeasurementTable,
        num_bodies: usize,
    ) -> Result<Self, OrbitFitError> {
        let mut bodies = vec![BodyRows::default(); num_bodies];

        for (index, row) in table.iter().enumerate() {
            if row.body == 0 || row.body > num_bodies {
                return Err(OrbitFitError::Configuration(format!(
                    "row {index} references body {} but the system has bodies 1..={num_bodies}",
                    row.body
                )));
            }
            let rows = &mut bodies[row.body - 1];
            match row.quant_type {
                QuantType::SepPa => rows.seppa.push(index),
                QuantType::RaDec => rows.radec.push(index),
            }
        }

        Ok(MeasurementPartition { bodies })
    }

    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Rows of `body`, `None` for the host star or an unknown body.
    pub fn body(&self, body: usize) -> Option<&BodyRows> {
        body.checked_sub(1).and_then(|i| self.bodies.get(i))
    }

    /// `seppa` rows of `body`; empty for the host star or an unknown body.
    pub fn seppa(&self, body: usize) -> &[usize] {
        self.body(body)
            .map(|rows| rows.seppa.as_slice())
            .unwrap_or(&[])
    }

    /// `radec` rows of `body`; empty for the host star or an unknown body.
    pub fn radec(&self, body: usize) -> &[usize] {
        self.body(body)
            .map(|rows| rows.radec.as_slice())
            .unwrap_or(&[])
    }

    /// `(body, rows)` pairs, bodies numbered from 1.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BodyRows)> {
        self.bodies.iter().enumerate().map(|(i, rows)| (i + 1, rows))
    }
}

#[cfg(test)]
mod measurements_test {
    use super::*;

    fn sample_table() -> MeasurementTable {
        MeasurementTable::from(vec![
            Measurement::radec(1, 55645.95, 2479.0, 16.0, 2114.0, 16.0),
            Measurement::seppa(2, 55702.89, 2600.0, 20.0, 52.0, 0.5),
            Measurement::seppa(1, 55785.0, 2810.0, 30.0, 53.6, 0.3),
            Measurement::radec(2, 55921.0, 1981.0, 11.0, 2166.0, 11.0),
            Measurement::seppa(1, 56130.0, 2700.0, 25.0, 54.1, 0.4),
        ])
    }

    #[test]
    fn test_partition_by_body_and_type() {
        let table = sample_table();
        let partition = MeasurementPartition::from_table(&table, 2).unwrap();

        assert_eq!(partition.num_bodies(), 2);
        assert_eq!(partition.seppa(1), &[2, 4]);
        assert_eq!(partition.radec(1), &[0]);
        assert_eq!(partition.seppa(2), &[1]);
        assert_eq!(partition.radec(2), &[3]);
        assert_eq!(partition.body(1).unwrap().all(), vec![0, 2, 4]);

        assert!(partition.seppa(0).is_empty());
        assert!(partition.radec(0).is_empty());
        assert!(partition.body(3).is_none());
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let table = sample_table();
        let partition = MeasurementPartition::from_table(&table, 2).unwrap();

        let mut seen: Vec<usize> = partition
            .iter()
            .flat_map(|(_, rows)| rows.seppa.iter().chain(&rows.radec).copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..table.len()).collect::<Vec<_>>());

        for (body, rows) in partition.iter() {
            assert!(rows.seppa.iter().all(|r| !rows.radec.contains(r)));
            assert!(rows.all().iter().all(|&r| table.get(r).unwrap().body == body));
        }
    }

    #[test]
    fn test_partition_rejects_unknown_body() {
        let table = sample_table();
        assert!(matches!(
            MeasurementPartition::from_table(&table, 1),
            Err(OrbitFitError::Configuration(_))
        ));

        let mut table = sample_table();
        table.get_mut(0).unwrap().body = 0;
        assert!(matches!(
            MeasurementPartition::from_table(&table, 2),
            Err(OrbitFitError::Configuration(_))
        ));
    }

    #[test]
    fn test_data_and_errors_arrays() {
        let table = sample_table();
        let data = table.data();
        let errors = table.errors();

        assert_eq!(data.dim(), (5, 2));
        assert_eq!(data[[1, 0]], 2600.0);
        assert_eq!(data[[1, 1]], 52.0);
        assert_eq!(errors[[2, 1]], 0.3);
        assert_eq!(table.min_epoch(), Some(55645.95));
        assert_eq!(MeasurementTable::new().min_epoch(), None);
    }
}
