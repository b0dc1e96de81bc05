//! Ordered layout of the parameter vector.
//!
//! ```text
//! [ sma1 ecc1 inc1 aop1 pan1 epp1 | … | smaN … eppN | plx? | mtot? ]
//! ```
//!
//! `plx` and `mtot` only get a slot when their uncertainty is inferred. When fixed,
//! the layout carries the constant and substitutes it on every read, so downstream
//! code never branches on field presence.

use itertools::iproduct;
use ndarray::ArrayView1;

use crate::{
    constants::{MilliArcSec, SolarMass, ELEMENTS_PER_BODY},
    orbitfit_errors::OrbitFitError,
};

/// Names of the per-body orbital elements, in slot order.
pub const ELEMENT_NAMES: [&str; ELEMENTS_PER_BODY] = ["sma", "ecc", "inc", "aop", "pan", "epp"];

/// A system-level quantity shared by all bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SharedParam {
    /// Known exactly; no slot in the parameter vector.
    Fixed(f64),
    /// Inferred; read from the given slot of the parameter vector.
    Free(usize),
}

impl SharedParam {
    fn resolve(&self, params: ArrayView1<f64>) -> f64 {
        match *self {
            SharedParam::Fixed(value) => value,
            SharedParam::Free(slot) => params[slot],
        }
    }
}

/// Slot layout of the parameter vector for `num_bodies` companions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterLayout {
    num_bodies: usize,
    parallax: SharedParam,
    total_mass: SharedParam,
}

impl ParameterLayout {
    /// Build the layout.
    ///
    /// Arguments
    /// ---------
    /// * `num_bodies`: number of secondary bodies, at least one.
    /// * `parallax`, `total_mass`: the constants used when the quantity is fixed.
    /// * `plx_free`, `mtot_free`: whether the quantity gets its own slot.
    pub fn new(
        num_bodies: usize,
        parallax: MilliArcSec,
        plx_free: bool,
        total_mass: SolarMass,
        mtot_free: bool,
    ) -> Result<Self, OrbitFitError> {
        if num_bodies == 0 {
            return Err(OrbitFitError::Configuration(
                "the number of secondary bodies must be at least 1".into(),
            ));
        }

        let mut next_slot = ELEMENTS_PER_BODY * num_bodies;
        let mut shared = |free: bool, value: f64| {
            if free {
                next_slot += 1;
                SharedParam::Free(next_slot - 1)
            } else {
                SharedParam::Fixed(value)
            }
        };
        let parallax = shared(plx_free, parallax);
        let total_mass = shared(mtot_free, total_mass);

        Ok(ParameterLayout {
            num_bodies,
            parallax,
            total_mass,
        })
    }

    pub fn num_bodies(&self) -> usize {
        self.num_bodies
    }

    pub fn parallax_param(&self) -> SharedParam {
        self.parallax
    }

    pub fn total_mass_param(&self) -> SharedParam {
        self.total_mass
    }

    /// Number of slots in a parameter vector.
    pub fn len(&self) -> usize {
        let free = |p: SharedParam| usize::from(matches!(p, SharedParam::Free(_)));
        ELEMENTS_PER_BODY * self.num_bodies + free(self.parallax) + free(self.total_mass)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First slot of the elements of `body` (1-based).
    pub fn body_offset(&self, body: usize) -> Option<usize> {
        (1..=self.num_bodies)
            .contains(&body)
            .then(|| ELEMENTS_PER_BODY * (body - 1))
    }

    /// Slot names: `sma1, ecc1, …, epp1, sma2, …, plx, mtot`.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = iproduct!(1..=self.num_bodies, ELEMENT_NAMES)
            .map(|(body, name)| format!("{name}{body}"))
            .collect();
        if let SharedParam::Free(_) = self.parallax {
            labels.push("plx".into());
        }
        if let SharedParam::Free(_) = self.total_mass {
            labels.push("mtot".into());
        }
        labels
    }

    /// Parallax of a parameter vector, substituting the constant when fixed.
    pub fn parallax(&self, params: ArrayView1<f64>) -> MilliArcSec {
        self.parallax.resolve(params)
    }

    /// Total mass of a parameter vector, substituting the constant when fixed.
    pub fn total_mass(&self, params: ArrayView1<f64>) -> SolarMass {
        self.total_mass.resolve(params)
    }

    /// Fail with [`OrbitFitError::Shape`] unless `len` matches the layout.
    pub fn check_len(&self, len: usize) -> Result<(), OrbitFitError> {
        if len != self.len() {
            return Err(OrbitFitError::Shape(format!(
                "parameter vector has {len} entries but the layout for {} bodies expects {}",
                self.num_bodies,
                self.len()
            )));
        }
        Ok(())
    }
}
