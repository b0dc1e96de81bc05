//! # orbitfit
//!
//! Forward model and likelihood engine for fitting Keplerian orbits of directly
//! imaged companions to relative astrometry.
//!
//! A fit is described by a [`system::System`]: the number of companions, the
//! measurement table, the system mass and parallax, and one [`priors::Prior`] per
//! free parameter. Samplers draw parameter vectors from the priors, evaluate
//! [`system::System::compute_model`] at the measurement epochs, and score them with
//! [`system::System::lnlike`].
//!
//! Units: semi-major axes in AU, angles in radians (position angles in degrees),
//! epochs in MJD, masses in solar masses, parallaxes and offsets in milliarcseconds.

pub mod constants;
pub mod conversion;
pub mod kepler;
pub mod keplerian_element;
pub mod lnlike;
pub mod measurements;
pub mod orbit_model;
pub mod orbitfit_errors;
pub mod priors;
pub mod system;
