use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrbitFitError {
    #[error("Invalid system configuration: {0}")]
    Configuration(String),

    #[error("Array shape mismatch: {0}")]
    Shape(String),

    #[error(
        "Kepler equation did not converge for body {body}, epoch index {epoch_index}, \
         sample {sample} (e = {eccentricity}, M = {mean_anomaly})"
    )]
    Convergence {
        body: usize,
        epoch_index: usize,
        sample: usize,
        eccentricity: f64,
        mean_anomaly: f64,
    },

    #[error("Invalid prior parameters: {0}")]
    InvalidPrior(String),

    #[error("Invalid orbital elements: {0}")]
    InvalidElements(String),

    #[error("ROOTS finding error: {0}")]
    RootFinding(#[from] roots::SearchError),

    #[error("Gaussian prior sampling failed: {0:?}")]
    PriorSampling(rand_distr::NormalError),
}

impl From<rand_distr::NormalError> for OrbitFitError {
    fn from(err: rand_distr::NormalError) -> Self {
        OrbitFitError::PriorSampling(err)
    }
}

impl PartialEq for OrbitFitError {
    fn eq(&self, other: &Self) -> bool {
        use OrbitFitError::*;
        match (self, other) {
            (Configuration(a), Configuration(b)) => a == b,
            (Shape(a), Shape(b)) => a == b,
            (
                Convergence {
                    body: b1,
                    epoch_index: e1,
                    sample: s1,
                    ..
                },
                Convergence {
                    body: b2,
                    epoch_index: e2,
                    sample: s2,
                    ..
                },
            ) => b1 == b2 && e1 == e2 && s1 == s2,
            (InvalidPrior(a), InvalidPrior(b)) => a == b,
            (InvalidElements(a), InvalidElements(b)) => a == b,
            (RootFinding(a), RootFinding(b)) => a == b,
            (PriorSampling(a), PriorSampling(b)) => a == b,
            _ => false,
        }
    }
}
