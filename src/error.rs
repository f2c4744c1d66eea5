//! Errors produced by friction force evaluation.

use crate::{beam::Temperature, force::ffr, math::IntegrationError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrictionError {
    #[error("Friction force is not implemented for the {0:?} temperature regime")]
    UnsupportedRegime(Temperature),

    #[error("Length of {quantity} ({actual}) does not match the number of ions ({expected})")]
    LengthMismatch {
        quantity: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Temperature regime {regime:?} requires {required} electron velocity spread values, \
         but only {available} are available"
    )]
    MissingVelocitySpread {
        regime: Temperature,
        required: usize,
        available: usize,
    },

    #[error(
        "Electron velocity spread must be positive \
         (got transverse {transverse}, longitudinal {longitudinal})"
    )]
    NonPositiveVelocitySpread { transverse: ffr, longitudinal: ffr },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Numerical integration failed: {0}")]
    Integration(#[from] IntegrationError),
}

pub type FrictionResult<T> = Result<T, FrictionError>;
