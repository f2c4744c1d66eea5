//! Math utilities.

pub mod gauss_kronrod;

use crate::error::{FrictionError, FrictionResult};
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Floating-point precision to use for integration.
#[allow(non_camel_case_types)]
pub type fin = f64;

/// Interval over which a function is integrated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IntegrationDomain {
    /// The closed interval `[start, end]`.
    Finite { start: fin, end: fin },
    /// The interval `[start, inf)`.
    SemiInfinite { start: fin },
    /// The whole real line.
    Infinite,
}

/// Result of a successful numerical integration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quadrature {
    /// Estimated value of the integral.
    pub value: fin,
    /// Estimated absolute error of `value`.
    pub estimated_error: fin,
    /// Number of subintervals the domain ended up divided into.
    pub intervals: usize,
}

/// Reason why an integral could not be evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    #[error(
        "no convergence after {intervals} subintervals \
         (value {value:e}, estimated error {estimated_error:e}, tolerance {tolerance:e})"
    )]
    NotConverged {
        intervals: usize,
        value: fin,
        estimated_error: fin,
        tolerance: fin,
    },

    #[error("integrand is not finite at x = {x:e}")]
    NonFiniteIntegrand { x: fin },

    #[error("interval end {end:e} is smaller than interval start {start:e}")]
    InvalidDomain { start: fin, end: fin },
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;

/// Tolerances and limits for adaptive quadrature.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadratureConfig {
    /// Absolute error tolerance.
    pub absolute_tolerance: fin,
    /// Relative error tolerance.
    pub relative_tolerance: fin,
    /// Maximum number of subintervals before the integration is considered
    /// not to converge.
    pub max_intervals: usize,
}

impl QuadratureConfig {
    pub fn validate(&self) -> FrictionResult<()> {
        if !(self.absolute_tolerance >= 0.0 && self.relative_tolerance >= 0.0) {
            return Err(FrictionError::InvalidConfig(format!(
                "Quadrature tolerances must be non-negative (got absolute {}, relative {})",
                self.absolute_tolerance, self.relative_tolerance
            )));
        }
        if self.absolute_tolerance == 0.0 && self.relative_tolerance == 0.0 {
            return Err(FrictionError::InvalidConfig(
                "At least one quadrature tolerance must be positive".to_string(),
            ));
        }
        if self.max_intervals == 0 {
            return Err(FrictionError::InvalidConfig(
                "Maximum number of quadrature intervals must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            absolute_tolerance: 1e-10,
            relative_tolerance: 1e-6,
            max_intervals: 1000,
        }
    }
}

/// Defines the properties of a numerical integration scheme.
///
/// Integrands are fallible so that an integral nested inside another integrand
/// can report its own failure through the outer integration.
pub trait Integrator {
    /// Integrates the given function over the given domain.
    ///
    /// # Returns
    ///
    /// A `IntegrationResult<Quadrature>` which is either:
    ///
    /// - `Ok`: Contains the integral estimate, which satisfies the tolerances of the integrator.
    /// - `Err`: Contains an `IntegrationError` describing why no acceptable estimate was found.
    fn integrate(
        &self,
        integrand: &dyn Fn(fin) -> IntegrationResult<fin>,
        domain: IntegrationDomain,
    ) -> IntegrationResult<Quadrature>;
}
