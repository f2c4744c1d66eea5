//! Non-magnetized friction force from a one-dimensional integral over the
//! anisotropic Maxwellian electron velocity distribution.
//!
//! With `a = v_tr^2/(2 ve_tr^2)`, `b = v_l^2/(2 ve_tr^2)` and
//! `r = ve_l^2/ve_tr^2`, each force component is
//!
//! ```text
//! F = f_const*ne*L_C*v/ve_tr^3 * int_0^inf exp(-a/(1 + q) - b/(r + q))
//!                                / ((1 + q)*sqrt(r + q)*d(q)) dq
//! ```
//!
//! where `d(q) = 1 + q` for the transverse and `d(q) = r + q` for the
//! longitudinal component, and `f_const` includes a factor `1/sqrt(2*pi)`.

use super::{require_positive_spread, ForceContext, IonKinematics, UnmagnetizedForce};
use crate::{
    constants::PhysicalConstants,
    error::FrictionResult,
    force::{ffr, ForceComponent},
    math::{
        fin, gauss_kronrod::GaussKronrodIntegrator, IntegrationDomain, Integrator,
        QuadratureConfig,
    },
};
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Configuration parameters for the one-dimensional numeric formula.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Numeric1DConfig {
    /// Tolerances for the integral over the distribution.
    pub quadrature: QuadratureConfig,
}

impl Numeric1DConfig {
    pub fn validate(&self) -> FrictionResult<()> {
        self.quadrature.validate()
    }
}

impl Default for Numeric1DConfig {
    fn default() -> Self {
        Self {
            quadrature: QuadratureConfig {
                absolute_tolerance: 0.0,
                relative_tolerance: 1e-8,
                max_intervals: 1000,
            },
        }
    }
}

/// Integrand of the semi-analytic force integral for one ion.
#[derive(Clone, Copy, Debug)]
struct SemiAnalyticIntegrand {
    transverse_exponent: fin,
    longitudinal_exponent: fin,
    anisotropy: fin,
    component: ForceComponent,
}

impl SemiAnalyticIntegrand {
    fn new(kinematics: &IonKinematics, component: ForceComponent) -> Self {
        let two_ve_tr2 = 2.0 * kinematics.ve_tr * kinematics.ve_tr;
        Self {
            transverse_exponent: kinematics.v_tr * kinematics.v_tr / two_ve_tr2,
            longitudinal_exponent: kinematics.v_l * kinematics.v_l / two_ve_tr2,
            anisotropy: kinematics.ve_l * kinematics.ve_l / (kinematics.ve_tr * kinematics.ve_tr),
            component,
        }
    }

    fn evaluate(&self, q: fin) -> fin {
        let transverse_denom = 1.0 + q;
        let longitudinal_denom = self.anisotropy + q;
        let value = fin::exp(
            -self.transverse_exponent / transverse_denom
                - self.longitudinal_exponent / longitudinal_denom,
        ) / (transverse_denom * fin::sqrt(longitudinal_denom));
        match self.component {
            ForceComponent::Transverse => value / transverse_denom,
            ForceComponent::Longitudinal => value / longitudinal_denom,
        }
    }
}

/// Friction force from the semi-analytic integral, evaluated with the integrator `I`.
#[derive(Clone, Debug)]
pub struct SemiAnalytic1D<I: Integrator + Send = GaussKronrodIntegrator> {
    integrator: I,
}

impl SemiAnalytic1D {
    pub fn new(config: Numeric1DConfig) -> FrictionResult<Self> {
        config.validate()?;
        Ok(Self::with_integrator(GaussKronrodIntegrator::new(
            config.quadrature,
        )))
    }
}

impl<I: Integrator + Send> SemiAnalytic1D<I> {
    pub fn with_integrator(integrator: I) -> Self {
        Self { integrator }
    }

    fn integrate(&self, integrand: SemiAnalyticIntegrand) -> FrictionResult<ffr> {
        let quadrature = self.integrator.integrate(
            &|q| Ok(integrand.evaluate(q)),
            IntegrationDomain::SemiInfinite { start: 0.0 },
        )?;
        Ok(quadrature.value)
    }
}

impl<I: Integrator + Send> UnmagnetizedForce for SemiAnalytic1D<I> {
    fn force(
        &mut self,
        kinematics: &IonKinematics,
        context: &ForceContext,
    ) -> FrictionResult<(ffr, ffr)> {
        require_positive_spread(kinematics)?;

        let coulomb_logarithm = context.coulomb_logarithm(kinematics);
        if coulomb_logarithm == 0.0 {
            return Ok((0.0, 0.0));
        }
        let scale = context.f_const * kinematics.ne * coulomb_logarithm
            / (kinematics.ve_tr * kinematics.ve_tr * kinematics.ve_tr);

        let compute_component = |velocity: ffr, component| -> FrictionResult<ffr> {
            if velocity == 0.0 {
                Ok(0.0)
            } else {
                let integral = self.integrate(SemiAnalyticIntegrand::new(kinematics, component))?;
                Ok(scale * velocity * integral)
            }
        };
        Ok((
            compute_component(kinematics.v_tr, ForceComponent::Transverse)?,
            compute_component(kinematics.v_l, ForceComponent::Longitudinal)?,
        ))
    }

    fn force_prefactor(&self, charge_number: u32, constants: &PhysicalConstants) -> ffr {
        let charge_number = charge_number as ffr;
        charge_number * charge_number * constants.force_scale / ffr::sqrt(2.0 * constants.pi)
    }
}
