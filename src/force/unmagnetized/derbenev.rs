//! Derbenev parametrization of the non-magnetized friction force.
//!
//! Extends the Meshkov regimes with a longitudinal correction from the
//! flattened electron velocity distribution, weighted by a Coulomb logarithm
//! evaluated at the transverse electron velocity.

use super::{sign, ForceContext, IonKinematics, UnmagnetizedForce};
use crate::{
    error::FrictionResult,
    force::{coulomb, ffr},
};

/// Derbenev friction force.
///
/// For fast ions the longitudinal correction grows as `1/v_l^2` when the
/// longitudinal velocity approaches zero, so the longitudinal force points
/// along the ion velocity and becomes arbitrarily large. At exactly
/// `v_l == 0` the correction is dropped and the longitudinal force vanishes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Derbenev;

impl Derbenev {
    /// Maximum impact parameter for electrons moving with the transverse RMS velocity.
    fn rho_max_ve_tr(kinematics: &IonKinematics, context: &ForceContext) -> ffr {
        coulomb::shielding_impact_parameter(
            kinematics.ve_tr * kinematics.ve_tr,
            context.constants.plasma_frequency_scale,
            kinematics.ne,
        )
    }
}

impl UnmagnetizedForce for Derbenev {
    fn force(
        &mut self,
        kinematics: &IonKinematics,
        context: &ForceContext,
    ) -> FrictionResult<(ffr, ffr)> {
        let &IonKinematics {
            v,
            v_tr,
            v_l,
            v2,
            ve_tr,
            ve_l,
            ve2,
            ne,
        } = kinematics;

        let rho_min = context.rho_min(v2 + ve2);
        let coulomb_logarithm = coulomb::coulomb_logarithm(context.rho_max(kinematics), rho_min);
        let coulomb_logarithm_ve_tr =
            coulomb::coulomb_logarithm(Self::rho_max_ve_tr(kinematics, context), rho_min);
        let correction = ffr::sqrt(2.0 / context.constants.pi) * coulomb_logarithm_ve_tr;

        Ok(if v >= ve_tr {
            let coef = context.f_const * ne * coulomb_logarithm / (v2 * v);
            // The correction diverges for vanishing longitudinal velocity, where
            // the longitudinal force must vanish by symmetry.
            let longitudinal_correction = if v_l == 0.0 {
                0.0
            } else {
                context.f_const * ne * correction * sign(v_l) / (v_l * v_l)
            };
            (coef * v_tr, coef * v_l - longitudinal_correction)
        } else if v >= ve_l {
            let coef = context.f_const * ne / (ve_tr * ve_tr);
            let longitudinal_ratio = if v_l == 0.0 {
                0.0
            } else {
                v_l / ffr::sqrt(v_l * v_l + ve_l * ve_l)
            };
            (
                coef * coulomb_logarithm * v_tr / ve_tr,
                coef * (coulomb_logarithm * longitudinal_ratio - v_l * correction / ve_tr),
            )
        } else {
            (
                0.0,
                context.f_const * ne * coulomb_logarithm * v_l
                    / (ffr::sqrt(v_l * v_l + ve_l * ve_l) * ve_tr * ve_tr),
            )
        })
    }
}
