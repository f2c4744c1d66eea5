//! Meshkov parametrization of the non-magnetized friction force.

use super::{sign, ForceContext, IonKinematics, UnmagnetizedForce};
use crate::{error::FrictionResult, force::ffr};

/// Piecewise friction force switching between a fast, an intermediate and a
/// slow ion regime based on the RMS electron velocities.
#[derive(Clone, Copy, Debug, Default)]
pub struct Meshkov;

impl UnmagnetizedForce for Meshkov {
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
            ne,
            ..
        } = kinematics;
        let scale = context.f_const * ne * context.coulomb_logarithm(kinematics);

        Ok(if v >= ve_tr {
            let coef = scale / (v2 * v);
            (coef * v_tr, coef * v_l)
        } else if v >= ve_l {
            let coef = scale / (ve_tr * ve_tr);
            (coef * v_tr / ve_tr, coef * sign(v_l))
        } else {
            (0.0, scale * v_l / (ve_l * ve_tr * ve_tr))
        })
    }
}
