//! Friction force in a non-magnetized electron beam.
//!
//! All formulas share the per-ion loop and the maximum impact parameter
//! policy; they differ only in how the force on a single ion is computed.

pub mod derbenev;
pub mod meshkov;
pub mod numeric_1d;
pub mod numeric_3d;

use super::{
    begin_evaluation,
    coulomb::{self, MaxImpactParameter},
    ffr, FrictionForceModel,
};
use crate::{
    beam::{is_negligible_density, ElectronBeam, FrictionForces, IonBatch, VelocitySpread},
    constants::PhysicalConstants,
    error::{FrictionError, FrictionResult},
};
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Configuration parameters shared by the non-magnetized formulas.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct UnmagnetizedConfig {
    /// Time the ions spend inside the electron beam [s].
    pub interaction_time: ffr,
    /// Whether the maximum impact parameter should vary smoothly with ion
    /// velocity instead of switching to the electron velocity below it.
    pub smooth_rho_max: bool,
}

impl UnmagnetizedConfig {
    pub fn validate(&self) -> FrictionResult<()> {
        if !(self.interaction_time > 0.0) {
            return Err(FrictionError::InvalidConfig(format!(
                "Interaction time must be positive (got {})",
                self.interaction_time
            )));
        }
        Ok(())
    }
}

impl Default for UnmagnetizedConfig {
    fn default() -> Self {
        Self {
            interaction_time: 1e-8,
            smooth_rho_max: false,
        }
    }
}

/// Velocities and electron density seen by a single moving ion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IonKinematics {
    /// Ion speed [m/s].
    pub v: ffr,
    /// Transverse ion velocity [m/s].
    pub v_tr: ffr,
    /// Longitudinal ion velocity [m/s].
    pub v_l: ffr,
    /// Squared ion speed [m^2/s^2].
    pub v2: ffr,
    /// RMS transverse electron velocity [m/s].
    pub ve_tr: ffr,
    /// RMS longitudinal electron velocity [m/s].
    pub ve_l: ffr,
    /// Sum of squared RMS electron velocities [m^2/s^2].
    pub ve2: ffr,
    /// Electron density [1/m^3].
    pub ne: ffr,
}

impl IonKinematics {
    pub fn new(v_tr: ffr, v_l: ffr, ve_tr: ffr, ve_l: ffr, ne: ffr) -> Self {
        let v2 = v_tr * v_tr + v_l * v_l;
        Self {
            v: ffr::sqrt(v2),
            v_tr,
            v_l,
            v2,
            ve_tr,
            ve_l,
            ve2: ve_tr * ve_tr + ve_l * ve_l,
            ne,
        }
    }
}

/// Quantities that are fixed for a batch of ions and shared by all formulas.
#[derive(Clone, Debug)]
pub struct ForceContext<'a> {
    /// Charge number of the ions.
    pub charge_number: u32,
    /// Force prefactor of the formula in use [N m^3 m^2/s^2].
    pub f_const: ffr,
    /// Charge number times the minimum impact parameter scale [m^3/s^2].
    pub rho_min_const: ffr,
    pub rho_max_policy: &'a MaxImpactParameter,
    pub constants: &'a PhysicalConstants,
}

impl ForceContext<'_> {
    /// Maximum impact parameter for the given ion.
    pub fn rho_max(&self, kinematics: &IonKinematics) -> ffr {
        self.rho_max_policy.evaluate(
            self.charge_number,
            kinematics.v2,
            kinematics.ve2,
            kinematics.ne,
        )
    }

    /// Minimum impact parameter for the given squared relative velocity.
    pub fn rho_min(&self, relative_velocity_squared: ffr) -> ffr {
        coulomb::min_impact_parameter(self.rho_min_const, relative_velocity_squared)
    }

    /// Coulomb logarithm based on the combined ion and electron squared speeds.
    pub fn coulomb_logarithm(&self, kinematics: &IonKinematics) -> ffr {
        coulomb::coulomb_logarithm(
            self.rho_max(kinematics),
            self.rho_min(kinematics.v2 + kinematics.ve2),
        )
    }
}

/// Defines the properties of a friction force formula for a non-magnetized beam.
pub trait UnmagnetizedForce: Send {
    /// Prepares for evaluating a batch of ions with the given velocity spreads.
    fn init(&mut self, _spread: &VelocitySpread) -> FrictionResult<()> {
        Ok(())
    }

    /// Computes the transverse and longitudinal force on a single moving ion.
    fn force(
        &mut self,
        kinematics: &IonKinematics,
        context: &ForceContext,
    ) -> FrictionResult<(ffr, ffr)>;

    /// Cleans up after a batch of ions has been evaluated.
    fn fin(&mut self) {}

    /// Force prefactor for ions with the given charge number.
    fn force_prefactor(&self, charge_number: u32, constants: &PhysicalConstants) -> ffr {
        let charge_number = charge_number as ffr;
        charge_number * charge_number * constants.force_scale
    }
}

/// Friction force in a non-magnetized electron beam using the formula `M`.
#[derive(Clone, Debug)]
pub struct UnmagnetizedFrictionForce<M: UnmagnetizedForce> {
    constants: PhysicalConstants,
    rho_max_policy: MaxImpactParameter,
    model: M,
}

impl<M: UnmagnetizedForce> UnmagnetizedFrictionForce<M> {
    pub fn new(
        config: UnmagnetizedConfig,
        constants: PhysicalConstants,
        model: M,
    ) -> FrictionResult<Self> {
        config.validate()?;
        let rho_max_policy =
            MaxImpactParameter::new(config.smooth_rho_max, config.interaction_time, &constants);
        Ok(Self {
            constants,
            rho_max_policy,
            model,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Computes the maximum impact parameter [m] for an ion with squared speed
    /// `v2` moving through electrons with squared RMS speed `ve2` and density `ne`.
    pub fn rho_max(&self, charge_number: u32, v2: ffr, ve2: ffr, ne: ffr) -> ffr {
        self.rho_max_policy.evaluate(charge_number, v2, ve2, ne)
    }

    fn compute_all_ion_forces(
        &mut self,
        charge_number: u32,
        ions: &IonBatch,
        velocity_spread: &VelocitySpread,
        forces: &mut FrictionForces,
    ) -> FrictionResult<()> {
        let context = ForceContext {
            charge_number,
            f_const: self.model.force_prefactor(charge_number, &self.constants),
            rho_min_const: charge_number as ffr * self.constants.min_impact_parameter_scale,
            rho_max_policy: &self.rho_max_policy,
            constants: &self.constants,
        };

        for idx in 0..ions.number_of_ions() {
            let (v_tr, v_l, ne) = ions.ion(idx);
            if is_negligible_density(ne) {
                continue;
            }
            let (ve_tr, ve_l) = velocity_spread.at(idx);
            let kinematics = IonKinematics::new(v_tr, v_l, ve_tr, ve_l, ne);
            if kinematics.v2 > 0.0 {
                forces.set(idx, self.model.force(&kinematics, &context)?);
            }
        }
        Ok(())
    }
}

impl<M: UnmagnetizedForce> FrictionForceModel for UnmagnetizedFrictionForce<M> {
    fn compute_friction_forces(
        &mut self,
        charge_number: u32,
        ions: &IonBatch,
        beam: &dyn ElectronBeam,
        forces: &mut FrictionForces,
    ) -> FrictionResult<()> {
        let velocity_spread = begin_evaluation(ions, beam, forces)?;
        if charge_number == 0 {
            return Ok(());
        }
        self.model.init(&velocity_spread)?;
        let result = self.compute_all_ion_forces(charge_number, ions, &velocity_spread, forces);
        self.model.fin();
        result
    }
}

/// Sign of the given value, with zero mapped to zero.
fn sign(value: ffr) -> ffr {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Returns an error if a formula that divides by the electron velocity spread
/// is given a vanishing spread.
fn require_positive_spread(kinematics: &IonKinematics) -> FrictionResult<()> {
    if kinematics.ve_tr > 0.0 && kinematics.ve_l > 0.0 {
        Ok(())
    } else {
        Err(FrictionError::NonPositiveVelocitySpread {
            transverse: kinematics.ve_tr,
            longitudinal: kinematics.ve_l,
        })
    }
}
