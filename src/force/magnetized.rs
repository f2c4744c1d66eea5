//! Friction force in a magnetized electron beam, using the Parkhomchuk formula.

use super::{
    begin_evaluation,
    coulomb::{
        magnetized_coulomb_logarithm, min_impact_parameter, shielding_impact_parameter,
        spacing_impact_parameter, transit_impact_parameter,
    },
    ffr, FrictionForceModel,
};
use crate::{
    beam::{is_negligible_density, ElectronBeam, FrictionForces, IonBatch},
    constants::PhysicalConstants,
    error::{FrictionError, FrictionResult},
};
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Configuration parameters for the Parkhomchuk friction force.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct MagnetizedConfig {
    /// Strength of the longitudinal magnetic field in the cooler [T].
    pub magnetic_field: ffr,
    /// Effective velocity of the electrons, accounting for field imperfections [m/s].
    pub effective_electron_velocity: ffr,
    /// Time the ions spend inside the electron beam [s].
    pub interaction_time: ffr,
}

impl MagnetizedConfig {
    pub fn validate(&self) -> FrictionResult<()> {
        if !(self.magnetic_field > 0.0) {
            return Err(FrictionError::InvalidConfig(format!(
                "Magnetic field must be positive (got {})",
                self.magnetic_field
            )));
        }
        if !(self.interaction_time > 0.0) {
            return Err(FrictionError::InvalidConfig(format!(
                "Interaction time must be positive (got {})",
                self.interaction_time
            )));
        }
        if !(self.effective_electron_velocity >= 0.0) {
            return Err(FrictionError::InvalidConfig(format!(
                "Effective electron velocity must be non-negative (got {})",
                self.effective_electron_velocity
            )));
        }
        Ok(())
    }
}

impl Default for MagnetizedConfig {
    fn default() -> Self {
        Self {
            magnetic_field: 0.1,
            effective_electron_velocity: 0.0,
            interaction_time: 1e-8,
        }
    }
}

/// Electron properties entering the Parkhomchuk formula for one velocity spread.
#[derive(Clone, Copy, Debug)]
struct EffectiveSpread {
    /// Squared longitudinal RMS velocity plus squared effective velocity [m^2/s^2].
    velocity_squared_offset: ffr,
    /// Larmor radius of electrons with the transverse RMS velocity [m].
    larmor_radius: ffr,
}

/// Friction force in a magnetized electron beam.
#[derive(Clone, Debug)]
pub struct ParkhomchukFrictionForce {
    config: MagnetizedConfig,
    constants: PhysicalConstants,
}

impl ParkhomchukFrictionForce {
    pub fn new(config: MagnetizedConfig, constants: PhysicalConstants) -> FrictionResult<Self> {
        config.validate()?;
        Ok(Self { config, constants })
    }

    pub fn config(&self) -> &MagnetizedConfig {
        &self.config
    }

    fn compute_effective_spread(
        &self,
        rms_transverse_velocity: ffr,
        rms_longitudinal_velocity: ffr,
    ) -> EffectiveSpread {
        EffectiveSpread {
            velocity_squared_offset: rms_longitudinal_velocity * rms_longitudinal_velocity
                + self.config.effective_electron_velocity
                    * self.config.effective_electron_velocity,
            larmor_radius: self
                .constants
                .larmor_radius(rms_transverse_velocity, self.config.magnetic_field),
        }
    }

    /// Computes the force on a single moving ion.
    fn compute_ion_force(
        &self,
        charge_number: u32,
        v_tr: ffr,
        v_l: ffr,
        v2: ffr,
        ne: ffr,
        spread: &EffectiveSpread,
    ) -> (ffr, ffr) {
        let delta2 = v2 + spread.velocity_squared_offset;
        let rho_min = min_impact_parameter(
            charge_number as ffr * self.constants.min_impact_parameter_scale,
            delta2,
        );
        let delta = ffr::sqrt(delta2);

        let rho_max = shielding_impact_parameter(delta2, self.constants.plasma_frequency_scale, ne)
            .max(spacing_impact_parameter(charge_number, ne))
            .min(transit_impact_parameter(delta, self.config.interaction_time));

        let coulomb_logarithm = magnetized_coulomb_logarithm(rho_max, rho_min, spread.larmor_radius);

        let charge_number = charge_number as ffr;
        let force = charge_number * charge_number * self.constants.force_scale * ne
            * coulomb_logarithm
            / (delta2 * delta);
        (force * v_tr, force * v_l)
    }
}

impl FrictionForceModel for ParkhomchukFrictionForce {
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
        let number_of_ions = ions.number_of_ions();

        let effective_spreads: Vec<_> = (0..velocity_spread.number_of_values(number_of_ions))
            .map(|idx| {
                let (ve_tr, ve_l) = velocity_spread.at(idx);
                self.compute_effective_spread(ve_tr, ve_l)
            })
            .collect();

        for idx in 0..number_of_ions {
            let (v_tr, v_l, ne) = ions.ion(idx);
            if is_negligible_density(ne) {
                continue;
            }
            let v2 = v_tr * v_tr + v_l * v_l;
            if v2 > 0.0 {
                let spread = &effective_spreads[velocity_spread.index(idx)];
                forces.set(
                    idx,
                    self.compute_ion_force(charge_number, v_tr, v_l, v2, ne, spread),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::{ElectronBeamState, Temperature};
    use approx::assert_relative_eq;

    fn model() -> ParkhomchukFrictionForce {
        ParkhomchukFrictionForce::new(
            MagnetizedConfig {
                magnetic_field: 1.0,
                effective_electron_velocity: 0.0,
                interaction_time: 1e-8,
            },
            PhysicalConstants::si(),
        )
        .unwrap()
    }

    fn evaluate(
        model: &mut ParkhomchukFrictionForce,
        v_tr: &[ffr],
        v_l: &[ffr],
        ne: &[ffr],
        beam: &ElectronBeamState,
    ) -> FrictionResult<FrictionForces> {
        let ions = IonBatch::new(v_tr, v_l, ne)?;
        let mut forces = FrictionForces::default();
        model.compute_friction_forces(1, &ions, beam, &mut forces)?;
        Ok(forces)
    }

    #[test]
    fn single_ion_force_opposes_motion() {
        let beam = ElectronBeamState::constant(1e3, 1e3);
        let forces = evaluate(&mut model(), &[1e4], &[1e4], &[1e12], &beam).unwrap();
        let (f_tr, f_l) = forces.get(0);
        assert!(f_tr.is_finite() && f_l.is_finite());
        assert!(f_tr < 0.0 && f_l < 0.0);
        assert_relative_eq!(f_tr, f_l);
    }

    #[test]
    fn force_matches_hand_computation() {
        let constants = PhysicalConstants::si();
        let (v_tr, v_l, ne, ve_tr, ve_l) = (3e4, -2e4, 5e13, 2e4, 1e3);
        let beam = ElectronBeamState::constant(ve_tr, ve_l);
        let forces = evaluate(&mut model(), &[v_tr], &[v_l], &[ne], &beam).unwrap();

        let delta2 = v_tr * v_tr + v_l * v_l + ve_l * ve_l;
        let delta = delta2.sqrt();
        let rho_min = constants.min_impact_parameter_scale / delta2;
        let rho_max = (delta / (constants.plasma_frequency_scale * ne).sqrt())
            .max((3.0 / ne).cbrt())
            .min(delta * 1e-8);
        let larmor_radius = constants.larmor_radius(ve_tr, 1.0);
        let coulomb_logarithm =
            ((rho_max + rho_min + larmor_radius) / (rho_min + larmor_radius)).ln();
        let force = constants.force_scale * ne * coulomb_logarithm / (delta2 * delta);

        assert_relative_eq!(forces.transverse[0], force * v_tr, max_relative = 1e-12);
        assert_relative_eq!(forces.longitudinal[0], force * v_l, max_relative = 1e-12);
    }

    #[test]
    fn effective_velocity_weakens_force() {
        let beam = ElectronBeamState::constant(1e3, 1e3);
        let without = evaluate(&mut model(), &[1e4], &[1e4], &[1e12], &beam).unwrap();
        let mut with_model = ParkhomchukFrictionForce::new(
            MagnetizedConfig {
                effective_electron_velocity: 2e4,
                ..model().config().clone()
            },
            PhysicalConstants::si(),
        )
        .unwrap();
        let with = evaluate(&mut with_model, &[1e4], &[1e4], &[1e12], &beam).unwrap();
        assert!(with.transverse[0].abs() < without.transverse[0].abs());
    }

    #[test]
    fn degenerate_ions_feel_no_force() {
        let beam = ElectronBeamState::constant(1e3, 1e3);
        let forces = evaluate(
            &mut model(),
            &[1e4, 0.0, 1e4],
            &[1e4, 0.0, 1e4],
            &[0.0, 1e12, -1.0],
            &beam,
        )
        .unwrap();
        assert_eq!(forces, FrictionForces::zeros(3));
    }

    #[test]
    fn varying_temperature_uses_spread_of_each_ion() {
        let beam = ElectronBeamState::varying(vec![1e3, 5e3, 2e4], vec![1e2, 3e3, 1e4]).unwrap();
        let mut model = model();
        let forces = evaluate(
            &mut model,
            &[1e4, 1e4, 1e4],
            &[1e4, 1e4, 1e4],
            &[1e12, 1e12, 1e12],
            &beam,
        )
        .unwrap();
        for idx in 0..3 {
            let single_beam = ElectronBeamState::constant(
                beam.rms_transverse_velocities()[idx],
                beam.rms_longitudinal_velocities()[idx],
            );
            let single = evaluate(&mut model, &[1e4], &[1e4], &[1e12], &single_beam).unwrap();
            assert_eq!(forces.get(idx), single.get(0));
        }
        assert!(forces.transverse[0] != forces.transverse[1]);
        assert!(forces.transverse[1] != forces.transverse[2]);
    }

    #[test]
    fn unimplemented_regimes_fail_fast() {
        for temperature in [Temperature::UserDefine, Temperature::SpaceCharge] {
            let beam =
                ElectronBeamState::with_temperature(temperature, vec![1e3], vec![1e3]).unwrap();
            assert_eq!(
                evaluate(&mut model(), &[1e4], &[1e4], &[1e12], &beam).err(),
                Some(FrictionError::UnsupportedRegime(temperature))
            );
        }
    }

    #[test]
    fn non_positive_field_is_rejected() {
        let config = MagnetizedConfig {
            magnetic_field: -1.0,
            ..MagnetizedConfig::default()
        };
        assert!(matches!(
            ParkhomchukFrictionForce::new(config, PhysicalConstants::si()),
            Err(FrictionError::InvalidConfig(_))
        ));
    }
}
