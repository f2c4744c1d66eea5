//! Friction force exerted by the electron beam of a cooler on co-propagating ions.

pub mod coulomb;
pub mod magnetized;
pub mod unmagnetized;

use self::{
    magnetized::{MagnetizedConfig, ParkhomchukFrictionForce},
    unmagnetized::{
        derbenev::Derbenev,
        meshkov::Meshkov,
        numeric_1d::{Numeric1DConfig, SemiAnalytic1D},
        numeric_3d::{Numeric3D, Numeric3DConfig},
        UnmagnetizedConfig, UnmagnetizedFrictionForce,
    },
};
use crate::{
    beam::{ElectronBeam, FrictionForces, IonBatch, VelocitySpread},
    constants::PhysicalConstants,
    error::FrictionResult,
};
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Floating-point precision to use for friction force physics.
#[allow(non_camel_case_types)]
pub type ffr = f64;

/// Component of the friction force relative to the beam direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceComponent {
    Transverse,
    Longitudinal,
}

/// Defines the properties of a friction force model.
///
/// Implementations may hold scratch state that depends on the electron beam, so
/// a model instance must not be shared between threads evaluating different
/// batches. Give each worker its own instance instead.
pub trait FrictionForceModel: Send {
    /// Computes the friction force on every ion in the batch.
    ///
    /// # Parameters
    ///
    /// - `charge_number`: Charge number of the ions.
    /// - `ions`: Velocities and local electron densities of the ions.
    /// - `beam`: Electron beam providing the temperature regime and velocity spreads.
    /// - `forces`: Output forces. Resized to the number of ions and fully overwritten.
    ///
    /// # Returns
    ///
    /// A `FrictionResult<()>` which is an error if the temperature regime is not
    /// supported, the beam lacks velocity spreads for the ions or a numerical
    /// integral fails. Forces of ions not yet processed when an error occurs are zero.
    fn compute_friction_forces(
        &mut self,
        charge_number: u32,
        ions: &IonBatch,
        beam: &dyn ElectronBeam,
        forces: &mut FrictionForces,
    ) -> FrictionResult<()>;
}

/// Resolves the electron velocity spreads for the batch and prepares the
/// output arrays.
fn begin_evaluation<'a>(
    ions: &IonBatch,
    beam: &'a dyn ElectronBeam,
    forces: &mut FrictionForces,
) -> FrictionResult<VelocitySpread<'a>> {
    let number_of_ions = ions.number_of_ions();
    let spread = VelocitySpread::resolve(beam, number_of_ions)?;
    forces.reset(number_of_ions);
    log::trace!(
        "Computing friction forces for {} ions ({:?} temperature)",
        number_of_ions,
        spread.temperature()
    );
    Ok(spread)
}

/// Available friction force formulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ForceFormula {
    /// Magnetized electron beam, Parkhomchuk formula.
    Parkhomchuk,
    /// Non-magnetized electron beam, Derbenev parametrization.
    Derbenev,
    /// Non-magnetized electron beam, Meshkov parametrization.
    Meshkov,
    /// Non-magnetized electron beam, one-dimensional semi-analytic integral.
    Numeric1D,
    /// Non-magnetized electron beam, integral over the full velocity distribution.
    Numeric3D,
}

/// Configuration parameters for building a friction force model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct FrictionForceConfig {
    /// Which formula to use.
    pub formula: ForceFormula,
    /// Parameters for the magnetized formula.
    pub magnetized: MagnetizedConfig,
    /// Parameters shared by the non-magnetized formulas.
    pub unmagnetized: UnmagnetizedConfig,
    /// Parameters specific to the one-dimensional numeric formula.
    pub numeric_1d: Numeric1DConfig,
    /// Parameters specific to the three-dimensional numeric formula.
    pub numeric_3d: Numeric3DConfig,
}

impl FrictionForceConfig {
    /// Checks the parameters relevant for the selected formula.
    pub fn validate(&self) -> FrictionResult<()> {
        match self.formula {
            ForceFormula::Parkhomchuk => self.magnetized.validate(),
            ForceFormula::Derbenev | ForceFormula::Meshkov => self.unmagnetized.validate(),
            ForceFormula::Numeric1D => {
                self.unmagnetized.validate()?;
                self.numeric_1d.validate()
            }
            ForceFormula::Numeric3D => {
                self.unmagnetized.validate()?;
                self.numeric_3d.validate()
            }
        }
    }
}

impl Default for FrictionForceConfig {
    fn default() -> Self {
        Self {
            formula: ForceFormula::Parkhomchuk,
            magnetized: MagnetizedConfig::default(),
            unmagnetized: UnmagnetizedConfig::default(),
            numeric_1d: Numeric1DConfig::default(),
            numeric_3d: Numeric3DConfig::default(),
        }
    }
}

/// Creates the friction force model selected by the given configuration.
pub fn build_friction_force_model(
    config: &FrictionForceConfig,
    constants: PhysicalConstants,
) -> FrictionResult<Box<dyn FrictionForceModel>> {
    log::debug!("Building {:?} friction force model", config.formula);
    let unmagnetized = config.unmagnetized.clone();
    Ok(match config.formula {
        ForceFormula::Parkhomchuk => Box::new(ParkhomchukFrictionForce::new(
            config.magnetized.clone(),
            constants,
        )?),
        ForceFormula::Derbenev => Box::new(UnmagnetizedFrictionForce::new(
            unmagnetized,
            constants,
            Derbenev,
        )?),
        ForceFormula::Meshkov => Box::new(UnmagnetizedFrictionForce::new(
            unmagnetized,
            constants,
            Meshkov,
        )?),
        ForceFormula::Numeric1D => Box::new(UnmagnetizedFrictionForce::new(
            unmagnetized,
            constants,
            SemiAnalytic1D::new(config.numeric_1d.clone())?,
        )?),
        ForceFormula::Numeric3D => Box::new(UnmagnetizedFrictionForce::new(
            unmagnetized,
            constants,
            Numeric3D::new(config.numeric_3d.clone())?,
        )?),
    })
}
