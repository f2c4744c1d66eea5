//! Ions subject to friction and the state of the electron beam they move through.

use crate::{
    error::{FrictionError, FrictionResult},
    force::ffr,
};
use ndarray::prelude::*;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// How the velocity spread of the electron beam is distributed over the ions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Temperature {
    /// A single RMS velocity pair applies to all ions.
    Const,
    /// Every ion sees its own RMS velocity pair.
    Vary,
    /// Velocity spread given by a user-defined model.
    UserDefine,
    /// Velocity spread modified by space charge.
    SpaceCharge,
}

/// Defines the electron beam properties that the friction force depends on.
pub trait ElectronBeam {
    /// Returns the temperature regime of the beam.
    fn temperature(&self) -> Temperature;

    /// Returns the RMS transverse electron velocities [m/s].
    ///
    /// Holds one value under `Temperature::Const` and one value per ion under
    /// `Temperature::Vary`.
    fn rms_transverse_velocities(&self) -> &[ffr];

    /// Returns the RMS longitudinal electron velocities [m/s], indexed like
    /// `rms_transverse_velocities`.
    fn rms_longitudinal_velocities(&self) -> &[ffr];
}

/// Plain electron beam state holding RMS velocity spreads.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ElectronBeamState {
    temperature: Temperature,
    rms_transverse_velocities: Vec<ffr>,
    rms_longitudinal_velocities: Vec<ffr>,
}

impl ElectronBeamState {
    /// Creates a beam with the same velocity spread for every ion.
    pub fn constant(rms_transverse_velocity: ffr, rms_longitudinal_velocity: ffr) -> Self {
        Self {
            temperature: Temperature::Const,
            rms_transverse_velocities: vec![rms_transverse_velocity],
            rms_longitudinal_velocities: vec![rms_longitudinal_velocity],
        }
    }

    /// Creates a beam with an individual velocity spread for every ion.
    pub fn varying(
        rms_transverse_velocities: Vec<ffr>,
        rms_longitudinal_velocities: Vec<ffr>,
    ) -> FrictionResult<Self> {
        Self::with_temperature(
            Temperature::Vary,
            rms_transverse_velocities,
            rms_longitudinal_velocities,
        )
    }

    pub fn with_temperature(
        temperature: Temperature,
        rms_transverse_velocities: Vec<ffr>,
        rms_longitudinal_velocities: Vec<ffr>,
    ) -> FrictionResult<Self> {
        if rms_transverse_velocities.len() != rms_longitudinal_velocities.len() {
            return Err(FrictionError::LengthMismatch {
                quantity: "RMS longitudinal velocities",
                expected: rms_transverse_velocities.len(),
                actual: rms_longitudinal_velocities.len(),
            });
        }
        Ok(Self {
            temperature,
            rms_transverse_velocities,
            rms_longitudinal_velocities,
        })
    }
}

impl ElectronBeam for ElectronBeamState {
    fn temperature(&self) -> Temperature {
        self.temperature
    }

    fn rms_transverse_velocities(&self) -> &[ffr] {
        &self.rms_transverse_velocities
    }

    fn rms_longitudinal_velocities(&self) -> &[ffr] {
        &self.rms_longitudinal_velocities
    }
}

/// Electron velocity spreads resolved for a batch of ions.
///
/// The regime is read once from the beam, so it stays fixed for the whole batch.
#[derive(Clone, Copy, Debug)]
pub struct VelocitySpread<'a> {
    temperature: Temperature,
    rms_transverse_velocities: &'a [ffr],
    rms_longitudinal_velocities: &'a [ffr],
}

impl<'a> VelocitySpread<'a> {
    /// Resolves the velocity spreads of the given beam for the given number of ions.
    ///
    /// Fails for regimes that have no friction force implementation and when
    /// the beam holds too few spread values for the regime.
    pub fn resolve<B>(beam: &'a B, number_of_ions: usize) -> FrictionResult<Self>
    where
        B: ElectronBeam + ?Sized,
    {
        let temperature = beam.temperature();
        let required = match temperature {
            Temperature::Const => 1,
            Temperature::Vary => number_of_ions,
            Temperature::UserDefine | Temperature::SpaceCharge => {
                return Err(FrictionError::UnsupportedRegime(temperature))
            }
        };
        let rms_transverse_velocities = beam.rms_transverse_velocities();
        let rms_longitudinal_velocities = beam.rms_longitudinal_velocities();
        let available = usize::min(
            rms_transverse_velocities.len(),
            rms_longitudinal_velocities.len(),
        );
        if available < required {
            return Err(FrictionError::MissingVelocitySpread {
                regime: temperature,
                required,
                available,
            });
        }
        Ok(Self {
            temperature,
            rms_transverse_velocities,
            rms_longitudinal_velocities,
        })
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    /// Returns the index into the spread sequences used for the given ion.
    pub fn index(&self, ion_idx: usize) -> usize {
        match self.temperature {
            Temperature::Vary => ion_idx,
            _ => 0,
        }
    }

    /// Returns the number of distinct spread values in use.
    pub fn number_of_values(&self, number_of_ions: usize) -> usize {
        match self.temperature {
            Temperature::Vary => number_of_ions,
            _ => 1,
        }
    }

    /// Returns the RMS transverse and longitudinal electron velocities seen by the given ion.
    pub fn at(&self, ion_idx: usize) -> (ffr, ffr) {
        let idx = self.index(ion_idx);
        (
            self.rms_transverse_velocities[idx],
            self.rms_longitudinal_velocities[idx],
        )
    }
}

/// Velocities and local electron densities of a batch of ions.
#[derive(Clone, Debug)]
pub struct IonBatch<'a> {
    transverse_velocities: ArrayView1<'a, ffr>,
    longitudinal_velocities: ArrayView1<'a, ffr>,
    electron_densities: ArrayView1<'a, ffr>,
}

impl<'a> IonBatch<'a> {
    /// Creates a batch from transverse velocities [m/s], longitudinal velocities
    /// [m/s] and electron densities at the ion positions [1/m^3].
    pub fn new<T, L, N>(
        transverse_velocities: T,
        longitudinal_velocities: L,
        electron_densities: N,
    ) -> FrictionResult<Self>
    where
        T: Into<ArrayView1<'a, ffr>>,
        L: Into<ArrayView1<'a, ffr>>,
        N: Into<ArrayView1<'a, ffr>>,
    {
        let transverse_velocities = transverse_velocities.into();
        let longitudinal_velocities = longitudinal_velocities.into();
        let electron_densities = electron_densities.into();

        let number_of_ions = transverse_velocities.len();
        for (quantity, actual) in [
            ("longitudinal velocities", longitudinal_velocities.len()),
            ("electron densities", electron_densities.len()),
        ] {
            if actual != number_of_ions {
                return Err(FrictionError::LengthMismatch {
                    quantity,
                    expected: number_of_ions,
                    actual,
                });
            }
        }
        Ok(Self {
            transverse_velocities,
            longitudinal_velocities,
            electron_densities,
        })
    }

    pub fn number_of_ions(&self) -> usize {
        self.transverse_velocities.len()
    }

    pub fn transverse_velocities(&self) -> &ArrayView1<'a, ffr> {
        &self.transverse_velocities
    }

    pub fn longitudinal_velocities(&self) -> &ArrayView1<'a, ffr> {
        &self.longitudinal_velocities
    }

    pub fn electron_densities(&self) -> &ArrayView1<'a, ffr> {
        &self.electron_densities
    }

    /// Returns the transverse velocity, longitudinal velocity and electron
    /// density of the given ion.
    pub fn ion(&self, idx: usize) -> (ffr, ffr, ffr) {
        (
            self.transverse_velocities[idx],
            self.longitudinal_velocities[idx],
            self.electron_densities[idx],
        )
    }
}

/// Whether the electron density is too small for any friction to occur.
pub fn is_negligible_density(electron_density: ffr) -> bool {
    !(electron_density > ffr::MIN_POSITIVE)
}

/// Transverse and longitudinal friction forces [N] on each ion.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FrictionForces {
    pub transverse: Array1<ffr>,
    pub longitudinal: Array1<ffr>,
}

impl FrictionForces {
    pub fn zeros(number_of_ions: usize) -> Self {
        Self {
            transverse: Array1::zeros(number_of_ions),
            longitudinal: Array1::zeros(number_of_ions),
        }
    }

    pub fn number_of_ions(&self) -> usize {
        self.transverse.len()
    }

    /// Sizes the force arrays for the given number of ions and zeroes them.
    pub fn reset(&mut self, number_of_ions: usize) {
        if self.transverse.len() == number_of_ions && self.longitudinal.len() == number_of_ions {
            self.transverse.fill(0.0);
            self.longitudinal.fill(0.0);
        } else {
            *self = Self::zeros(number_of_ions);
        }
    }

    pub fn set(&mut self, ion_idx: usize, (transverse, longitudinal): (ffr, ffr)) {
        self.transverse[ion_idx] = transverse;
        self.longitudinal[ion_idx] = longitudinal;
    }

    pub fn get(&self, ion_idx: usize) -> (ffr, ffr) {
        (self.transverse[ion_idx], self.longitudinal[ion_idx])
    }
}
