//! Physical and mathematical constants.

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Floating-point precision to use for constants.
#[allow(non_camel_case_types)]
pub type fcn = f64;

// Mathematical constants

pub const PI: fcn = std::f64::consts::PI;

// Physical constants (SI)

/// Elementary charge [C].
pub const Q_ELECTRON: fcn = 1.602_176_634e-19;
/// Electron rest energy [eV].
pub const MC2_ELECTRON_EV: fcn = 0.510_998_950e6;
/// Speed of light in vacuum [m/s].
pub const CLIGHT: fcn = 299_792_458.0;
/// Coulomb constant 1/(4*pi*eps0) [N m^2/C^2].
pub const K_COULOMB: fcn = 8.987_551_787_368_176e9;

/// Physical constants used by the friction force models.
///
/// The derived prefactors are stored rather than recomputed so that tests can
/// substitute them independently.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PhysicalConstants {
    /// Electron rest energy [eV].
    pub electron_rest_energy: fcn,
    /// Speed of light in vacuum [m/s].
    pub speed_of_light: fcn,
    /// The number pi.
    pub pi: fcn,
    /// `-4*pi*c^2*k^2*e^3/(m_e c^2 [eV])`, scale of the drag force per unit
    /// density, Coulomb logarithm and squared charge number [N m^3 m^2/s^2].
    pub force_scale: fcn,
    /// `4*pi*c^2*e*k/(m_e c^2 [eV])`, such that `w_p^2 = scale*n_e` [m^3/s^2].
    pub plasma_frequency_scale: fcn,
    /// `e*k*c^2/(m_e c^2 [eV])`, such that `rho_min = Z*scale/v^2` [m^3/s^2].
    pub min_impact_parameter_scale: fcn,
}

impl PhysicalConstants {
    /// Creates the set of constants from CODATA values in SI units.
    pub fn si() -> Self {
        let c2 = CLIGHT * CLIGHT;
        Self {
            electron_rest_energy: MC2_ELECTRON_EV,
            speed_of_light: CLIGHT,
            pi: PI,
            force_scale: -4.0 * PI * c2 * K_COULOMB * K_COULOMB * Q_ELECTRON.powi(3)
                / MC2_ELECTRON_EV,
            plasma_frequency_scale: 4.0 * PI * c2 * Q_ELECTRON * K_COULOMB / MC2_ELECTRON_EV,
            min_impact_parameter_scale: Q_ELECTRON * K_COULOMB * c2 / MC2_ELECTRON_EV,
        }
    }

    /// Gyration radius [m] of an electron with the given transverse velocity [m/s]
    /// in the given magnetic field [T].
    pub fn larmor_radius(&self, transverse_velocity: fcn, magnetic_field: fcn) -> fcn {
        self.electron_rest_energy * transverse_velocity
            / (magnetic_field * self.speed_of_light * self.speed_of_light)
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::si()
    }
}
