//! Impact parameters and Coulomb logarithms for ion-electron collisions.

use super::ffr;
use crate::constants::PhysicalConstants;

/// Minimum impact parameter [m] for the given squared relative velocity [m^2/s^2].
///
/// `rho_min_const` is the charge number times the minimum impact parameter scale.
/// The velocity must be nonzero, which callers guarantee by short-circuiting
/// ions without relative motion.
pub fn min_impact_parameter(rho_min_const: ffr, relative_velocity_squared: ffr) -> ffr {
    rho_min_const / relative_velocity_squared
}

/// Shielding distance `v/w_p` [m] for the given squared velocity and electron density.
pub fn shielding_impact_parameter(
    velocity_squared: ffr,
    plasma_frequency_scale: ffr,
    electron_density: ffr,
) -> ffr {
    ffr::sqrt(velocity_squared / (plasma_frequency_scale * electron_density))
}

/// Lower bound on the maximum impact parameter from the inter-particle spacing [m].
pub fn spacing_impact_parameter(charge_number: u32, electron_density: ffr) -> ffr {
    ffr::cbrt(3.0 * charge_number as ffr / electron_density)
}

/// Upper bound on the maximum impact parameter from the distance travelled
/// during the interaction time [m].
pub fn transit_impact_parameter(velocity: ffr, interaction_time: ffr) -> ffr {
    velocity * interaction_time
}

/// Computes `ln(rho_max/rho_min)`, or zero when `rho_max` does not exceed `rho_min`.
pub fn coulomb_logarithm(rho_max: ffr, rho_min: ffr) -> ffr {
    if rho_max > rho_min {
        ffr::ln(rho_max / rho_min)
    } else {
        0.0
    }
}

/// Coulomb logarithm in a magnetized electron beam, where the Larmor radius of
/// the electrons adds to both impact parameters.
pub fn magnetized_coulomb_logarithm(rho_max: ffr, rho_min: ffr, larmor_radius: ffr) -> ffr {
    ffr::ln((rho_max + rho_min + larmor_radius) / (rho_min + larmor_radius))
}

/// Policy for the maximum impact parameter in a non-magnetized electron beam.
#[derive(Clone, Debug, PartialEq)]
pub struct MaxImpactParameter {
    /// Whether to shield with the sum of ion and electron squared velocities
    /// rather than the larger of the two.
    smooth: bool,
    /// Time the ions spend inside the electron beam [s].
    interaction_time: ffr,
    plasma_frequency_scale: ffr,
}

impl MaxImpactParameter {
    pub fn new(smooth: bool, interaction_time: ffr, constants: &PhysicalConstants) -> Self {
        Self {
            smooth,
            interaction_time,
            plasma_frequency_scale: constants.plasma_frequency_scale,
        }
    }

    /// Computes the maximum impact parameter [m] for an ion with squared speed
    /// `v2` moving through electrons with squared RMS speed `ve2` and density `ne`.
    ///
    /// The shielding distance is bounded below by the inter-particle spacing
    /// and above by the transit distance. The upper bound takes precedence.
    pub fn evaluate(&self, charge_number: u32, v2: ffr, ve2: ffr, ne: ffr) -> ffr {
        let shielding_velocity_squared = if self.smooth {
            v2 + ve2
        } else {
            ffr::max(v2, ve2)
        };
        shielding_impact_parameter(shielding_velocity_squared, self.plasma_frequency_scale, ne)
            .max(spacing_impact_parameter(charge_number, ne))
            .min(transit_impact_parameter(
                ffr::sqrt(v2),
                self.interaction_time,
            ))
    }
}
