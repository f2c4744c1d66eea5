//! Midpoint grid over the electron velocity distribution.

use crate::{constants::PI, force::ffr};
use ndarray::prelude::*;

/// Electron velocity nodes and Maxwellian weights for one pair of RMS velocities.
///
/// Transverse speeds cover `[0, 3*sigma_tr]`, longitudinal velocities cover
/// `[-3*sigma_l, 3*sigma_l]` and the azimuth covers `[0, pi]`, each with
/// nodes at the midpoints of equally sized cells.
#[derive(Clone, Debug)]
pub struct VelocityGrid {
    spread: (ffr, ffr),
    /// Negated longitudinal electron velocity of each longitudinal node.
    negated_longitudinal_velocities: Array1<ffr>,
    /// `-cos(phi)*u_tr`, indexed by `[phi, u_tr]`.
    projected_transverse_velocities: Array2<ffr>,
    /// `(u_tr*sin(phi))^2`, indexed by `[phi, u_tr]`.
    perpendicular_velocities_squared: Array2<ffr>,
    /// `exp(-u_tr^2/(2*sigma_tr^2) - u_l^2/(2*sigma_l^2))*u_tr`, indexed by `[u_l, u_tr]`.
    weights: Array2<ffr>,
    inverse_norm: ffr,
}

impl VelocityGrid {
    /// Builds the grid for the given RMS transverse and longitudinal electron
    /// velocities, which must be positive.
    pub fn new(
        n_transverse: usize,
        n_longitudinal: usize,
        n_azimuthal: usize,
        rms_transverse_velocity: ffr,
        rms_longitudinal_velocity: ffr,
    ) -> Self {
        let d_transverse = 3.0 * rms_transverse_velocity / n_transverse as ffr;
        let d_longitudinal = 6.0 * rms_longitudinal_velocity / n_longitudinal as ffr;
        let d_azimuthal = PI / n_azimuthal as ffr;

        let transverse_velocities =
            Array1::from_shape_fn(n_transverse, |j| (j as ffr + 0.5) * d_transverse);
        let longitudinal_velocities = Array1::from_shape_fn(n_longitudinal, |i| {
            -3.0 * rms_longitudinal_velocity + (i as ffr + 0.5) * d_longitudinal
        });
        let azimuths = Array1::from_shape_fn(n_azimuthal, |k| (k as ffr + 0.5) * d_azimuthal);

        let projected_transverse_velocities =
            Array2::from_shape_fn((n_azimuthal, n_transverse), |(k, j)| {
                -ffr::cos(azimuths[k]) * transverse_velocities[j]
            });
        let perpendicular_velocities_squared =
            Array2::from_shape_fn((n_azimuthal, n_transverse), |(k, j)| {
                let perpendicular_velocity = ffr::sin(azimuths[k]) * transverse_velocities[j];
                perpendicular_velocity * perpendicular_velocity
            });

        let inv_two_sigma2_tr = 0.5 / (rms_transverse_velocity * rms_transverse_velocity);
        let inv_two_sigma2_l = 0.5 / (rms_longitudinal_velocity * rms_longitudinal_velocity);
        let weights = Array2::from_shape_fn((n_longitudinal, n_transverse), |(i, j)| {
            let u_tr = transverse_velocities[j];
            let u_l = longitudinal_velocities[i];
            ffr::exp(-u_tr * u_tr * inv_two_sigma2_tr - u_l * u_l * inv_two_sigma2_l) * u_tr
        });
        let inverse_norm = 1.0 / (n_azimuthal as ffr * weights.sum());

        Self {
            spread: (rms_transverse_velocity, rms_longitudinal_velocity),
            negated_longitudinal_velocities: longitudinal_velocities.mapv(|u_l| -u_l),
            projected_transverse_velocities,
            perpendicular_velocities_squared,
            weights,
            inverse_norm,
        }
    }

    /// RMS transverse and longitudinal velocities the grid was built for.
    pub fn spread(&self) -> (ffr, ffr) {
        self.spread
    }

    pub fn matches(&self, rms_transverse_velocity: ffr, rms_longitudinal_velocity: ffr) -> bool {
        self.spread == (rms_transverse_velocity, rms_longitudinal_velocity)
    }

    /// Number of transverse, longitudinal and azimuthal nodes.
    pub fn shape(&self) -> (usize, usize, usize) {
        let (n_longitudinal, n_transverse) = self.weights.dim();
        (
            n_transverse,
            n_longitudinal,
            self.projected_transverse_velocities.nrows(),
        )
    }

    /// Computes the normalized distribution averages of `u*L_C/|u|^3` for the
    /// transverse and longitudinal components of the relative velocity `u`
    /// between an ion and the electrons.
    ///
    /// `coulomb_logarithm` is called with `|u|^2` for every node. Nodes where
    /// the relative velocity vanishes are skipped.
    pub fn average<F>(
        &self,
        transverse_velocity: ffr,
        longitudinal_velocity: ffr,
        coulomb_logarithm: F,
    ) -> (ffr, ffr)
    where
        F: Fn(ffr) -> ffr,
    {
        let mut sum_transverse = 0.0;
        let mut sum_longitudinal = 0.0;

        for (&negated_u_l, weights) in self
            .negated_longitudinal_velocities
            .iter()
            .zip(self.weights.outer_iter())
        {
            let sub_l = longitudinal_velocity + negated_u_l;
            let sub_l2 = sub_l * sub_l;
            for (projected, perpendicular2) in self
                .projected_transverse_velocities
                .outer_iter()
                .zip(self.perpendicular_velocities_squared.outer_iter())
            {
                for ((&weight, &projected_u_tr), &perpendicular_u2) in weights
                    .iter()
                    .zip(projected.iter())
                    .zip(perpendicular2.iter())
                {
                    let sub_tr = transverse_velocity + projected_u_tr;
                    let f_bot = sub_l2 + sub_tr * sub_tr + perpendicular_u2;
                    if f_bot == 0.0 {
                        continue;
                    }
                    let f = weight * coulomb_logarithm(f_bot) / (f_bot * ffr::sqrt(f_bot));
                    sum_transverse += sub_tr * f;
                    sum_longitudinal += sub_l * f;
                }
            }
        }
        (
            sum_transverse * self.inverse_norm,
            sum_longitudinal * self.inverse_norm,
        )
    }
}
