//! Non-magnetized friction force from an integral over the full three-dimensional
//! Maxwellian electron velocity distribution.

pub mod velocity_grid;

use self::velocity_grid::VelocityGrid;
use super::{require_positive_spread, ForceContext, IonKinematics, UnmagnetizedForce};
use crate::{
    constants::PI,
    error::{FrictionError, FrictionResult},
    force::{coulomb, ffr, ForceComponent},
    math::{
        fin, gauss_kronrod::GaussKronrodIntegrator, IntegrationDomain, IntegrationResult,
        Integrator, QuadratureConfig,
    },
};
use lazy_static::lazy_static;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Inverse of the integral of `exp(-x_tr^2 - x_l^2)*x_tr` over `x_tr` in
    /// `[0, inf)`, `x_l` in `(-inf, inf)` and the azimuth in `[0, pi]`.
    static ref INVERSE_DISTRIBUTION_NORM: fin = 2.0 / (PI * fin::sqrt(PI));
}

/// How the distribution integral is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Numeric3DStrategy {
    /// Fixed midpoint grid over three standard deviations, reused as long as
    /// the velocity spread stays the same.
    ///
    /// Truncating the distribution at three standard deviations limits the
    /// accuracy to about 2% for ions inside the distribution, regardless of
    /// the number of nodes.
    Grid,
    /// Nested adaptive quadrature over the unbounded distribution.
    Adaptive,
}

/// Configuration parameters for the three-dimensional numeric formula.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Numeric3DConfig {
    pub strategy: Numeric3DStrategy,
    /// Number of transverse electron speed nodes of the grid.
    pub n_transverse: usize,
    /// Number of longitudinal electron velocity nodes of the grid.
    pub n_longitudinal: usize,
    /// Number of azimuthal nodes of the grid.
    pub n_azimuthal: usize,
    /// Whether to evaluate the Coulomb logarithm once per ion, using the mean
    /// relative velocity, instead of for every electron velocity.
    ///
    /// With the grid strategy this is only reliable for ions faster than about
    /// three standard deviations. Slower ions get a nonvanishing logarithm at
    /// nodes close to the ion velocity, where the kernel diverges.
    pub use_mean_rho_min: bool,
    /// Tolerances for the adaptive strategy.
    pub quadrature: QuadratureConfig,
}

impl Numeric3DConfig {
    pub fn validate(&self) -> FrictionResult<()> {
        if self.n_transverse == 0 || self.n_longitudinal == 0 || self.n_azimuthal == 0 {
            return Err(FrictionError::InvalidConfig(format!(
                "Velocity grid must have at least one node along each axis (got {}x{}x{})",
                self.n_transverse, self.n_longitudinal, self.n_azimuthal
            )));
        }
        self.quadrature.validate()
    }
}

impl Default for Numeric3DConfig {
    fn default() -> Self {
        Self {
            strategy: Numeric3DStrategy::Grid,
            n_transverse: 20,
            n_longitudinal: 20,
            n_azimuthal: 20,
            use_mean_rho_min: false,
            quadrature: QuadratureConfig::default(),
        }
    }
}

/// Integrand of the adaptive strategy for one ion and force component.
///
/// Velocities are divided by the RMS transverse electron velocity, and the
/// electron velocity is `sqrt(2)*sigma*x` in terms of the integration variables.
#[derive(Clone, Copy, Debug)]
struct DistributionKernel {
    v_tr: fin,
    v_l: fin,
    k_tr: fin,
    k_l: fin,
    rho_max: fin,
    rho_min_const: fin,
    mean_coulomb_logarithm: Option<fin>,
    component: ForceComponent,
}

impl DistributionKernel {
    fn evaluate(&self, x_tr: fin, x_l: fin, phi: fin) -> fin {
        let weight = fin::exp(-x_tr * x_tr - x_l * x_l) * x_tr;
        if weight == 0.0 {
            return 0.0;
        }
        let u_tr = self.k_tr * x_tr;
        let sub_tr = self.v_tr - u_tr * fin::cos(phi);
        let sub_l = self.v_l - self.k_l * x_l;
        let perpendicular = u_tr * fin::sin(phi);
        let f_bot = sub_tr * sub_tr + sub_l * sub_l + perpendicular * perpendicular;
        if f_bot == 0.0 {
            return 0.0;
        }
        let coulomb_logarithm = self.mean_coulomb_logarithm.unwrap_or_else(|| {
            coulomb::coulomb_logarithm(
                self.rho_max,
                coulomb::min_impact_parameter(self.rho_min_const, f_bot),
            )
        });
        let sub = match self.component {
            ForceComponent::Transverse => sub_tr,
            ForceComponent::Longitudinal => sub_l,
        };
        weight * coulomb_logarithm * sub / (f_bot * fin::sqrt(f_bot))
    }
}

/// Friction force from the full distribution integral, with the integrator `I`
/// used by the adaptive strategy.
#[derive(Clone, Debug)]
pub struct Numeric3D<I: Integrator + Send = GaussKronrodIntegrator> {
    config: Numeric3DConfig,
    integrator: I,
    grid: Option<VelocityGrid>,
}

impl Numeric3D {
    pub fn new(config: Numeric3DConfig) -> FrictionResult<Self> {
        let integrator = GaussKronrodIntegrator::new(config.quadrature.clone());
        Self::with_integrator(config, integrator)
    }
}

impl<I: Integrator + Send> Numeric3D<I> {
    pub fn with_integrator(config: Numeric3DConfig, integrator: I) -> FrictionResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            integrator,
            grid: None,
        })
    }

    /// Returns the most recently used velocity grid, if any.
    pub fn grid(&self) -> Option<&VelocityGrid> {
        self.grid.as_ref()
    }

    /// Returns the grid for the given velocity spread, rebuilding it if the
    /// spread differs from the one it was built for.
    fn velocity_grid(&mut self, ve_tr: ffr, ve_l: ffr) -> &VelocityGrid {
        let grid = match self.grid.take() {
            Some(grid) if grid.matches(ve_tr, ve_l) => grid,
            _ => {
                log::trace!(
                    "Building {}x{}x{} velocity grid for RMS velocities ({:e}, {:e})",
                    self.config.n_transverse,
                    self.config.n_longitudinal,
                    self.config.n_azimuthal,
                    ve_tr,
                    ve_l
                );
                VelocityGrid::new(
                    self.config.n_transverse,
                    self.config.n_longitudinal,
                    self.config.n_azimuthal,
                    ve_tr,
                    ve_l,
                )
            }
        };
        self.grid.insert(grid)
    }

    fn mean_coulomb_logarithm(
        &self,
        kinematics: &IonKinematics,
        context: &ForceContext,
    ) -> Option<ffr> {
        if self.config.use_mean_rho_min {
            Some(context.coulomb_logarithm(kinematics))
        } else {
            None
        }
    }

    fn compute_grid_force(
        &mut self,
        kinematics: &IonKinematics,
        context: &ForceContext,
    ) -> (ffr, ffr) {
        let mean_coulomb_logarithm = self.mean_coulomb_logarithm(kinematics, context);
        let rho_max = context.rho_max(kinematics);

        let grid = self.velocity_grid(kinematics.ve_tr, kinematics.ve_l);
        let (average_tr, average_l) = grid.average(kinematics.v_tr, kinematics.v_l, |f_bot| {
            mean_coulomb_logarithm
                .unwrap_or_else(|| coulomb::coulomb_logarithm(rho_max, context.rho_min(f_bot)))
        });

        let scale = context.f_const * kinematics.ne;
        (scale * average_tr, scale * average_l)
    }

    fn compute_adaptive_force(
        &self,
        kinematics: &IonKinematics,
        context: &ForceContext,
    ) -> FrictionResult<(ffr, ffr)> {
        let velocity_scale = kinematics.ve_tr;
        let velocity_scale2 = velocity_scale * velocity_scale;
        let kernel = DistributionKernel {
            v_tr: kinematics.v_tr / velocity_scale,
            v_l: kinematics.v_l / velocity_scale,
            k_tr: fin::sqrt(2.0),
            k_l: fin::sqrt(2.0) * kinematics.ve_l / velocity_scale,
            rho_max: context.rho_max(kinematics),
            rho_min_const: context.rho_min_const / velocity_scale2,
            mean_coulomb_logarithm: self.mean_coulomb_logarithm(kinematics, context),
            component: ForceComponent::Transverse,
        };
        let scale =
            context.f_const * kinematics.ne * *INVERSE_DISTRIBUTION_NORM / velocity_scale2;

        // Components of a vanishing ion velocity integrate to zero by symmetry.
        let compute_component = |velocity: ffr, component| -> FrictionResult<ffr> {
            if velocity == 0.0 {
                Ok(0.0)
            } else {
                let integral = self.integrate_distribution(&DistributionKernel {
                    component,
                    ..kernel
                })?;
                Ok(scale * integral)
            }
        };
        Ok((
            compute_component(kinematics.v_tr, ForceComponent::Transverse)?,
            compute_component(kinematics.v_l, ForceComponent::Longitudinal)?,
        ))
    }

    fn integrate_distribution(&self, kernel: &DistributionKernel) -> FrictionResult<fin> {
        let integrator = &self.integrator;

        let integrate_azimuth = |x_tr: fin, x_l: fin| -> IntegrationResult<fin> {
            integrator
                .integrate(
                    &|phi| Ok(kernel.evaluate(x_tr, x_l, phi)),
                    IntegrationDomain::Finite {
                        start: 0.0,
                        end: PI,
                    },
                )
                .map(|quadrature| quadrature.value)
        };
        let integrate_longitudinal = |x_tr: fin| -> IntegrationResult<fin> {
            integrator
                .integrate(
                    &|x_l| integrate_azimuth(x_tr, x_l),
                    IntegrationDomain::Infinite,
                )
                .map(|quadrature| quadrature.value)
        };
        let quadrature = integrator.integrate(
            &integrate_longitudinal,
            IntegrationDomain::SemiInfinite { start: 0.0 },
        )?;
        Ok(quadrature.value)
    }
}

impl<I: Integrator + Send> UnmagnetizedForce for Numeric3D<I> {
    fn force(
        &mut self,
        kinematics: &IonKinematics,
        context: &ForceContext,
    ) -> FrictionResult<(ffr, ffr)> {
        require_positive_spread(kinematics)?;
        match self.config.strategy {
            Numeric3DStrategy::Grid => Ok(self.compute_grid_force(kinematics, context)),
            Numeric3DStrategy::Adaptive => self.compute_adaptive_force(kinematics, context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        beam::{ElectronBeam, ElectronBeamState, FrictionForces, IonBatch},
        constants::PhysicalConstants,
        force::{
            unmagnetized::{
                meshkov::Meshkov,
                numeric_1d::{Numeric1DConfig, SemiAnalytic1D},
                UnmagnetizedConfig, UnmagnetizedFrictionForce,
            },
            FrictionForceModel,
        },
    };
    use approx::assert_relative_eq;

    fn model<M: UnmagnetizedForce>(formula: M) -> UnmagnetizedFrictionForce<M> {
        UnmagnetizedFrictionForce::new(
            UnmagnetizedConfig {
                interaction_time: 4e-9,
                smooth_rho_max: false,
            },
            PhysicalConstants::si(),
            formula,
        )
        .unwrap()
    }

    fn numeric_3d(strategy: Numeric3DStrategy, use_mean_rho_min: bool) -> Numeric3D {
        Numeric3D::new(Numeric3DConfig {
            strategy,
            use_mean_rho_min,
            ..Numeric3DConfig::default()
        })
        .unwrap()
    }

    fn evaluate<M: UnmagnetizedForce>(
        model: &mut UnmagnetizedFrictionForce<M>,
        v_tr: &[ffr],
        v_l: &[ffr],
        beam: &dyn ElectronBeam,
    ) -> FrictionForces {
        let ne = vec![1e14; v_tr.len()];
        let ions = IonBatch::new(v_tr, v_l, &ne[..]).unwrap();
        let mut forces = FrictionForces::default();
        model
            .compute_friction_forces(1, &ions, beam, &mut forces)
            .unwrap();
        forces
    }

    #[test]
    fn grid_and_adaptive_strategies_agree_for_fast_ions() {
        let beam = ElectronBeamState::constant(1e4, 1e4);
        let v_tr = [1e5, 7e4, 8e4];
        let v_l = [1e5, 7e4, -6e4];
        let grid = evaluate(
            &mut model(numeric_3d(Numeric3DStrategy::Grid, false)),
            &v_tr,
            &v_l,
            &beam,
        );
        let adaptive = evaluate(
            &mut model(numeric_3d(Numeric3DStrategy::Adaptive, false)),
            &v_tr,
            &v_l,
            &beam,
        );
        for idx in 0..v_tr.len() {
            assert_relative_eq!(
                grid.transverse[idx],
                adaptive.transverse[idx],
                max_relative = 2e-3
            );
            assert_relative_eq!(
                grid.longitudinal[idx],
                adaptive.longitudinal[idx],
                max_relative = 2e-3
            );
        }
    }

    #[test]
    fn grid_and_adaptive_strategies_agree_inside_distribution() {
        for (rms_tr, rms_l, v_tr, v_l, tolerance) in [
            (1e4, 1e4, [1e4, 5e3], [1e4, 2e4], 2e-2),
            (1e4, 5e3, [1e4, 2e4], [5e3, -1e4], 3e-2),
        ] {
            let beam = ElectronBeamState::constant(rms_tr, rms_l);
            let grid = evaluate(
                &mut model(numeric_3d(Numeric3DStrategy::Grid, false)),
                &v_tr,
                &v_l,
                &beam,
            );
            let adaptive = evaluate(
                &mut model(numeric_3d(Numeric3DStrategy::Adaptive, false)),
                &v_tr,
                &v_l,
                &beam,
            );
            for idx in 0..v_tr.len() {
                assert_relative_eq!(
                    grid.transverse[idx],
                    adaptive.transverse[idx],
                    max_relative = tolerance
                );
                assert_relative_eq!(
                    grid.longitudinal[idx],
                    adaptive.longitudinal[idx],
                    max_relative = tolerance
                );
            }
        }
    }

    #[test]
    fn adaptive_force_with_mean_logarithm_equals_semi_analytic_force() {
        // Integrating out the azimuth and the electron speed analytically gives
        // the one-dimensional integral.
        for (rms_tr, rms_l, v_tr, v_l) in [
            (1e4, 1e4, [1e4, 5e3], [1e4, 2e4]),
            (1e4, 3e3, [2e4, 3e4], [5e3, -1e4]),
        ] {
            let beam = ElectronBeamState::constant(rms_tr, rms_l);
            let adaptive = evaluate(
                &mut model(numeric_3d(Numeric3DStrategy::Adaptive, true)),
                &v_tr,
                &v_l,
                &beam,
            );
            let semi_analytic = evaluate(
                &mut model(SemiAnalytic1D::new(Numeric1DConfig::default()).unwrap()),
                &v_tr,
                &v_l,
                &beam,
            );
            for idx in 0..v_tr.len() {
                assert_relative_eq!(
                    adaptive.transverse[idx],
                    semi_analytic.transverse[idx],
                    max_relative = 1e-5
                );
                assert_relative_eq!(
                    adaptive.longitudinal[idx],
                    semi_analytic.longitudinal[idx],
                    max_relative = 1e-5
                );
            }
        }
    }

    #[test]
    fn grid_force_approaches_meshkov_for_fast_ions() {
        let beam = ElectronBeamState::constant(1e3, 1e3);
        let (v_tr, v_l) = ([3e5], [4e5]);
        let numeric = evaluate(
            &mut model(numeric_3d(Numeric3DStrategy::Grid, false)),
            &v_tr,
            &v_l,
            &beam,
        );
        let meshkov = evaluate(&mut model(Meshkov), &v_tr, &v_l, &beam);
        assert_relative_eq!(numeric.transverse[0], meshkov.transverse[0], max_relative = 1e-2);
        assert_relative_eq!(
            numeric.longitudinal[0],
            meshkov.longitudinal[0],
            max_relative = 1e-2
        );
    }

    #[test]
    fn grid_is_rebuilt_only_when_spread_changes() {
        let mut model = model(numeric_3d(Numeric3DStrategy::Grid, false));
        let first_beam = ElectronBeamState::constant(1e4, 2e3);
        let second_beam = ElectronBeamState::constant(2e4, 2e3);
        let (v_tr, v_l) = ([5e4], [3e4]);

        assert!(model.model().grid().is_none());
        let first = evaluate(&mut model, &v_tr, &v_l, &first_beam);
        assert_eq!(model.model().grid().map(|grid| grid.spread()), Some((1e4, 2e3)));

        let second = evaluate(&mut model, &v_tr, &v_l, &second_beam);
        assert_eq!(model.model().grid().map(|grid| grid.spread()), Some((2e4, 2e3)));
        assert!(first.transverse[0] != second.transverse[0]);

        let first_again = evaluate(&mut model, &v_tr, &v_l, &first_beam);
        assert_eq!(first, first_again);
    }

    #[test]
    fn varying_temperature_matches_constant_temperature_per_ion() {
        let mut model = model(numeric_3d(Numeric3DStrategy::Grid, false));
        let v_tr = [5e4, 5e4, 5e4];
        let v_l = [2e4, 2e4, 2e4];
        let rms_tr = vec![1e4, 2e4, 1e4];
        let rms_l = vec![1e3, 2e3, 3e3];
        let beam = ElectronBeamState::varying(rms_tr.clone(), rms_l.clone()).unwrap();
        let varying = evaluate(&mut model, &v_tr, &v_l, &beam);

        for idx in 0..v_tr.len() {
            let single_beam = ElectronBeamState::constant(rms_tr[idx], rms_l[idx]);
            let single = evaluate(&mut model, &v_tr[idx..=idx], &v_l[idx..=idx], &single_beam);
            assert_eq!(varying.get(idx), single.get(0));
        }
    }

    #[test]
    fn mean_coulomb_logarithm_is_close_to_node_wise_logarithm() {
        let beam = ElectronBeamState::constant(1e4, 1e4);
        let (v_tr, v_l) = ([8e4], [6e4]);
        let node_wise = evaluate(
            &mut model(numeric_3d(Numeric3DStrategy::Grid, false)),
            &v_tr,
            &v_l,
            &beam,
        );
        let mean = evaluate(
            &mut model(numeric_3d(Numeric3DStrategy::Grid, true)),
            &v_tr,
            &v_l,
            &beam,
        );
        assert!(node_wise != mean);
        assert_relative_eq!(node_wise.transverse[0], mean.transverse[0], max_relative = 2e-2);
        assert_relative_eq!(node_wise.longitudinal[0], mean.longitudinal[0], max_relative = 2e-2);
    }

    #[test]
    fn vanishing_velocity_spread_is_rejected() {
        let mut model = model(numeric_3d(Numeric3DStrategy::Grid, false));
        let (v_tr, v_l, ne) = ([5e4], [3e4], [1e14]);
        let ions = IonBatch::new(&v_tr[..], &v_l[..], &ne[..]).unwrap();
        let beam = ElectronBeamState::constant(0.0, 1e3);
        let mut forces = FrictionForces::default();
        assert!(matches!(
            model.compute_friction_forces(1, &ions, &beam, &mut forces),
            Err(FrictionError::NonPositiveVelocitySpread { .. })
        ));
        assert!(model.model().grid().is_none());
    }

    #[test]
    fn empty_grid_is_rejected() {
        let config = Numeric3DConfig {
            n_azimuthal: 0,
            ..Numeric3DConfig::default()
        };
        assert!(matches!(
            Numeric3D::new(config),
            Err(FrictionError::InvalidConfig(_))
        ));
    }
}
