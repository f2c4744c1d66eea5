use ecool::{
    build_friction_force_model,
    force::{
        ffr,
        magnetized::MagnetizedConfig,
        unmagnetized::{
            numeric_3d::{Numeric3DConfig, Numeric3DStrategy},
            UnmagnetizedConfig,
        },
    },
    ElectronBeam, ForceFormula, FrictionForceConfig, FrictionForceModel, FrictionForces,
    IonBatch, PhysicalConstants,
};
use lazy_static::lazy_static;

lazy_static! {
    /// One configuration for every formula, with the 3D formula listed once per strategy.
    pub static ref ALL_CONFIGS: Vec<FrictionForceConfig> = {
        let mut configs: Vec<_> = [
            ForceFormula::Parkhomchuk,
            ForceFormula::Derbenev,
            ForceFormula::Meshkov,
            ForceFormula::Numeric1D,
            ForceFormula::Numeric3D,
        ]
        .into_iter()
        .map(config_for)
        .collect();
        configs.push(numeric_3d_config(Numeric3DStrategy::Adaptive));
        configs
    };
}

#[macro_export]
macro_rules! for_each_config {
    (|$config:ident| $body:expr) => {
        for $config in common::ALL_CONFIGS.iter() {
            $body
        }
    };
}

pub fn config_for(formula: ForceFormula) -> FrictionForceConfig {
    FrictionForceConfig {
        formula,
        magnetized: MagnetizedConfig {
            magnetic_field: 1.0,
            ..MagnetizedConfig::default()
        },
        unmagnetized: UnmagnetizedConfig {
            interaction_time: 4e-9,
            smooth_rho_max: false,
        },
        ..FrictionForceConfig::default()
    }
}

pub fn numeric_3d_config(strategy: Numeric3DStrategy) -> FrictionForceConfig {
    FrictionForceConfig {
        numeric_3d: Numeric3DConfig {
            strategy,
            ..Numeric3DConfig::default()
        },
        ..config_for(ForceFormula::Numeric3D)
    }
}

pub fn build(config: &FrictionForceConfig) -> Box<dyn FrictionForceModel> {
    build_friction_force_model(config, PhysicalConstants::si()).unwrap()
}

pub fn compute_forces(
    model: &mut dyn FrictionForceModel,
    charge_number: u32,
    v_tr: &[ffr],
    v_l: &[ffr],
    ne: &[ffr],
    beam: &dyn ElectronBeam,
) -> FrictionForces {
    let ions = IonBatch::new(v_tr, v_l, ne).unwrap();
    let mut forces = FrictionForces::default();
    model
        .compute_friction_forces(charge_number, &ions, beam, &mut forces)
        .unwrap();
    forces
}

pub fn compute_single_force(
    config: &FrictionForceConfig,
    v_tr: ffr,
    v_l: ffr,
    ne: ffr,
    beam: &dyn ElectronBeam,
) -> (ffr, ffr) {
    compute_forces(build(config).as_mut(), 1, &[v_tr], &[v_l], &[ne], beam).get(0)
}
