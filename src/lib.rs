//! The `ecool` crate computes the friction force that the electron beam of an
//! electron cooler exerts on co-propagating ions.
//!
//! A model is built from a [`force::FrictionForceConfig`] and evaluated on an
//! [`beam::IonBatch`] for a given [`beam::ElectronBeam`], filling
//! [`beam::FrictionForces`] with the transverse and longitudinal force on each ion.

pub mod beam;
pub mod constants;
pub mod error;
pub mod force;
pub mod io;
pub mod math;

pub use beam::{ElectronBeam, ElectronBeamState, FrictionForces, IonBatch, Temperature};
pub use constants::PhysicalConstants;
pub use error::{FrictionError, FrictionResult};
pub use force::{
    build_friction_force_model, ForceFormula, FrictionForceConfig, FrictionForceModel,
};
