//! Rigid-body equations of motion on SO(3) x R^6.
//!
//! The state is `z = [p; v; w]`: world position, world velocity and body angular velocity. Control inputs are
//! `u = [F; M]`, a force per unit mass and a body moment. Attitude is integrated separately (see
//! [`integrator`](crate::integrator)) and is not part of `z`.
use std::ops::Range;

use nalgebra::{Matrix3, SVector, Vector3};
use se3sim_utils::{interpolate, Extrapolation, InterpolationError};

use crate::config::PhysicalConfig;
use crate::error::PhysicsError;

pub const N_STATES: usize = 9;
pub const N_INPUTS: usize = 6;

pub type StateVector = SVector<f64, N_STATES>;
pub type InputVector = SVector<f64, N_INPUTS>;

pub const POSITION_INDICES: Range<usize> = 0..3;
pub const VELOCITY_INDICES: Range<usize> = 3..6;
pub const ANGULAR_VELOCITY_INDICES: Range<usize> = 6..9;

/// relative tolerance on the inertia matrix symmetry check.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

pub fn position(z: &StateVector) -> Vector3<f64> {
    z.fixed_rows::<3>(POSITION_INDICES.start).into_owned()
}

pub fn velocity(z: &StateVector) -> Vector3<f64> {
    z.fixed_rows::<3>(VELOCITY_INDICES.start).into_owned()
}

pub fn angular_velocity(z: &StateVector) -> Vector3<f64> {
    z.fixed_rows::<3>(ANGULAR_VELOCITY_INDICES.start).into_owned()
}

pub fn compose_state(p: &Vector3<f64>, v: &Vector3<f64>, w: &Vector3<f64>) -> StateVector {
    //! stacks position, velocity and angular velocity into a state vector.
    let mut z = StateVector::zeros();
    z.fixed_rows_mut::<3>(POSITION_INDICES.start).copy_from(p);
    z.fixed_rows_mut::<3>(VELOCITY_INDICES.start).copy_from(v);
    z.fixed_rows_mut::<3>(ANGULAR_VELOCITY_INDICES.start).copy_from(w);
    z
}

pub fn compose_input(force: &Vector3<f64>, moment: &Vector3<f64>) -> InputVector {
    let mut u = InputVector::zeros();
    u.fixed_rows_mut::<3>(0).copy_from(force);
    u.fixed_rows_mut::<3>(3).copy_from(moment);
    u
}

/// Validated physical parameters. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyParams {
    mass: f64,
    inertia: Matrix3<f64>,
    inverse_inertia: Matrix3<f64>,
    gravity: f64,
    gravity_direction: Vector3<f64>,
    gravity_enabled: bool,
}

impl RigidBodyParams {
    pub fn new(config: &PhysicalConfig) -> Result<Self, PhysicsError> {
        //! validates `config` and precomputes the inverse inertia.
        if !(config.mass.is_finite() && config.mass > 0.0) {
            return Err(PhysicsError::InvalidMass(config.mass));
        }

        let inertia = config.inertia;
        let scale = inertia.norm().max(1.0);
        if !inertia.iter().all(|v| v.is_finite())
            || (inertia - inertia.transpose()).norm() > SYMMETRY_TOLERANCE * scale
        {
            return Err(PhysicsError::AsymmetricInertia);
        }
        let inverse_inertia = inertia.try_inverse().ok_or(PhysicsError::SingularInertia)?;
        if inertia.cholesky().is_none() {
            return Err(PhysicsError::IndefiniteInertia);
        }

        if !config.gravity.is_finite() {
            return Err(PhysicsError::InvalidGravity(config.gravity));
        }
        let gravity_direction = config
            .gravity_direction
            .try_normalize(f64::EPSILON)
            .filter(|d| d.iter().all(|v| v.is_finite()))
            .ok_or(PhysicsError::ZeroGravityDirection)?;

        Ok(Self {
            mass: config.mass,
            inertia,
            inverse_inertia,
            gravity: config.gravity,
            gravity_direction,
            gravity_enabled: config.gravity_enabled,
        })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inertia(&self) -> &Matrix3<f64> {
        &self.inertia
    }

    pub fn inverse_inertia(&self) -> &Matrix3<f64> {
        &self.inverse_inertia
    }

    /// unit vector gravity pulls along.
    pub fn gravity_direction(&self) -> &Vector3<f64> {
        &self.gravity_direction
    }

    pub fn gravity_enabled(&self) -> bool {
        self.gravity_enabled
    }

    /// `g * direction`, regardless of whether gravity is enabled.
    pub fn gravity_vector(&self) -> Vector3<f64> {
        self.gravity_direction * self.gravity
    }
}

/// The dynamics an [`Agent`](crate::Agent) integrates. Implementations are pure functions of their
/// arguments and their own fixed parameters.
pub trait AgentDynamics {
    /// Time derivative of `z` under input `u`.
    fn derivative(&self, t: f64, z: &StateVector, attitude: &Matrix3<f64>, u: &InputVector) -> StateVector;

    /// Derivative with the input looked up from a sampled reference at exactly `t`.
    fn derivative_from_reference(
        &self,
        t: f64,
        z: &StateVector,
        attitude: &Matrix3<f64>,
        reference_times: &[f64],
        reference_inputs: &[InputVector],
        policy: Extrapolation,
    ) -> Result<StateVector, InterpolationError> {
        let u = interpolate(t, reference_times, reference_inputs, policy)?;
        Ok(self.derivative(t, z, attitude, &u))
    }
}

/// Free rigid body driven by a specific force and a body moment.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyDynamics {
    params: RigidBodyParams,
}

impl RigidBodyDynamics {
    pub fn new(params: RigidBodyParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &PhysicalConfig) -> Result<Self, PhysicsError> {
        Ok(Self::new(RigidBodyParams::new(config)?))
    }

    pub fn params(&self) -> &RigidBodyParams {
        &self.params
    }
}

impl AgentDynamics for RigidBodyDynamics {
    fn derivative(&self, _t: f64, z: &StateVector, _attitude: &Matrix3<f64>, u: &InputVector) -> StateVector {
        let mut force: Vector3<f64> = u.fixed_rows::<3>(0).into_owned();
        let moment: Vector3<f64> = u.fixed_rows::<3>(3).into_owned();
        if self.params.gravity_enabled {
            force += self.params.gravity_vector();
        }

        let w = angular_velocity(z);
        let p_dot = velocity(z);
        // force is already per unit mass; mass does not enter here.
        let v_dot = force;
        let w_dot = self.params.inverse_inertia * (moment - w.cross(&(self.params.inertia * w)));

        compose_state(&p_dot, &v_dot, &w_dot)
    }
}
