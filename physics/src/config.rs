//! Typed configuration for agents and their physical parameters.
//!
//! Everything here is fixed at construction; nothing is mutated while the agent simulates.
use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dynamics::StateVector;

/// default integration step, seconds.
pub const DEFAULT_TIME_DISCRETIZATION: f64 = 0.05;

/// standard gravity, m/s^2.
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Agent-level simulation settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct AgentConfig {
    /// Fixed integration step in seconds.
    pub time_discretization: f64,
    /// State used by [`Agent::reset_default`](crate::Agent::reset_default) and at construction.
    pub default_state: StateVector,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            time_discretization: DEFAULT_TIME_DISCRETIZATION,
            default_state: StateVector::zeros(),
        }
    }
}

impl AgentConfig {
    /// Set the integration step.
    #[must_use]
    pub fn with_time_discretization(mut self, dt: f64) -> Self {
        self.time_discretization = dt;
        self
    }
}

/// Raw physical description of a rigid body, validated into
/// [`RigidBodyParams`](crate::RigidBodyParams).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PhysicalConfig {
    /// Mass in kg. Stored, but the translational dynamics take force per unit mass.
    pub mass: f64,
    /// Body-frame inertia matrix, kg m^2.
    pub inertia: Matrix3<f64>,
    /// Gravity magnitude, m/s^2.
    pub gravity: f64,
    /// Direction gravity pulls in; normalised on validation.
    pub gravity_direction: Vector3<f64>,
    /// Whether gravity is added to the commanded force.
    pub gravity_enabled: bool,
}

impl Default for PhysicalConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inertia: Matrix3::identity(),
            gravity: STANDARD_GRAVITY,
            gravity_direction: -Vector3::z(),
            gravity_enabled: true,
        }
    }
}

impl PhysicalConfig {
    /// Same body with gravity switched off.
    #[must_use]
    pub fn zero_gravity() -> Self {
        Self {
            gravity_enabled: false,
            ..Default::default()
        }
    }

    /// Replace the inertia matrix.
    #[must_use]
    pub fn with_inertia(mut self, inertia: Matrix3<f64>) -> Self {
        self.inertia = inertia;
        self
    }

    /// Replace the mass.
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }
}
