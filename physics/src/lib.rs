//! Simulation core for a single rigid-body agent with 6-DOF dynamics on SO(3) x R^6.
//!
//! The pieces, leaves first:
//! - [`dynamics`]: the rigid-body equations of motion,
//! - [`integrator`]: fixed-step Euler integration that keeps attitude on SO(3),
//! - [`controller`]: low-level controllers producing the applied input,
//! - [`agent`]: history bookkeeping and the move/reset operations.
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector3;
//! use se3sim_physics::{compose_input, AgentConfig, PhysicalConfig, ReferenceTrajectory, RigidBodyAgent};
//!
//! let mut agent = RigidBodyAgent::rigid_body(&PhysicalConfig::zero_gravity(), AgentConfig::default()).unwrap();
//! let spin_up = compose_input(&Vector3::zeros(), &Vector3::new(0.0, 0.0, 0.2));
//! agent.advance(1.0, &ReferenceTrajectory::hold(spin_up, 1.0).unwrap()).unwrap();
//!
//! assert_eq!(agent.time().len(), 21);
//! ```
pub mod agent;
pub mod config;
pub mod controller;
pub mod dynamics;
pub mod error;
pub mod history;
pub mod integrator;
pub mod reference;
pub mod render;

pub use agent::{Agent, InitialCondition, RigidBodyAgent};
pub use config::{AgentConfig, PhysicalConfig, DEFAULT_TIME_DISCRETIZATION, STANDARD_GRAVITY};
pub use controller::{AgentDims, ControllerConfig, LowLevelController, PassThroughController, TrackingController};
pub use dynamics::{
    angular_velocity, compose_input, compose_state, position, velocity, AgentDynamics, InputVector, RigidBodyDynamics,
    RigidBodyParams, StateVector, ANGULAR_VELOCITY_INDICES, N_INPUTS, N_STATES, POSITION_INDICES, VELOCITY_INDICES,
};
pub use error::{AgentError, ControlError, IntegrationError, PhysicsError, ReferenceError};
pub use history::{History, HistoryView};
pub use integrator::{integrate, Segment};
pub use reference::ReferenceTrajectory;
pub use render::{ArtifactHandle, ArtifactKind, HeadlessContext, PlotArtifacts, PrintType, RenderContext, TerminalContext};
