//! Error types for the simulation core.
//!
//! Each stage reports through its own enum; [`AgentError`] gathers them for callers of
//! [`Agent::advance`](crate::Agent::advance) and [`Agent::reset`](crate::Agent::reset).
use se3sim_utils::InterpolationError;
use thiserror::Error;

/// Rejected physical parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// Mass must be positive and finite.
    #[error("invalid mass: {0} (must be positive and finite)")]
    InvalidMass(f64),

    /// The inertia matrix has non-finite entries or is not symmetric.
    #[error("inertia matrix must be finite and symmetric")]
    AsymmetricInertia,

    /// The inertia matrix has no inverse.
    #[error("inertia matrix is singular")]
    SingularInertia,

    /// The inertia matrix is invertible but not positive definite.
    #[error("inertia matrix is not positive definite")]
    IndefiniteInertia,

    /// Gravity magnitude is not finite.
    #[error("invalid gravity magnitude: {0}")]
    InvalidGravity(f64),

    /// Gravity direction cannot be normalised.
    #[error("gravity direction must be a non-zero finite vector")]
    ZeroGravityDirection,
}

/// Failures of the fixed-step SO(3) integrator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntegrationError {
    /// Time span bounds are NaN or infinite.
    #[error("time span [{start}, {end}] is not finite")]
    NonFiniteSpan {
        /// start of the span.
        start: f64,
        /// end of the span.
        end: f64,
    },

    /// Time span ends before it starts.
    #[error("time span [{start}, {end}] runs backwards")]
    ReversedSpan {
        /// start of the span.
        start: f64,
        /// end of the span.
        end: f64,
    },

    /// Step size is not positive and finite, or too small to advance the clock.
    #[error("invalid step size: {0} (must be positive, finite and above the time resolution of the span)")]
    InvalidStep(f64),

    /// The span would need more steps than the integrator allows.
    #[error("span needs {0} steps, more than the allowed maximum")]
    TooManySteps(f64),

    /// Angular velocity indices are not a 3-wide range inside the state.
    #[error("angular velocity indices {start}..{end} do not select 3 of {n_states} states")]
    BadAngularVelocityIndices {
        /// first index.
        start: usize,
        /// one past the last index.
        end: usize,
        /// state dimension.
        n_states: usize,
    },

    /// The state or attitude became non-finite.
    #[error("integration diverged at t = {time}")]
    Diverged {
        /// time of the first non-finite sample.
        time: f64,
    },
}

/// Failures of a low-level controller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// `get_control_inputs` was called before `setup`.
    #[error("controller used before setup")]
    NotSetUp,

    /// The controller was set up for a different agent shape.
    #[error("controller set up for {expected_states} states / {expected_inputs} inputs, agent has {states} / {inputs}")]
    DimensionMismatch {
        /// states recorded at setup.
        expected_states: usize,
        /// inputs recorded at setup.
        expected_inputs: usize,
        /// states of the vectors handed in.
        states: usize,
        /// inputs of the vectors handed in.
        inputs: usize,
    },

    /// A feedback law needs desired states the reference does not carry.
    #[error("reference trajectory has no desired states")]
    MissingDesiredStates,

    /// Reference lookup failed.
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// Malformed reference trajectories or move requests.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReferenceError {
    /// Reference times are empty, non-finite or not strictly increasing.
    #[error("bad reference times: {0}")]
    Times(#[from] InterpolationError),

    /// Input sample count differs from the time sample count.
    #[error("{times} reference times but {inputs} input samples")]
    InputCount {
        /// time samples.
        times: usize,
        /// input samples.
        inputs: usize,
    },

    /// Desired-state sample count differs from the time sample count.
    #[error("{times} reference times but {states} desired-state samples")]
    DesiredStateCount {
        /// time samples.
        times: usize,
        /// desired-state samples.
        states: usize,
    },

    /// Move duration is negative or not finite.
    #[error("invalid move duration: {0}")]
    InvalidDuration(f64),

    /// The reference does not cover the start of the move.
    #[error("reference starts at t = {0}, after the start of the move")]
    StartsLate(f64),
}

/// Anything that can stop an agent from moving or resetting.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    /// Bad physical parameters.
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// Bad reference trajectory.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// Controller failure during a move.
    #[error(transparent)]
    Control(#[from] ControlError),

    /// Integrator failure during a move.
    #[error(transparent)]
    Integration(#[from] IntegrationError),

    /// Configured time discretization is not positive and finite.
    #[error("invalid time discretization: {0}")]
    InvalidTimeStep(f64),

    /// An attitude handed to `reset` is not a rotation matrix.
    #[error("attitude is not a rotation matrix (orthonormality error {0:.3e})")]
    InvalidAttitude(f64),

    /// A state handed to `reset` has non-finite entries.
    #[error("initial state is not finite")]
    NonFiniteState,

    /// History has no samples to continue from.
    #[error("agent history is empty")]
    EmptyHistory,
}
