//! The agent: owns history and drives one simulation segment per [`Agent::advance`] call.
//!
//! An agent composes a dynamics capability with a low-level controller. Each move resolves the reference,
//! integrates from the last recorded sample, and appends the new samples to history.
use std::ops::Range;

use nalgebra::{Matrix3, Vector3};
use se3sim_utils::{is_rotation, orthonormality_error, ROTATION_TOLERANCE};
use tracing::debug;

use crate::config::{AgentConfig, PhysicalConfig};
use crate::controller::{AgentDims, ControllerConfig, LowLevelController, PassThroughController};
use crate::dynamics::{
    AgentDynamics, RigidBodyDynamics, StateVector, ANGULAR_VELOCITY_INDICES, N_STATES, POSITION_INDICES,
};
use crate::error::AgentError;
use crate::history::{History, HistoryView};
use crate::integrator::integrate;
use crate::reference::ReferenceTrajectory;
use crate::render::{ArtifactKind, PlotArtifacts, RenderContext};

/// What [`Agent::reset`] starts from: a position at rest or a full state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialCondition {
    /// position only; velocity and angular velocity are zero.
    Position(Vector3<f64>),
    /// full state vector.
    State(StateVector),
}

impl InitialCondition {
    fn into_state(self) -> StateVector {
        match self {
            InitialCondition::Position(p) => {
                let mut z = StateVector::zeros();
                z.fixed_rows_mut::<3>(POSITION_INDICES.start).copy_from(&p);
                z
            }
            InitialCondition::State(z) => z,
        }
    }
}

impl From<Vector3<f64>> for InitialCondition {
    fn from(value: Vector3<f64>) -> Self {
        InitialCondition::Position(value)
    }
}

impl From<StateVector> for InitialCondition {
    fn from(value: StateVector) -> Self {
        InitialCondition::State(value)
    }
}

/// A simulated body: dynamics, the controller driving it, and everything it has done so far.
pub struct Agent<D: AgentDynamics> {
    dynamics: D,
    controller: Box<dyn LowLevelController>,
    config: AgentConfig,
    history: History,
    artifacts: PlotArtifacts,
    last_reference: Option<ReferenceTrajectory>,
}

/// The SE(3) rigid-body agent.
pub type RigidBodyAgent = Agent<RigidBodyDynamics>;

impl RigidBodyAgent {
    pub fn rigid_body(physical: &PhysicalConfig, config: AgentConfig) -> Result<Self, AgentError> {
        //! rigid body driven by its reference inputs directly.
        let dynamics = RigidBodyDynamics::from_config(physical)?;
        let controller = PassThroughController::new(ControllerConfig::default());
        Self::new(dynamics, Box::new(controller), config)
    }
}

impl<D: AgentDynamics> Agent<D> {
    pub fn new(dynamics: D, mut controller: Box<dyn LowLevelController>, config: AgentConfig) -> Result<Self, AgentError> {
        //! sets up `controller` for this agent and resets to the configured default state.
        let dt = config.time_discretization;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(AgentError::InvalidTimeStep(dt));
        }
        if !config.default_state.iter().all(|v| v.is_finite()) {
            return Err(AgentError::NonFiniteState);
        }
        controller.setup(AgentDims::RIGID_BODY);

        Ok(Self {
            dynamics,
            controller,
            history: History::new(0.0, config.default_state, Matrix3::identity()),
            config,
            artifacts: PlotArtifacts::default(),
            last_reference: None,
        })
    }

    pub fn reset(&mut self, initial: impl Into<InitialCondition>, attitude: Option<Matrix3<f64>>) -> Result<(), AgentError> {
        //! discards all history and restarts the clock at 0 from a single sample.
        //! Attitude defaults to the identity.
        let z0 = initial.into().into_state();
        if !z0.iter().all(|v| v.is_finite()) {
            return Err(AgentError::NonFiniteState);
        }
        let r0 = attitude.unwrap_or_else(Matrix3::identity);
        if !is_rotation(&r0, ROTATION_TOLERANCE) {
            return Err(AgentError::InvalidAttitude(orthonormality_error(&r0)));
        }

        self.restart(z0, r0);
        Ok(())
    }

    /// reset to the configured default state and identity attitude.
    pub fn reset_default(&mut self) {
        self.restart(self.config.default_state, Matrix3::identity());
    }

    fn restart(&mut self, z0: StateVector, r0: Matrix3<f64>) {
        self.history = History::new(0.0, z0, r0);
        self.artifacts.clear();
        self.last_reference = None;
        debug!("agent reset");
    }

    /// Simulates `t_move` seconds driven by `reference` and appends the result to history.
    ///
    /// The move starts from the last recorded sample. Reference times are relative to the start of the move.
    /// On error nothing is appended.
    pub fn advance(&mut self, t_move: f64, reference: &ReferenceTrajectory) -> Result<(), AgentError> {
        let used = reference.resolve(t_move)?;
        let (clock, z0, r0) = self
            .history
            .last()
            .map(|(t, z, r)| (t, *z, *r))
            .ok_or(AgentError::EmptyHistory)?;

        let dynamics = &self.dynamics;
        let controller = &self.controller;
        let segment = integrate(
            |t, z: &StateVector, r: &Matrix3<f64>| -> Result<StateVector, AgentError> {
                let u = controller.get_control_inputs(t, z, &used)?;
                Ok(dynamics.derivative(t, z, r, &u))
            },
            (0.0, t_move),
            &z0,
            &r0,
            self.config.time_discretization,
            ANGULAR_VELOCITY_INDICES,
        )?;

        let appended = self.history.commit(segment, clock);
        debug!(t_move, appended, clock = self.current_time(), "move committed");
        self.last_reference = Some(used);
        Ok(())
    }

    pub fn time(&self) -> &[f64] {
        self.history.view().time
    }

    pub fn state(&self) -> &[StateVector] {
        self.history.view().state
    }

    pub fn attitude(&self) -> &[Matrix3<f64>] {
        self.history.view().attitude
    }

    pub fn history(&self) -> HistoryView<'_> {
        self.history.view()
    }

    /// time of the last recorded sample.
    pub fn current_time(&self) -> f64 {
        self.history.last().map(|(t, _, _)| t).unwrap_or_default()
    }

    pub fn n_states(&self) -> usize {
        N_STATES
    }

    pub fn position_indices(&self) -> Range<usize> {
        POSITION_INDICES
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn dynamics(&self) -> &D {
        &self.dynamics
    }

    /// reference actually used by the last move, after resolution.
    pub fn last_reference(&self) -> Option<&ReferenceTrajectory> {
        self.last_reference.as_ref()
    }

    pub fn artifacts(&self) -> &PlotArtifacts {
        &self.artifacts
    }

    pub fn is_plot_available(&self, context: &dyn RenderContext, name: &str) -> bool {
        self.artifacts.is_available(context, name)
    }

    pub fn plot(&mut self, context: &mut dyn RenderContext) {
        //! draws or refreshes every artifact. Does nothing when `context` has no display.
        if !context.is_available() {
            debug!("render context unavailable, skipping plot");
            return;
        }
        let view = self.history.view();
        for kind in ArtifactKind::ALL {
            let name = kind.slot_name();
            match self.artifacts.get(name) {
                Some(handle) if context.is_live(handle) => {
                    if !context.update(handle, kind, &view) {
                        debug!(name, "artifact update failed, dropping it");
                        self.artifacts.remove(name);
                    }
                }
                _ => match context.create(kind, &view) {
                    Some(handle) => {
                        self.artifacts.insert(name, handle);
                    }
                    None => {
                        debug!(name, "artifact could not be created");
                        self.artifacts.remove(name);
                    }
                },
            }
        }
    }
}
