//! Low-level controllers: turn a reference trajectory and the measured state into the input applied at time t.
//!
//! Agents only ever call [`LowLevelController::get_control_inputs`], so any control law can be dropped in
//! without touching the agent or the integrator.
use nalgebra::Vector3;
use se3sim_utils::{interpolate, Extrapolation};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dynamics::{angular_velocity, compose_input, position, velocity, InputVector, StateVector, N_INPUTS, N_STATES};
use crate::error::ControlError;
use crate::reference::ReferenceTrajectory;

/// Shape of the agent a controller drives, recorded once at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentDims {
    /// length of the state vector.
    pub n_states: usize,
    /// length of the input vector.
    pub n_inputs: usize,
}

impl AgentDims {
    /// dimensions of the rigid-body agent.
    pub const RIGID_BODY: Self = Self {
        n_states: N_STATES,
        n_inputs: N_INPUTS,
    };
}

/// Controller settings. Gains are only read by feedback controllers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ControllerConfig {
    /// How reference lookups outside the reference span behave.
    pub extrapolation: Extrapolation,
    /// Force per metre of position error.
    pub position_gain: f64,
    /// Force per m/s of velocity error.
    pub velocity_gain: f64,
    /// Moment per rad/s of angular velocity error.
    pub angular_velocity_gain: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            extrapolation: Extrapolation::Fail,
            position_gain: 1.0,
            velocity_gain: 2.0,
            angular_velocity_gain: 1.0,
        }
    }
}

pub trait LowLevelController {
    /// Called once by the agent before any control step.
    fn setup(&mut self, dims: AgentDims);

    /// Input to apply at time `t` given the measured state `z`.
    fn get_control_inputs(
        &self,
        t: f64,
        z: &StateVector,
        reference: &ReferenceTrajectory,
    ) -> Result<InputVector, ControlError>;
}

fn check_dims(dims: Option<AgentDims>) -> Result<(), ControlError> {
    //! a controller is usable once set up for an agent of the rigid-body shape.
    let dims = dims.ok_or(ControlError::NotSetUp)?;
    if dims != AgentDims::RIGID_BODY {
        return Err(ControlError::DimensionMismatch {
            expected_states: dims.n_states,
            expected_inputs: dims.n_inputs,
            states: N_STATES,
            inputs: N_INPUTS,
        });
    }
    Ok(())
}

/// Applies the reference input unchanged.
#[derive(Debug, Clone, Default)]
pub struct PassThroughController {
    config: ControllerConfig,
    dims: Option<AgentDims>,
}

impl PassThroughController {
    pub fn new(config: ControllerConfig) -> Self {
        Self { config, dims: None }
    }
}

impl LowLevelController for PassThroughController {
    fn setup(&mut self, dims: AgentDims) {
        self.dims = Some(dims);
    }

    fn get_control_inputs(
        &self,
        t: f64,
        _z: &StateVector,
        reference: &ReferenceTrajectory,
    ) -> Result<InputVector, ControlError> {
        check_dims(self.dims)?;
        Ok(interpolate(t, reference.times(), reference.inputs(), self.config.extrapolation)?)
    }
}

/// Reference input plus a proportional-derivative correction towards the desired state.
///
/// `F = F_ref + kp (p_des - p) + kd (v_des - v)` and `M = M_ref + kw (w_des - w)`.
#[derive(Debug, Clone, Default)]
pub struct TrackingController {
    config: ControllerConfig,
    dims: Option<AgentDims>,
}

impl TrackingController {
    pub fn new(config: ControllerConfig) -> Self {
        Self { config, dims: None }
    }
}

impl LowLevelController for TrackingController {
    fn setup(&mut self, dims: AgentDims) {
        self.dims = Some(dims);
    }

    fn get_control_inputs(
        &self,
        t: f64,
        z: &StateVector,
        reference: &ReferenceTrajectory,
    ) -> Result<InputVector, ControlError> {
        check_dims(self.dims)?;
        let desired = reference.desired_states().ok_or(ControlError::MissingDesiredStates)?;
        let policy = self.config.extrapolation;

        let u_ref = interpolate(t, reference.times(), reference.inputs(), policy)?;
        let z_des = interpolate(t, reference.times(), desired, policy)?;

        let force_correction: Vector3<f64> = (position(&z_des) - position(z)) * self.config.position_gain
            + (velocity(&z_des) - velocity(z)) * self.config.velocity_gain;
        let moment_correction = (angular_velocity(&z_des) - angular_velocity(z)) * self.config.angular_velocity_gain;

        Ok(u_ref + compose_input(&force_correction, &moment_correction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::compose_state;
    use approx::assert_relative_eq;
    use se3sim_utils::InterpolationError;

    fn reference() -> ReferenceTrajectory {
        let inputs = vec![
            compose_input(&Vector3::new(1.0, 0.0, 0.0), &Vector3::zeros()),
            compose_input(&Vector3::new(3.0, 0.0, 0.0), &Vector3::new(0.0, 0.0, 2.0)),
            compose_input(&Vector3::zeros(), &Vector3::zeros()),
        ];
        ReferenceTrajectory::new(vec![0.0, 0.5, 1.25], inputs).unwrap()
    }

    fn ready<C: LowLevelController>(mut controller: C) -> C {
        controller.setup(AgentDims::RIGID_BODY);
        controller
    }

    #[test]
    fn pass_through_is_exact_at_knots() {
        let controller = ready(PassThroughController::default());
        let reference = reference();
        for (t, u) in reference.times().iter().zip(reference.inputs()) {
            let out = controller.get_control_inputs(*t, &StateVector::zeros(), &reference).unwrap();
            assert_eq!(&out, u);
        }
    }

    #[test]
    fn pass_through_ignores_state() {
        let controller = ready(PassThroughController::default());
        let z = StateVector::from_element(5.0);
        let out = controller.get_control_inputs(0.25, &z, &reference()).unwrap();
        assert_relative_eq!(out, compose_input(&Vector3::new(2.0, 0.0, 0.0), &Vector3::new(0.0, 0.0, 1.0)), epsilon = 1e-12);
    }

    #[test]
    fn setup_is_required() {
        let controller = PassThroughController::default();
        assert_eq!(
            controller.get_control_inputs(0.0, &StateVector::zeros(), &reference()),
            Err(ControlError::NotSetUp)
        );
    }

    #[test]
    fn wrong_shape_is_reported() {
        let mut controller = PassThroughController::default();
        controller.setup(AgentDims { n_states: 12, n_inputs: 4 });
        assert!(matches!(
            controller.get_control_inputs(0.0, &StateVector::zeros(), &reference()),
            Err(ControlError::DimensionMismatch { expected_states: 12, .. })
        ));
    }

    #[test]
    fn extrapolation_follows_config() {
        let failing = ready(PassThroughController::default());
        assert!(matches!(
            failing.get_control_inputs(2.0, &StateVector::zeros(), &reference()),
            Err(ControlError::Interpolation(InterpolationError::OutOfRange { .. }))
        ));

        let clamping = ready(PassThroughController::new(ControllerConfig {
            extrapolation: Extrapolation::Clamp,
            ..Default::default()
        }));
        assert_eq!(
            clamping.get_control_inputs(2.0, &StateVector::zeros(), &reference()),
            Ok(InputVector::zeros())
        );
    }

    #[test]
    fn tracking_needs_desired_states() {
        let controller = ready(TrackingController::default());
        assert_eq!(
            controller.get_control_inputs(0.0, &StateVector::zeros(), &reference()),
            Err(ControlError::MissingDesiredStates)
        );
    }

    #[test]
    fn tracking_corrects_towards_desired_state() {
        let controller = ready(TrackingController::new(ControllerConfig {
            position_gain: 2.0,
            velocity_gain: 0.5,
            angular_velocity_gain: 3.0,
            ..Default::default()
        }));
        let desired = compose_state(&Vector3::new(1.0, 0.0, 0.0), &Vector3::zeros(), &Vector3::new(0.0, 0.0, 1.0));
        let reference = ReferenceTrajectory::hold(InputVector::zeros(), 1.0)
            .unwrap()
            .with_desired_states(vec![desired; 2])
            .unwrap();
        let z = compose_state(&Vector3::zeros(), &Vector3::new(0.0, 2.0, 0.0), &Vector3::zeros());

        let u = controller.get_control_inputs(0.5, &z, &reference).unwrap();
        assert_relative_eq!(u, compose_input(&Vector3::new(2.0, -1.0, 0.0), &Vector3::new(0.0, 0.0, 3.0)), epsilon = 1e-12);

        // on the desired state the correction vanishes
        let on_track = controller.get_control_inputs(0.5, &desired, &reference).unwrap();
        assert_relative_eq!(on_track, InputVector::zeros(), epsilon = 1e-12);
    }
}
