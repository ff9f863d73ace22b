//! Reference trajectories handed to an agent for one move.
use se3sim_utils::{validate_knots, TIME_EPSILON};
use tracing::warn;

use crate::dynamics::{InputVector, StateVector};
use crate::error::ReferenceError;

/// Sampled inputs (and optionally desired states) over time, relative to the start of a move.
///
/// Always holds at least one sample, with strictly increasing finite times and one input per time.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTrajectory {
    times: Vec<f64>,
    inputs: Vec<InputVector>,
    desired_states: Option<Vec<StateVector>>,
}

impl ReferenceTrajectory {
    pub fn new(times: Vec<f64>, inputs: Vec<InputVector>) -> Result<Self, ReferenceError> {
        validate_knots(&times)?;
        if inputs.len() != times.len() {
            return Err(ReferenceError::InputCount {
                times: times.len(),
                inputs: inputs.len(),
            });
        }
        Ok(Self {
            times,
            inputs,
            desired_states: None,
        })
    }

    /// Attach desired states, one per reference time.
    pub fn with_desired_states(mut self, states: Vec<StateVector>) -> Result<Self, ReferenceError> {
        if states.len() != self.times.len() {
            return Err(ReferenceError::DesiredStateCount {
                times: self.times.len(),
                states: states.len(),
            });
        }
        self.desired_states = Some(states);
        Ok(self)
    }

    pub fn hold(input: InputVector, duration: f64) -> Result<Self, ReferenceError> {
        //! constant input from 0 to `duration`.
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(ReferenceError::InvalidDuration(duration));
        }
        if duration == 0.0 {
            return Self::new(vec![0.0], vec![input]);
        }
        Self::new(vec![0.0, duration], vec![input, input])
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn inputs(&self) -> &[InputVector] {
        &self.inputs
    }

    pub fn desired_states(&self) -> Option<&[StateVector]> {
        self.desired_states.as_deref()
    }

    pub fn start(&self) -> f64 {
        self.times.first().copied().unwrap_or_default()
    }

    pub fn end(&self) -> f64 {
        self.times.last().copied().unwrap_or_default()
    }

    pub fn resolve(&self, t_move: f64) -> Result<Self, ReferenceError> {
        //! produces the trajectory actually used for a move of length `t_move`.
        //! A reference ending early is extended by holding its last sample; one starting after 0 is rejected.
        if !(t_move.is_finite() && t_move >= 0.0) {
            return Err(ReferenceError::InvalidDuration(t_move));
        }
        if self.start() > TIME_EPSILON {
            return Err(ReferenceError::StartsLate(self.start()));
        }

        let mut used = self.clone();
        if self.end() < t_move - TIME_EPSILON {
            warn!(
                reference_end = self.end(),
                t_move, "reference ends before the move does, holding its last sample"
            );
            if let Some(&last) = self.inputs.last() {
                used.inputs.push(last);
            }
            if let Some(states) = used.desired_states.as_mut() {
                if let Some(&last) = states.last() {
                    states.push(last);
                }
            }
            used.times.push(t_move);
        }
        Ok(used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use se3sim_utils::InterpolationError;

    fn input(x: f64) -> InputVector {
        InputVector::from_element(x)
    }

    #[test]
    fn rejects_mismatched_samples() {
        assert_eq!(
            ReferenceTrajectory::new(vec![0.0, 1.0], vec![input(0.0)]),
            Err(ReferenceError::InputCount { times: 2, inputs: 1 })
        );
        assert_eq!(
            ReferenceTrajectory::new(vec![0.0, 1.0], vec![input(0.0); 2])
                .unwrap()
                .with_desired_states(vec![StateVector::zeros()]),
            Err(ReferenceError::DesiredStateCount { times: 2, states: 1 })
        );
        assert_eq!(
            ReferenceTrajectory::new(vec![], vec![]),
            Err(ReferenceError::Times(InterpolationError::Empty))
        );
        assert_eq!(
            ReferenceTrajectory::new(vec![1.0, 0.5], vec![input(0.0); 2]),
            Err(ReferenceError::Times(InterpolationError::UnorderedKnots { index: 1 }))
        );
    }

    #[test]
    fn covering_reference_is_used_as_is() {
        let reference = ReferenceTrajectory::new(vec![0.0, 1.0, 2.0], vec![input(1.0); 3]).unwrap();
        assert_eq!(reference.resolve(1.5), Ok(reference.clone()));
    }

    #[test]
    fn short_reference_holds_last_sample() {
        let reference = ReferenceTrajectory::new(vec![0.0, 1.0], vec![input(1.0), input(3.0)])
            .unwrap()
            .with_desired_states(vec![StateVector::zeros(), StateVector::from_element(2.0)])
            .unwrap();
        let used = reference.resolve(4.0).unwrap();
        assert_eq!(used.times(), &[0.0, 1.0, 4.0]);
        assert_eq!(used.inputs().last(), Some(&input(3.0)));
        assert_eq!(used.desired_states().and_then(|s| s.last()), Some(&StateVector::from_element(2.0)));
    }

    #[test]
    fn late_start_and_bad_durations_are_rejected() {
        let late = ReferenceTrajectory::new(vec![0.5, 1.0], vec![input(0.0); 2]).unwrap();
        assert_eq!(late.resolve(1.0), Err(ReferenceError::StartsLate(0.5)));

        let reference = ReferenceTrajectory::hold(input(0.0), 1.0).unwrap();
        assert_eq!(reference.resolve(-1.0), Err(ReferenceError::InvalidDuration(-1.0)));
        assert!(reference.resolve(f64::NAN).is_err());
    }

    #[test]
    fn hold_of_zero_duration_is_a_single_sample() {
        let reference = ReferenceTrajectory::hold(input(2.0), 0.0).unwrap();
        assert_eq!(reference.times(), &[0.0]);
        assert_eq!(reference.resolve(0.0).unwrap().times(), &[0.0]);
    }
}
