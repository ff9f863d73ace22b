//! Append-only record of an agent's time, state and attitude samples.
use nalgebra::Matrix3;

use crate::dynamics::{StateVector, N_STATES};
use crate::integrator::Segment;

/// Time, state and attitude sequences of equal length. Grows only through [`History::commit`]; replaced
/// wholesale by constructing a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    time: Vec<f64>,
    state: Vec<StateVector>,
    attitude: Vec<Matrix3<f64>>,
}

impl History {
    /// history holding a single initial sample.
    pub fn new(t0: f64, z0: StateVector, r0: Matrix3<f64>) -> Self {
        Self {
            time: vec![t0],
            state: vec![z0],
            attitude: vec![r0],
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn last(&self) -> Option<(f64, &StateVector, &Matrix3<f64>)> {
        Some((*self.time.last()?, self.state.last()?, self.attitude.last()?))
    }

    pub fn commit(&mut self, segment: Segment<N_STATES>, offset: f64) -> usize {
        //! appends every sample of `segment` except its first, which repeats the current last sample.
        //! Segment times are relative to the start of the move and are shifted by `offset`.
        let before = self.len();
        let Segment {
            times,
            states,
            attitudes,
        } = segment;

        self.time.extend(times.into_iter().skip(1).map(|t| t + offset));
        self.state.extend(states.into_iter().skip(1));
        self.attitude.extend(attitudes.into_iter().skip(1));
        debug_assert!(self.time.len() == self.state.len() && self.time.len() == self.attitude.len());

        self.len() - before
    }

    /// read-only snapshot for renderers and other consumers.
    pub fn view(&self) -> HistoryView<'_> {
        HistoryView {
            time: &self.time,
            state: &self.state,
            attitude: &self.attitude,
        }
    }
}

/// Borrowed, read-only view of a [`History`].
#[derive(Debug, Clone, Copy)]
pub struct HistoryView<'a> {
    /// sample times.
    pub time: &'a [f64],
    /// state per sample.
    pub state: &'a [StateVector],
    /// attitude per sample.
    pub attitude: &'a [Matrix3<f64>],
}

impl<'a> HistoryView<'a> {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn sample(&self, index: usize) -> Option<(f64, &'a StateVector, &'a Matrix3<f64>)> {
        Some((*self.time.get(index)?, self.state.get(index)?, self.attitude.get(index)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(times: &[f64]) -> Segment<N_STATES> {
        Segment {
            times: times.to_vec(),
            states: times.iter().map(|t| StateVector::from_element(*t)).collect(),
            attitudes: vec![Matrix3::identity(); times.len()],
        }
    }

    #[test]
    fn commit_skips_the_repeated_first_sample() {
        let mut history = History::new(0.0, StateVector::zeros(), Matrix3::identity());
        assert_eq!(history.commit(segment(&[0.0, 0.5, 1.0]), 0.0), 2);
        assert_eq!(history.commit(segment(&[0.0, 0.5]), 1.0), 1);

        let view = history.view();
        assert_eq!(view.time, &[0.0, 0.5, 1.0, 1.5]);
        assert_eq!(view.state.len(), 4);
        assert_eq!(view.attitude.len(), 4);
        assert_eq!(view.sample(3).map(|(t, z, _)| (t, z[0])), Some((1.5, 0.5)));
        assert_eq!(view.sample(4), None);
    }

    #[test]
    fn single_sample_segment_appends_nothing() {
        let mut history = History::new(0.0, StateVector::zeros(), Matrix3::identity());
        assert_eq!(history.commit(segment(&[0.0]), 0.0), 0);
        assert_eq!(history.len(), 1);
    }
}
